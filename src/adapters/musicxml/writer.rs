use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::application::ports::ScoreWriterPort;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::score::{Clef, Part, Score};

/// Divisiones por negra en el documento generado. Con 4 divisiones la
/// semicorchea (0.25 negras) queda en 1 división exacta.
const DIVISIONS: u32 = 4;

/// Escritor de partituras en MusicXML. Cada escritura crea un fichero nuevo
/// en el directorio de salida; el nombre combina la marca de tiempo con un
/// contador monótono del proceso para que dos conversiones en el mismo
/// segundo no colisionen.
pub struct MusicXmlWriter {
    output_dir: PathBuf,
    seq: AtomicU64,
}

impl MusicXmlWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            seq: AtomicU64::new(0),
        }
    }

    fn next_filename(&self) -> String {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let n = self.seq.fetch_add(1, Ordering::Relaxed);
        format!("asmusic_{timestamp}_{n:03}.xml")
    }
}

#[async_trait]
impl ScoreWriterPort for MusicXmlWriter {
    async fn write(&self, score: &Score) -> DomainResult<PathBuf> {
        fs::create_dir_all(&self.output_dir).map_err(|e| {
            DomainError::OperationFailed(format!(
                "no se pudo crear el directorio de salida {}: {e}",
                self.output_dir.display()
            ))
        })?;

        let path = self.output_dir.join(self.next_filename());
        fs::write(&path, to_musicxml(score)).map_err(|e| {
            DomainError::OperationFailed(format!("fallo escribiendo {}: {e}", path.display()))
        })?;

        std::path::absolute(&path)
            .map_err(|e| DomainError::OperationFailed(format!("ruta no resoluble: {e}")))
    }
}

/// Serializa la partitura como documento `score-partwise` 4.0, un
/// `part` por pentagrama.
pub fn to_musicxml(score: &Score) -> String {
    let mut xml = String::new();

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(r#"<!DOCTYPE score-partwise PUBLIC "-//Recordare//DTD MusicXML 4.0 Partwise//EN" "http://www.musicxml.org/dtds/partwise.dtd">"#);
    xml.push('\n');
    xml.push_str(r#"<score-partwise version="4.0">"#);
    xml.push('\n');

    xml.push_str("  <part-list>\n");
    for (i, _) in score.parts.iter().enumerate() {
        xml.push_str(&format!("    <score-part id=\"P{}\">\n", i + 1));
        xml.push_str("      <part-name print-object=\"no\"></part-name>\n");
        xml.push_str("    </score-part>\n");
    }
    xml.push_str("  </part-list>\n");

    for (i, part) in score.parts.iter().enumerate() {
        xml.push_str(&format!("  <part id=\"P{}\">\n", i + 1));
        xml.push_str(&part_to_xml(part));
        xml.push_str("  </part>\n");
    }

    xml.push_str("</score-partwise>\n");
    xml
}

/// Reparte las figuras en compases llenándolos de forma voraz hasta la
/// capacidad del compás; una figura que no cabe abre compás nuevo (no se
/// parten figuras). Un pentagrama sin figuras emite un único compás vacío.
fn part_to_xml(part: &Part) -> String {
    let capacity = part.time.quarter_capacity();
    let mut measures: Vec<Vec<f64>> = vec![Vec::new()];
    let mut filled = 0.0;

    for note in &part.notes {
        if filled > 0.0 && filled + note.quarter_length > capacity {
            measures.push(Vec::new());
            filled = 0.0;
        }
        measures.last_mut().unwrap().push(note.quarter_length);
        filled += note.quarter_length;
    }

    let mut xml = String::new();
    for (number, durations) in measures.iter().enumerate() {
        xml.push_str(&format!("    <measure number=\"{}\">\n", number + 1));
        if number == 0 {
            xml.push_str(&attributes_to_xml(part));
        }
        for &quarter_length in durations {
            xml.push_str(&note_to_xml(quarter_length));
        }
        xml.push_str("    </measure>\n");
    }
    xml
}

fn attributes_to_xml(part: &Part) -> String {
    let (sign, line) = match part.clef {
        Clef::Treble => ("G", 2),
        Clef::Bass => ("F", 4),
    };

    let mut xml = String::new();
    xml.push_str("      <attributes>\n");
    xml.push_str(&format!("        <divisions>{DIVISIONS}</divisions>\n"));
    xml.push_str("        <time>\n");
    xml.push_str(&format!("          <beats>{}</beats>\n", part.time.beats));
    xml.push_str(&format!(
        "          <beat-type>{}</beat-type>\n",
        part.time.beat_type
    ));
    xml.push_str("        </time>\n");
    xml.push_str("        <clef>\n");
    xml.push_str(&format!("          <sign>{sign}</sign>\n"));
    xml.push_str(&format!("          <line>{line}</line>\n"));
    xml.push_str("        </clef>\n");
    xml.push_str("      </attributes>\n");
    xml
}

/// La fuente no modela altura de nota, solo duración; todo se serializa
/// como Do4, la nota por defecto de la librería de notación original.
fn note_to_xml(quarter_length: f64) -> String {
    let duration = (quarter_length * DIVISIONS as f64).round() as u32;
    let note_type = match duration {
        8 => "half",
        4 => "quarter",
        2 => "eighth",
        1 => "16th",
        _ => "quarter",
    };

    let mut xml = String::new();
    xml.push_str("      <note>\n");
    xml.push_str("        <pitch>\n");
    xml.push_str("          <step>C</step>\n");
    xml.push_str("          <octave>4</octave>\n");
    xml.push_str("        </pitch>\n");
    xml.push_str(&format!("        <duration>{duration}</duration>\n"));
    xml.push_str(&format!("        <type>{note_type}</type>\n"));
    xml.push_str("      </note>\n");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::score::{Note, ScoreBuilder, TimeSignature};

    fn score_from(labels: &[&str]) -> Score {
        let mut builder = ScoreBuilder::new();
        for label in labels {
            builder.push_label(label);
        }
        builder.finish()
    }

    #[test]
    fn documento_con_dos_pentagramas() {
        let score = score_from(&["clavedesol", "negra", "blanca", "clavedefa", "negra"]);
        let xml = to_musicxml(&score);

        assert!(xml.contains(r#"<score-partwise version="4.0">"#));
        assert!(xml.contains(r#"<score-part id="P1">"#));
        assert!(xml.contains(r#"<score-part id="P2">"#));
        assert!(xml.contains("<sign>G</sign>"));
        assert!(xml.contains("<sign>F</sign>"));
        assert!(xml.contains("<type>half</type>"));
        assert!(xml.contains("<type>quarter</type>"));
    }

    #[test]
    fn las_figuras_se_reparten_en_compases_de_cuatro_negras() {
        let mut part = Part::new(Clef::Treble);
        for _ in 0..5 {
            part.notes.push(Note { quarter_length: 1.0 });
        }
        let xml = part_to_xml(&part);

        assert!(xml.contains(r#"<measure number="1">"#));
        assert!(xml.contains(r#"<measure number="2">"#));
        assert!(!xml.contains(r#"<measure number="3">"#));
    }

    #[test]
    fn una_figura_que_no_cabe_abre_compas_nuevo() {
        let mut part = Part::new(Clef::Bass);
        part.notes.push(Note { quarter_length: 2.0 });
        part.notes.push(Note { quarter_length: 1.0 });
        part.notes.push(Note { quarter_length: 2.0 }); // 3.0 + 2.0 > 4.0
        let xml = part_to_xml(&part);

        assert!(xml.contains(r#"<measure number="2">"#));
        assert_eq!(part.time, TimeSignature::COMMON);
    }

    #[test]
    fn pentagrama_sin_figuras_emite_un_compas_vacio() {
        let score = score_from(&["clavedesol", "barradecompas"]);
        let xml = to_musicxml(&score);

        assert!(xml.contains(r#"<measure number="1">"#));
        assert!(!xml.contains("<note>"));
    }

    #[tokio::test]
    async fn escrituras_consecutivas_no_colisionan() {
        let dir = tempfile::tempdir().unwrap();
        let writer = MusicXmlWriter::new(dir.path());
        let score = score_from(&["clavedesol", "negra"]);

        let first = writer.write(&score).await.unwrap();
        let second = writer.write(&score).await.unwrap();

        assert_ne!(first, second);
        assert!(first.is_absolute());
        for path in [&first, &second] {
            let name = path.file_name().unwrap().to_string_lossy();
            assert!(name.starts_with("asmusic_"));
            assert!(name.ends_with(".xml"));
            let contents = std::fs::read_to_string(path).unwrap();
            assert!(contents.contains("<clef>"));
        }
    }
}

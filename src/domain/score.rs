use serde::{Deserialize, Serialize};

use super::detection::SymbolClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Clef {
    Treble,
    Bass,
}

/// Compás. El sistema siempre trabaja en 4/4, pero el tipo lo deja explícito
/// en lugar de repartir literales por el serializador.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSignature {
    pub beats: u8,
    pub beat_type: u8,
}

impl TimeSignature {
    pub const COMMON: TimeSignature = TimeSignature { beats: 4, beat_type: 4 };

    /// Capacidad del compás en unidades de negra.
    pub fn quarter_capacity(&self) -> f64 {
        self.beats as f64 * 4.0 / self.beat_type as f64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub quarter_length: f64,
}

/// Un pentagrama: clave inicial, compás fijo y la secuencia de figuras.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub clef: Clef,
    pub time: TimeSignature,
    pub notes: Vec<Note>,
}

impl Part {
    pub fn new(clef: Clef) -> Self {
        Self {
            clef,
            time: TimeSignature::COMMON,
            notes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Score {
    pub parts: Vec<Part>,
}

/// Estado del constructor: o no hay pentagrama abierto todavía, o hay
/// exactamente uno acumulando figuras.
#[derive(Debug)]
enum BuilderState {
    NoOpenPart,
    OpenPart(Part),
}

/// Máquina de dos estados que recorre la secuencia de etiquetas de
/// izquierda a derecha y agrupa figuras en pentagramas delimitados por
/// claves:
///
/// - una clave cierra el pentagrama abierto (si lo hay) y abre uno nuevo;
/// - una figura se añade al pentagrama abierto;
/// - cualquier otra etiqueta (barras de compás, etiquetas desconocidas,
///   figuras antes de la primera clave) se descarta.
#[derive(Debug)]
pub struct ScoreBuilder {
    score: Score,
    state: BuilderState,
}

impl ScoreBuilder {
    pub fn new() -> Self {
        Self {
            score: Score::default(),
            state: BuilderState::NoOpenPart,
        }
    }

    /// Procesa una etiqueta de símbolo tal y como llega por el cable.
    pub fn push_label(&mut self, label: &str) {
        if let Some(class) = SymbolClass::from_label(label) {
            self.push(class);
        }
    }

    pub fn push(&mut self, class: SymbolClass) {
        if let Some(clef) = class.clef() {
            self.open_part(clef);
            return;
        }

        let Some(quarter_length) = class.quarter_length() else {
            // barradecompas y compañía: sin efecto sobre el pentagrama
            return;
        };

        if let BuilderState::OpenPart(part) = &mut self.state {
            part.notes.push(Note { quarter_length });
        }
    }

    fn open_part(&mut self, clef: Clef) {
        let previous = std::mem::replace(&mut self.state, BuilderState::OpenPart(Part::new(clef)));
        if let BuilderState::OpenPart(part) = previous {
            self.score.parts.push(part);
        }
    }

    /// Cierra el pentagrama pendiente y devuelve la partitura completa.
    pub fn finish(mut self) -> Score {
        if let BuilderState::OpenPart(part) = self.state {
            self.score.parts.push(part);
        }
        self.score
    }
}

impl Default for ScoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(labels: &[&str]) -> Score {
        let mut builder = ScoreBuilder::new();
        for label in labels {
            builder.push_label(label);
        }
        builder.finish()
    }

    #[test]
    fn dos_claves_producen_dos_pentagramas() {
        let score = build(&["clavedesol", "negra", "blanca", "clavedefa", "negra"]);

        assert_eq!(score.parts.len(), 2);

        let first = &score.parts[0];
        assert_eq!(first.clef, Clef::Treble);
        assert_eq!(first.time, TimeSignature::COMMON);
        let durations: Vec<_> = first.notes.iter().map(|n| n.quarter_length).collect();
        assert_eq!(durations, vec![1.0, 2.0]);

        let second = &score.parts[1];
        assert_eq!(second.clef, Clef::Bass);
        let durations: Vec<_> = second.notes.iter().map(|n| n.quarter_length).collect();
        assert_eq!(durations, vec![1.0]);
    }

    #[test]
    fn figuras_antes_de_la_primera_clave_se_descartan() {
        let score = build(&["negra"]);
        assert!(score.parts.is_empty());
    }

    #[test]
    fn barra_de_compas_no_aporta_figuras_pero_el_pentagrama_se_cierra() {
        let score = build(&["clavedesol", "barradecompas"]);
        assert_eq!(score.parts.len(), 1);
        assert_eq!(score.parts[0].clef, Clef::Treble);
        assert!(score.parts[0].notes.is_empty());
    }

    #[test]
    fn etiquetas_desconocidas_se_ignoran() {
        let score = build(&["clavedefa", "silencio", "negra"]);
        assert_eq!(score.parts.len(), 1);
        assert_eq!(score.parts[0].notes.len(), 1);
    }

    #[test]
    fn secuencia_vacia_produce_partitura_vacia() {
        let score = build(&[]);
        assert!(score.parts.is_empty());
    }
}

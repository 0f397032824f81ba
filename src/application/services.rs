use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    application::{
        dto::NoteLabel,
        ports::{DetectorPort, ScoreWriterPort},
    },
    config::UnknownClassPolicy,
    domain::{
        detection::{Detection, SymbolClass},
        errors::{DomainError, DomainResult},
        score::ScoreBuilder,
    },
};

/// Servicio del endpoint de detección: decodifica la imagen subida, invoca
/// el modelo, resuelve los ids de clase contra el vocabulario y devuelve
/// las detecciones en orden de lectura (x1 ascendente).
#[derive(Clone)]
pub struct DetectionService {
    detector: Arc<dyn DetectorPort>,
    unknown_class: UnknownClassPolicy,
}

impl DetectionService {
    pub fn new(detector: Arc<dyn DetectorPort>, unknown_class: UnknownClassPolicy) -> Self {
        Self {
            detector,
            unknown_class,
        }
    }

    pub async fn detect(&self, image_bytes: &[u8]) -> DomainResult<Vec<Detection>> {
        let rgb = image::load_from_memory(image_bytes)
            .map_err(|e| DomainError::OperationFailed(format!("imagen no decodificable: {e}")))?
            .to_rgb8();

        let raw = self.detector.infer(&rgb).await?;

        let mut notes = Vec::with_capacity(raw.len());
        for det in &raw {
            let Some(class) = SymbolClass::from_id(det.class_id) else {
                match self.unknown_class {
                    UnknownClassPolicy::Reject => {
                        return Err(DomainError::OperationFailed(format!(
                            "id de clase fuera de la tabla: {}",
                            det.class_id
                        )));
                    }
                    UnknownClassPolicy::Skip => {
                        warn!("Descartada detección con id de clase desconocido: {}", det.class_id);
                        continue;
                    }
                }
            };
            let note = Detection::from_raw(det, class);
            info!(
                "Detectado: {} en ({}, {}, {}, {})",
                class.label(),
                note.x1,
                note.y1,
                note.x2,
                note.y2
            );
            notes.push(note);
        }

        // Orden de lectura de la notación: de izquierda a derecha. El orden
        // estable conserva el orden de emisión del modelo en caso de empate.
        notes.sort_by_key(|note| note.x1);
        Ok(notes)
    }
}

/// Servicio del endpoint de conversión: agrupa la secuencia de etiquetas en
/// pentagramas y delega la serialización en el escritor de partituras.
#[derive(Clone)]
pub struct ConversionService {
    writer: Arc<dyn ScoreWriterPort>,
}

impl ConversionService {
    pub fn new(writer: Arc<dyn ScoreWriterPort>) -> Self {
        Self { writer }
    }

    pub async fn convert(&self, notes: &[NoteLabel]) -> DomainResult<PathBuf> {
        let mut builder = ScoreBuilder::new();
        for note in notes {
            info!("Procesando símbolo: {}", note.class);
            builder.push_label(&note.class);
        }
        let score = builder.finish();

        let path = self.writer.write(&score).await?;
        info!("Partitura escrita en {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use image::RgbImage;
    use std::io::Cursor;

    use crate::domain::detection::RawDetection;

    struct FakeDetector {
        raw: Vec<RawDetection>,
    }

    #[async_trait]
    impl DetectorPort for FakeDetector {
        async fn infer(&self, _image: &RgbImage) -> DomainResult<Vec<RawDetection>> {
            Ok(self.raw.clone())
        }
    }

    fn raw(x1: f32, class_id: usize) -> RawDetection {
        RawDetection {
            x1,
            y1: 0.0,
            x2: x1 + 10.0,
            y2: 20.0,
            score: 0.9,
            class_id,
        }
    }

    fn png_bytes() -> Vec<u8> {
        let img = RgbImage::new(4, 4);
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn service(raw: Vec<RawDetection>, policy: UnknownClassPolicy) -> DetectionService {
        DetectionService::new(Arc::new(FakeDetector { raw }), policy)
    }

    #[tokio::test]
    async fn las_detecciones_salen_ordenadas_por_x1() {
        let svc = service(
            vec![raw(300.0, 5), raw(10.0, 3), raw(150.0, 1)],
            UnknownClassPolicy::Reject,
        );

        let notes = svc.detect(&png_bytes()).await.unwrap();
        let xs: Vec<_> = notes.iter().map(|n| n.x1).collect();
        assert_eq!(xs, vec![10, 150, 300]);
        assert_eq!(notes[0].class, SymbolClass::TrebleClef);
    }

    #[tokio::test]
    async fn empates_en_x1_conservan_el_orden_de_emision() {
        let svc = service(
            vec![raw(50.0, 5), raw(50.0, 1), raw(50.0, 4)],
            UnknownClassPolicy::Reject,
        );

        let notes = svc.detect(&png_bytes()).await.unwrap();
        let classes: Vec<_> = notes.iter().map(|n| n.class).collect();
        assert_eq!(
            classes,
            vec![
                SymbolClass::QuarterNote,
                SymbolClass::HalfNote,
                SymbolClass::EighthNote
            ]
        );
    }

    #[tokio::test]
    async fn id_desconocido_falla_la_peticion_con_politica_reject() {
        let svc = service(vec![raw(10.0, 9)], UnknownClassPolicy::Reject);
        let err = svc.detect(&png_bytes()).await.unwrap_err();
        assert!(matches!(err, DomainError::OperationFailed(_)));
    }

    #[tokio::test]
    async fn id_desconocido_se_descarta_con_politica_skip() {
        let svc = service(
            vec![raw(10.0, 9), raw(20.0, 5)],
            UnknownClassPolicy::Skip,
        );
        let notes = svc.detect(&png_bytes()).await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].class, SymbolClass::QuarterNote);
    }

    #[tokio::test]
    async fn bytes_no_decodificables_fallan() {
        let svc = service(vec![], UnknownClassPolicy::Reject);
        let err = svc.detect(b"esto no es una imagen").await.unwrap_err();
        assert!(matches!(err, DomainError::OperationFailed(_)));
    }
}

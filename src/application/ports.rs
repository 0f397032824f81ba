use async_trait::async_trait;
use image::RgbImage;
use std::path::PathBuf;

use crate::domain::{detection::RawDetection, errors::DomainResult, score::Score};

#[async_trait]
pub trait DetectorPort: Send + Sync {
    /// Ejecuta el modelo sobre una imagen ya decodificada y devuelve las
    /// detecciones crudas (coordenadas en píxeles de la imagen original).
    async fn infer(&self, image: &RgbImage) -> DomainResult<Vec<RawDetection>>;
}

#[async_trait]
pub trait ScoreWriterPort: Send + Sync {
    /// Serializa la partitura al formato de intercambio y la persiste,
    /// devolviendo la ruta absoluta del fichero escrito.
    async fn write(&self, score: &Score) -> DomainResult<PathBuf>;
}

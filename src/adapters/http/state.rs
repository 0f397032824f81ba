use std::sync::Arc;

use crate::application::services::{ConversionService, DetectionService};

/// Estado compartido para los manejadores HTTP de Axum. Contiene los
/// servicios (casos de uso); los adaptadores concretos quedan detrás de
/// los puertos y los tests pueden sustituirlos.
#[derive(Clone)]
pub struct HttpState {
    /// Servicio de detección de símbolos sobre imágenes.
    pub detection: Arc<DetectionService>,
    /// Servicio de conversión de secuencias de símbolos a MusicXML.
    pub conversion: Arc<ConversionService>,
}

use serde::{Deserialize, Serialize};

use crate::domain::detection::Detection;

/// Respuesta de `POST /detect`: detecciones ordenadas de izquierda a derecha.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectResponse {
    pub notes: Vec<Detection>,
}

/// Una entrada de la secuencia que consume `POST /convert`. Es la misma
/// forma que produce el detector, reducida al campo que importa aquí.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteLabel {
    pub class: String,
}

/// Cuerpo de `POST /convert`. `notes` es opcional para poder distinguir
/// "campo ausente" (400) de "lista vacía" (partitura sin pentagramas).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConvertRequest {
    #[serde(default)]
    pub notes: Option<Vec<NoteLabel>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertResponse {
    pub message: String,
    pub path: String,
}

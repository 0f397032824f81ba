use serde::{Deserialize, Serialize};

use super::score::Clef;

/// Salida cruda del motor de inferencia, antes de resolver la clase
/// contra el vocabulario de símbolos.
#[derive(Debug, Clone)]
pub struct RawDetection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub score: f32,
    pub class_id: usize,
}

/// Detección ya proyectada al dominio: coordenadas redondeadas a píxel
/// entero y clase resuelta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    pub class: SymbolClass,
}

impl Detection {
    pub fn from_raw(raw: &RawDetection, class: SymbolClass) -> Self {
        Self {
            x1: raw.x1.round() as i32,
            y1: raw.y1.round() as i32,
            x2: raw.x2.round() as i32,
            y2: raw.y2.round() as i32,
            class,
        }
    }
}

/// Vocabulario fijo de símbolos que reconoce el modelo. Los ids (0–6) y
/// las etiquetas son los del entrenamiento; nunca cambian en caliente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolClass {
    #[serde(rename = "barradecompas")]
    Barline,
    #[serde(rename = "blanca")]
    HalfNote,
    #[serde(rename = "clavedefa")]
    BassClef,
    #[serde(rename = "clavedesol")]
    TrebleClef,
    #[serde(rename = "corchea")]
    EighthNote,
    #[serde(rename = "negra")]
    QuarterNote,
    #[serde(rename = "semicorchea")]
    SixteenthNote,
}

impl SymbolClass {
    /// Resuelve el id numérico que emite el modelo. `None` si el id queda
    /// fuera del dominio de la tabla (la política de qué hacer entonces
    /// vive en la capa de aplicación).
    pub fn from_id(id: usize) -> Option<Self> {
        match id {
            0 => Some(Self::Barline),
            1 => Some(Self::HalfNote),
            2 => Some(Self::BassClef),
            3 => Some(Self::TrebleClef),
            4 => Some(Self::EighthNote),
            5 => Some(Self::QuarterNote),
            6 => Some(Self::SixteenthNote),
            _ => None,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "barradecompas" => Some(Self::Barline),
            "blanca" => Some(Self::HalfNote),
            "clavedefa" => Some(Self::BassClef),
            "clavedesol" => Some(Self::TrebleClef),
            "corchea" => Some(Self::EighthNote),
            "negra" => Some(Self::QuarterNote),
            "semicorchea" => Some(Self::SixteenthNote),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Barline => "barradecompas",
            Self::HalfNote => "blanca",
            Self::BassClef => "clavedefa",
            Self::TrebleClef => "clavedesol",
            Self::EighthNote => "corchea",
            Self::QuarterNote => "negra",
            Self::SixteenthNote => "semicorchea",
        }
    }

    /// Duración en unidades de negra, si el símbolo es una figura.
    pub fn quarter_length(&self) -> Option<f64> {
        match self {
            Self::QuarterNote => Some(1.0),
            Self::HalfNote => Some(2.0),
            Self::EighthNote => Some(0.5),
            Self::SixteenthNote => Some(0.25),
            _ => None,
        }
    }

    /// Clave asociada, si el símbolo es una clave.
    pub fn clef(&self) -> Option<Clef> {
        match self {
            Self::TrebleClef => Some(Clef::Treble),
            Self::BassClef => Some(Clef::Bass),
            _ => None,
        }
    }
}

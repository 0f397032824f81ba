use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Qué hacer cuando el modelo emite un id de clase fuera de la tabla de
/// símbolos: rechazar la petición entera o descartar solo esa detección.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UnknownClassPolicy {
    Reject,
    Skip,
}

/// Configuración de arranque. Todo lo que el servicio necesita del exterior
/// entra por aquí; no hay rutas ni umbrales incrustados en el código.
#[derive(Debug, Clone, Parser)]
#[command(name = "asmusic", about = "Detección de símbolos musicales y conversión a MusicXML")]
pub struct Config {
    /// Dirección en la que escucha el servidor
    #[arg(long, env = "ASMUSIC_BIND", default_value = "0.0.0.0")]
    pub bind: String,

    /// Puerto del servidor
    #[arg(long, env = "ASMUSIC_PORT", default_value_t = 5000)]
    pub port: u16,

    /// Ruta del modelo ONNX entrenado
    #[arg(long, env = "ASMUSIC_MODEL", default_value = "models/best.onnx")]
    pub model: PathBuf,

    /// Directorio donde se escriben los ficheros MusicXML generados
    #[arg(long, env = "ASMUSIC_OUTPUT_DIR", default_value = "salidas")]
    pub output_dir: PathBuf,

    /// Lado del tensor de entrada del modelo (imágenes cuadradas)
    #[arg(long, env = "ASMUSIC_INPUT_SIZE", default_value_t = 640)]
    pub input_size: u32,

    /// Umbral de confianza por debajo del cual se descartan candidatos
    #[arg(long, env = "ASMUSIC_CONF_THRESHOLD", default_value_t = 0.25)]
    pub conf_threshold: f32,

    /// Máximo de detecciones devueltas por imagen
    #[arg(long, env = "ASMUSIC_MAX_DETECTIONS", default_value_t = 100)]
    pub max_detections: usize,

    /// Política ante ids de clase fuera de la tabla
    #[arg(long, env = "ASMUSIC_UNKNOWN_CLASS", value_enum, default_value = "reject")]
    pub unknown_class: UnknownClassPolicy,
}

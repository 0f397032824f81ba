use clap::Parser;
use std::sync::Arc;

use asmusic::adapters::{
    http::{router, state::HttpState},
    musicxml::writer::MusicXmlWriter,
    onnx::yolo_engine::{OnnxDetector, YoloParams},
};
use asmusic::application::services::{ConversionService, DetectionService};
use asmusic::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Inicializar logs (RUST_LOG=info por defecto)
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let cfg = Config::parse();

    // 2. Cargar el modelo una única vez; vive lo que vive el proceso y
    // nunca se muta después de la carga.
    tracing::info!("🔧 Cargando modelo YOLO desde {}...", cfg.model.display());
    let detector = Arc::new(OnnxDetector::load(&cfg.model, YoloParams::from(&cfg))?);
    let writer = Arc::new(MusicXmlWriter::new(&cfg.output_dir));

    // 3. Instanciar servicios (casos de uso)
    let detection = Arc::new(DetectionService::new(detector, cfg.unknown_class));
    let conversion = Arc::new(ConversionService::new(writer));

    // 4. Configurar el estado de la API y el router de Axum
    let state = HttpState {
        detection,
        conversion,
    };
    let app = router(state);

    // 5. Lanzar el servidor
    let addr = format!("{}:{}", cfg.bind, cfg.port);
    tracing::info!("🚀 Servidor asmusic iniciado en http://{}", addr);
    tracing::info!("📂 Salida MusicXML en {}", cfg.output_dir.display());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

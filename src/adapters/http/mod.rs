pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::adapters::http::state::HttpState;

pub fn router(state: HttpState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/detect", post(routes::detect))
        .route("/convert", post(routes::convert))
        // Las partituras escaneadas superan el límite multipart por defecto (2 MiB)
        .layer(DefaultBodyLimit::max(16 * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::adapters::http::state::HttpState;
use crate::application::dto::{ConvertRequest, ConvertResponse, DetectResponse};
use crate::domain::errors::DomainError;

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

/// `POST /detect`: formulario multipart con el campo `image`. Devuelve las
/// detecciones en orden de lectura, o 400 si falta el campo.
pub async fn detect(State(st): State<HttpState>, mut multipart: Multipart) -> Response {
    let mut image_bytes = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("image") {
            image_bytes = field.bytes().await.ok();
            break;
        }
    }

    let Some(bytes) = image_bytes else {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "No image part" })))
            .into_response();
    };

    match st.detection.detect(&bytes).await {
        Ok(notes) => Json(DetectResponse { notes }).into_response(),
        Err(e) => error_response(e),
    }
}

/// `POST /convert`: JSON con el campo `notes`. Construye la partitura, la
/// escribe a disco y devuelve la ruta, o 400 si falta el campo.
pub async fn convert(State(st): State<HttpState>, Json(req): Json<ConvertRequest>) -> Response {
    let Some(notes) = req.notes else {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "Invalid input" })))
            .into_response();
    };

    match st.conversion.convert(&notes).await {
        Ok(path) => Json(ConvertResponse {
            message: "XML file created successfully".into(),
            path: path.display().to_string(),
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

fn error_response(e: DomainError) -> Response {
    let status = match e {
        DomainError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::OperationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": e.to_string() }))).into_response()
}

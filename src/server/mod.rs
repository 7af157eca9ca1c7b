//! HTTP front-end for the recognition pipeline.
//!
//! Exposes the recognition, translation, and diagnostic routes behind a
//! CORS layer restricted to the configured frontend origin. Inference runs
//! on the blocking thread pool so the async executor stays responsive.

pub mod config;
pub mod translation;

pub use config::ServerConfig;
pub use translation::{TranslationClient, TranslationError};

use crate::core::OcrError;
use crate::pipeline::{format, PGNetPipeline, RecognitionOutcome};
use crate::utils::visualization::AnnotationConfig;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Shared state behind every route.
pub struct AppState {
    pub pipeline: Arc<PGNetPipeline>,
    pub annotation: AnnotationConfig,
    pub translator: TranslationClient,
    pub config: ServerConfig,
}

/// Builds the service router with CORS and request tracing attached.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(state.config.allowed_origin.clone())
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/process-image", post(process_image))
        .route("/handwriting/recognize", post(recognize_upload))
        .route("/api/translate", post(translate))
        .route("/api/debug/model-path", get(model_path_info))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Error envelope returned by every route.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<OcrError> for ApiError {
    fn from(err: OcrError) -> Self {
        let message = error_chain(&err);
        match err {
            OcrError::ImageDecode(_) => Self::bad_request(message),
            _ => Self::internal(message),
        }
    }
}

impl From<TranslationError> for ApiError {
    fn from(err: TranslationError) -> Self {
        Self::internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "status": "error", "message": self.message }));
        (self.status, body).into_response()
    }
}

/// Flattens an error and its source chain into one message.
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

async fn health() -> &'static str {
    "OK"
}

#[derive(Deserialize)]
struct ProcessImageForm {
    image_data: String,
}

/// Strips an optional `data:...;base64,` header from a base64 payload.
fn strip_data_uri_header(payload: &str) -> &str {
    match payload.split_once("base64,") {
        Some((_, tail)) => tail,
        None => payload,
    }
}

async fn run_recognition(
    pipeline: Arc<PGNetPipeline>,
    bytes: Vec<u8>,
) -> Result<RecognitionOutcome, ApiError> {
    tokio::task::spawn_blocking(move || pipeline.recognize(&bytes))
        .await
        .map_err(|e| ApiError::internal(format!("inference task failed: {e}")))?
        .map_err(ApiError::from)
}

async fn process_image(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ProcessImageForm>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let encoded = strip_data_uri_header(form.image_data.trim());
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| ApiError::bad_request(format!("invalid base64 image data: {e}")))?;

    let outcome = run_recognition(Arc::clone(&state.pipeline), bytes).await?;
    let recognized_text = format::joined_text(&outcome.regions);
    let annotated_image =
        format::annotated_data_uri(&outcome.image, &outcome.regions, &state.annotation)?;
    info!(regions = outcome.regions.len(), "processed form upload");

    Ok(Json(json!({
        "status": "success",
        "recognized_text": recognized_text,
        "annotated_image": annotated_image,
    })))
}

async fn recognize_upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut bytes: Option<Vec<u8>> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("malformed multipart body: {e}")))?
    {
        let is_file = field.name() == Some("file");
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("failed to read upload: {e}")))?
            .to_vec();
        if is_file {
            bytes = Some(data);
            break;
        }
        bytes.get_or_insert(data);
    }
    let bytes = bytes.ok_or_else(|| ApiError::bad_request("no file field in upload"))?;

    let outcome = run_recognition(Arc::clone(&state.pipeline), bytes).await?;
    let recognized_text = format::joined_text(&outcome.regions);
    info!(regions = outcome.regions.len(), "processed file upload");

    Ok(Json(json!({ "recognized_text": recognized_text })))
}

#[derive(Deserialize)]
struct TranslateBody {
    text: String,
    target_language: String,
}

async fn translate(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TranslateBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let translated = state
        .translator
        .translate(&body.text, &body.target_language)
        .await?;
    Ok(Json(json!({ "translated_text": translated })))
}

async fn model_path_info(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let path = state.pipeline.model_path();
    let size = std::fs::metadata(path).map(|m| m.len()).ok();
    Json(json!({
        "model_path": path.display().to_string(),
        "exists": path.exists(),
        "file_size_bytes": size,
    }))
}

//! HTTP surface for the askdoc server.
//!
//! This module exposes a compact Axum router with a handful of endpoints:
//!
//! - `POST /predict` – Accept a multipart form with a `file` upload and a
//!   `question` field, extract the document's text, and return the model's
//!   answer as `{ "result": "<answer>" }`.
//! - `GET /health` – Liveness probe.
//! - `GET /metrics` – Observe request counters and the last extracted
//!   document size.
//!
//! Errors are returned as JSON bodies of the form `{ "detail": "<message>" }`:
//! unsupported file types and malformed multipart payloads map to 400, while
//! document-parse failures and completion-service failures map to 500.

use crate::extract::ExtractError;
use crate::qa::{QaApi, QaError, UploadedDocument};
use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Build the HTTP router exposing the question-answering surface.
///
/// CORS is wide open (all origins, methods, and headers); restrict it at a
/// gateway when deploying somewhere that matters.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: QaApi + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/predict", post(predict::<S>))
        .route("/health", get(health))
        .route("/metrics", get(get_metrics::<S>))
        .layer(cors)
        .with_state(service)
}

/// Success response for the `POST /predict` endpoint.
#[derive(Serialize)]
struct PredictResponse {
    /// Answer text returned verbatim from the completion service.
    result: String,
}

/// Answer a question about an uploaded document.
///
/// Expects a multipart form with a text field `question` and a binary field
/// `file` carrying a filename; the filename extension selects the decoder.
async fn predict<S>(
    State(service): State<Arc<S>>,
    mut multipart: Multipart,
) -> Result<Json<PredictResponse>, AppError>
where
    S: QaApi,
{
    let mut question: Option<String> = None;
    let mut document: Option<UploadedDocument> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::bad_request(format!("Invalid multipart payload: {err}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("question") => {
                let value = field.text().await.map_err(|err| {
                    AppError::bad_request(format!("Invalid question field: {err}"))
                })?;
                question = Some(value);
            }
            Some("file") => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| AppError::bad_request("File upload is missing a filename"))?;
                let content = field
                    .bytes()
                    .await
                    .map_err(|err| AppError::bad_request(format!("Invalid file field: {err}")))?;
                document = Some(UploadedDocument {
                    filename,
                    content: content.to_vec(),
                });
            }
            // Unknown fields are ignored.
            _ => {}
        }
    }

    let question = question.ok_or_else(|| AppError::bad_request("Missing form field: question"))?;
    let document = document.ok_or_else(|| AppError::bad_request("Missing form field: file"))?;

    let filename = document.filename.clone();
    let answer = service.answer_question(document, &question).await?;
    tracing::info!(file = %filename, "Predict request completed");
    Ok(Json(PredictResponse { result: answer }))
}

/// Liveness probe.
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Return a concise metrics snapshot with request counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<crate::metrics::MetricsSnapshot>
where
    S: QaApi,
{
    Json(service.metrics_snapshot())
}

/// Error wrapper translating pipeline failures into HTTP responses.
struct AppError {
    status: StatusCode,
    detail: String,
}

impl AppError {
    fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }
}

impl From<QaError> for AppError {
    fn from(error: QaError) -> Self {
        let status = match &error {
            QaError::Extract(ExtractError::UnsupportedFileType(_)) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            detail: error.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

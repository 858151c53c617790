//! HTTP surface: the `/process` handler and router construction.
//!
//! Each request moves through `Received → Validated → Encoded → Solved` and
//! is answered exactly once. The staged upload is removed before the
//! response is built, whatever the outcome; if the request task is dropped
//! mid-flight the upload handle's destructor removes it instead.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::{debug, error, info, warn, Instrument};
use uuid::Uuid;

use crate::client::Client;
use crate::encoder;
use crate::error::AppError;
use crate::model::{SolveResponse, SolverPrompt, SolverResult};
use crate::upload::{self, TempImage};

/// Shared, read-only state handed to every request.
pub struct AppState<C> {
    client: Arc<C>,
    upload_dir: Arc<PathBuf>,
}

impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            upload_dir: Arc::clone(&self.upload_dir),
        }
    }
}

impl<C: Client> AppState<C> {
    pub fn new(client: C, upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            client: Arc::new(client),
            upload_dir: Arc::new(upload_dir.into()),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

/// Build the service router.
///
/// `max_upload_bytes` caps the request body; larger uploads are rejected
/// with 413 before any file is written.
pub fn build_router<C: Client + 'static>(state: AppState<C>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/process", post(process::<C>))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Last stage a request completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Received,
    Validated,
    Encoded,
    Solved,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Received => "received",
            Stage::Validated => "validated",
            Stage::Encoded => "encoded",
            Stage::Solved => "solved",
        })
    }
}

/// `POST /process`: solve the math problem in an uploaded image.
pub async fn process<C: Client + 'static>(
    State(state): State<AppState<C>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let span = tracing::info_span!("process", request_id = %Uuid::new_v4());

    async move {
        let mut stage = Stage::Received;

        match handle(&state, multipart, &mut stage).await {
            Ok(result) => {
                info!(stage = %stage, chars = result.text.len(), "Request solved");
                (StatusCode::OK, Json(SolveResponse::from(result))).into_response()
            }
            Err(err) if err.is_client_error() => {
                warn!(kind = err.kind(), error = %err, "Rejected request");
                err.into_response()
            }
            Err(err) => {
                error!(stage = %stage, kind = err.kind(), error = %err, "Request failed");
                err.into_response()
            }
        }
    }
    .instrument(span)
    .await
}

async fn handle<C: Client>(
    state: &AppState<C>,
    multipart: Result<Multipart, MultipartRejection>,
    stage: &mut Stage,
) -> Result<SolverResult, AppError> {
    let request = upload::receive(multipart?).await?;
    *stage = Stage::Validated;
    debug!(
        filename = ?request.image.filename,
        bytes = request.image.data.len(),
        "Upload validated"
    );

    let image = request.image.persist(&state.upload_dir).await?;
    finish(state.client(), &request.description, image, stage).await
}

/// Encode and solve a staged upload, then remove it whatever the outcome.
async fn finish<C: Client>(
    client: &C,
    description: &str,
    image: TempImage,
    stage: &mut Stage,
) -> Result<SolverResult, AppError> {
    let outcome = solve(client, description, &image, stage).await;

    let path = image.path().to_path_buf();
    match image.close() {
        Ok(()) => debug!(path = %path.display(), "Removed staged upload"),
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove staged upload"),
    }

    outcome
}

async fn solve<C: Client>(
    client: &C,
    description: &str,
    image: &TempImage,
    stage: &mut Stage,
) -> Result<SolverResult, AppError> {
    let encoded = encoder::encode(image).await?;
    *stage = Stage::Encoded;
    debug!(mime_type = %encoded.mime_type, "Image encoded");

    let result = client.solve(SolverPrompt::new(description, encoded)).await?;
    *stage = Stage::Solved;

    Ok(result)
}

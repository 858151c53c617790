//! Service-level errors and their HTTP mapping.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::client::ClientError;

/// Message returned to clients for every server-side failure.
pub const GENERIC_ERROR_MESSAGE: &str = "Error processing request";

/// Errors surfaced by the `/process` handler.
#[derive(Error, Debug)]
pub enum AppError {
    /// The request is missing a required field.
    #[error("{0}")]
    Validation(String),

    /// The multipart body could not be read.
    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    /// The request is not multipart at all.
    #[error("Multipart rejection: {0}")]
    MultipartRejection(#[from] MultipartRejection),

    /// Staging or reading the upload failed.
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The solver could not produce an answer.
    #[error(transparent)]
    Solver(#[from] ClientError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Multipart(err) => err.status(),
            AppError::MultipartRejection(err) => err.status(),
            AppError::Io(_) | AppError::Solver(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) | AppError::Multipart(_) | AppError::MultipartRejection(_) => {
                "validation"
            }
            AppError::Io(_) => "io",
            AppError::Solver(err) => err.kind(),
        }
    }

    /// Whether the caller caused the failure.
    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Multipart(err) => err.body_text(),
            AppError::MultipartRejection(err) => err.body_text(),
            AppError::Io(_) | AppError::Solver(_) => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.client_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}

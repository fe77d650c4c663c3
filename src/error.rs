use axum::{
    Json,
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::{network::response::ErrorBody, storage::StorageError};

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Storage Error: {0}")]
    Storage(#[from] StorageError),
    #[error("Failed to read multipart body: {0}")]
    Multipart(#[from] MultipartError),
    #[error("Expected a multipart upload: {0}")]
    MultipartRejection(#[from] MultipartRejection),
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ::config::ConfigError),
    #[error("Failed to bind to {1}: {0}")]
    Bind(std::io::Error, String),
    #[error("Invalid allowed origin {0}")]
    Origin(String),
    #[error("Server error: {0}")]
    Serve(std::io::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Multipart(e) => e.status(),
            AppError::MultipartRejection(e) => e.status(),
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Storage(StorageError::NotFound(_)) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!("Request failed: {}", self);
            status
                .canonical_reason()
                .unwrap_or("Internal Server Error")
                .to_string()
        } else {
            self.to_string()
        };
        (status, Json(ErrorBody::new(message))).into_response()
    }
}

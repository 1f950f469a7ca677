use crate::common::response::ApiError;
use crate::infrastructure::cloudconvert::CloudConvertError;
use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unsupported file type: .{0}")]
    UnsupportedFileType(String),

    #[error("File too large (max {max_mb}MB)")]
    FileTooLarge { max_mb: u64 },

    #[error("No file field found in multipart request")]
    MissingFile,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Signature verification failed: {0}")]
    InvalidSignature(&'static str),

    #[error("Job not found")]
    JobNotFound,

    #[error("File not ready")]
    FileNotReady,

    #[error("File not found on disk")]
    OutputMissing,

    #[error("Failed to create job: {0}")]
    Upstream(#[from] CloudConvertError),

    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::UnsupportedFileType(_)
            | AppError::FileTooLarge { .. }
            | AppError::MissingFile
            | AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Multipart(e) => e.status(),
            AppError::InvalidSignature(_) => StatusCode::FORBIDDEN,
            AppError::JobNotFound | AppError::FileNotReady | AppError::OutputMissing => {
                StatusCode::NOT_FOUND
            }
            AppError::Upstream(_) | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }
        ApiError(self.to_string(), status).into_response()
    }
}

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::error;
use thiserror::Error;

use crate::data::model::ColumnError;
use crate::storage::StorageError;

// ---------------------------------------------------------------------------
// Upload errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file part")]
    NoFilePart,

    #[error("No selected file")]
    NoSelectedFile,

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Multipart(#[from] MultipartError),

    #[error("upload task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

// ---------------------------------------------------------------------------
// Analysis errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("File '{0}' not found")]
    NotFound(String),

    #[error("Could not read '{filename}': {message}")]
    Load { filename: String, message: String },

    #[error(transparent)]
    Column(#[from] ColumnError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("rendering plot failed: {0:#}")]
    Render(anyhow::Error),
}

impl AnalysisError {
    /// Client-caused failures are 4xx, everything else 500.
    pub fn status(&self) -> StatusCode {
        match self {
            AnalysisError::NotFound(_) => StatusCode::NOT_FOUND,
            AnalysisError::Load { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AnalysisError::Column(err) => column_status(err),
            AnalysisError::Storage(err) => storage_status(err),
            AnalysisError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A missing column is reported on the page, not as a failed request.
pub fn column_status(err: &ColumnError) -> StatusCode {
    match err {
        ColumnError::NotFound(_) => StatusCode::OK,
        ColumnError::NonNumeric { .. } | ColumnError::Empty(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}

pub fn storage_status(err: &StorageError) -> StatusCode {
    match err {
        StorageError::InvalidFilename(_) | StorageError::DisallowedExtension { .. } => {
            StatusCode::BAD_REQUEST
        }
        StorageError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// ---------------------------------------------------------------------------
// Internal errors
// ---------------------------------------------------------------------------

/// Failures the client cannot fix. Logged in full, answered with a generic
/// 500.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("rendering page: {0}")]
    Template(#[from] handlebars::RenderError),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Request failed: {self}");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

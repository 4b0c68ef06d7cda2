//! Crate-wide error type and its HTTP mapping.
//!
//! Mirrors the teacher's `repository::RepositoryError` convention (a small
//! `thiserror` enum with a `NotFound` variant carrying a message) but
//! generalizes it to the full taxonomy this appliance needs and adds an
//! axum `IntoResponse` impl, since this crate's error surface crosses the
//! HTTP boundary directly instead of staying internal to a repository.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed or semantically invalid input (bad upload, bad query params).
    #[error("validation error: {0}")]
    Validation(String),

    /// The requested entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Upload content hash already exists for this document.
    #[error("duplicate content: document {doc_id}, version {version_id}")]
    Duplicate { doc_id: String, version_id: String },

    /// A downstream collaborator (embedder, Tika, object store) failed or
    /// returned something we can't use.
    #[error("upstream service error: {0}")]
    Upstream(String),

    /// A pipeline stage could not complete for reasons internal to the
    /// stage's own logic (not a collaborator failure).
    #[error("stage error: {0}")]
    Stage(String),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("migration error: {0}")]
    Migration(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            // Upload dedup is a successful outcome from the caller's point of
            // view (spec.md's upload flow returns the existing version), not
            // an error status; handlers that can hit this convert it to a
            // 200 response themselves before it would ever reach here.
            AppError::Duplicate { .. } => StatusCode::OK,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Stage(_) | AppError::Database(_) | AppError::Migration(_) | AppError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

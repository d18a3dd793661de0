//! Error types for the search server
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Queue Error Enum ==
/// Errors raised by the recency queue.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// Dequeue was called on a queue with no elements
    #[error("Cannot dequeue from an empty collection")]
    EmptyCollection,
}

// == Store Error Enum ==
/// Errors raised by the in-memory document store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A document violates the unique index on its collection
    #[error("Duplicate key in collection '{collection}': {key}")]
    DuplicateKey { collection: String, key: String },

    /// A text search ran on a collection without a text index on the field
    #[error("Text index required on '{field}' in collection '{collection}'")]
    MissingTextIndex { collection: String, field: String },

    /// Reading or writing a data file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A data file could not be parsed or produced
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// == App Error Enum ==
/// Unified error type for the search server.
#[derive(Error, Debug)]
pub enum AppError {
    /// Requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Document store failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the search server.
pub type Result<T> = std::result::Result<T, AppError>;

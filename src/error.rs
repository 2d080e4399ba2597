//! Error types shared by the store, the service and the HTTP layer

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Errors that can occur while serving the songs library.
#[derive(Debug, Error)]
pub enum SongError {
    /// A request value could not be used (bad id, missing title or group)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No song row matches the id
    #[error("song {0} not found")]
    NotFound(i64),

    /// Any failure coming from the relational store
    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),

    /// The external song info lookup failed or answered with a non-success status
    #[error("enrichment failed: {0}")]
    Enrichment(String),

    /// A response body could not be serialized
    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl SongError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn enrichment(msg: impl Into<String>) -> Self {
        Self::Enrichment(msg.into())
    }
}

impl From<reqwest::Error> for SongError {
    fn from(err: reqwest::Error) -> Self {
        Self::Enrichment(err.to_string())
    }
}

impl ResponseError for SongError {
    fn status_code(&self) -> StatusCode {
        match self {
            SongError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            SongError::NotFound(_) => StatusCode::NOT_FOUND,
            SongError::Enrichment(_) => StatusCode::BAD_GATEWAY,
            SongError::Store(_) | SongError::Encoding(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string()
        }))
    }
}

pub type SongResult<T> = std::result::Result<T, SongError>;

//! HTTP transport for the docferry upload engine.
//!
//! Implements the engine's `ChunkTransport` seam over the backend's JSON
//! API, attaching a bearer token from a pluggable [`TokenProvider`] to every
//! call.

mod auth;
mod http;

pub use auth::{NoAuth, StaticToken, TokenProvider};
pub use http::HttpTransport;

/// Errors produced by the HTTP transport.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("backend rejected the request: {0}")]
    Rejected(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("finalize response carried no data")]
    MissingData,
}

impl From<ClientError> for docferry_transfer::TransferError {
    fn from(e: ClientError) -> Self {
        docferry_transfer::TransferError::Transport(e.to_string())
    }
}

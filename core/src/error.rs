//! Error type for the shim.
//!
//! # Design
//! Engine failures are carried as the engine's own `ureq::Error`, untouched,
//! so callers can match on connect/timeout/TLS cases exactly as ureq reports
//! them. The remaining variants cover what the shim itself can reject before
//! anything reaches the wire.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The engine failed to complete the call.
    #[error("transport error: {0}")]
    Transport(#[from] ureq::Error),

    /// Streaming the request body failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Method, URL or a header could not be represented as a native request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),
}

impl From<http::Error> for ClientError {
    fn from(err: http::Error) -> Self {
        ClientError::InvalidRequest(err.to_string())
    }
}

//! Error types for the HTTP server.

use thiserror::Error;

use crate::parser::Error as ParserError;

/// Errors that can occur while dispatching a request or running the server.
#[derive(Debug, Error)]
pub enum Error {
    /// Error parsing an HTTP request.
    #[error("Parse error: {0}")]
    Parse(#[from] ParserError),

    /// A status code outside the supported table was requested.
    #[error("Invalid status or status argument not set: {0}")]
    InvalidStatus(u16),

    /// A middleware, hook or handler reported a failure.
    #[error("Handler failure: {0}")]
    HandlerFailure(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for [`Error::HandlerFailure`] from anything printable.
    pub fn handler(message: impl std::fmt::Display) -> Self {
        Error::HandlerFailure(message.to_string())
    }
}

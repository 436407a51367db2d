//! Error types for the HTTP parser.

use thiserror::Error;

/// Errors that can occur while turning raw bytes into a [`Request`](crate::parser::Request).
#[derive(Debug, Error)]
pub enum Error {
    /// The request is empty.
    #[error("Invalid request")]
    InvalidRequest,

    /// The request line is malformed (wrong number of tokens or not UTF-8).
    #[error("Malformed request line: {0}")]
    MalformedRequestLine(String),

    /// The HTTP method in the request is not supported.
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// A header line is missing the `": "` separator, or its key or value is empty.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// A query string pair is missing `=`, a key, or a value.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// A body was sent without a `Content-Type` header.
    #[error("Missing Content-Type header")]
    MissingContentType,

    /// The body could not be decoded as JSON.
    #[error("Invalid body: {0}")]
    InvalidBody(#[from] serde_json::Error),

    /// A multipart part carries its own `Content-Type` (file uploads).
    #[error("Body type not supported yet")]
    UnsupportedBodyPart,
}

//! Error types for the carelink transport layer.

use thiserror::Error;

/// Errors surfaced by [`crate::ApiClient`] and its callers.
///
/// `Status` and `Transport` messages are displayable verbatim; pages
/// render them without additional formatting.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Backend returned a non-success status. The message is built from
    /// the response body (JSON `detail` preferred), else the raw text,
    /// else the status line.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// Transport failed before a response was received.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body could not be decoded into the expected shape.
    #[error("response decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    /// Caller-side validation failed before any request was sent.
    #[error("{0}")]
    Invalid(String),
}

impl ClientError {
    /// Status code of the response, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for transport operations.
pub type ClientResult<T> = Result<T, ClientError>;

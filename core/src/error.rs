//! Error types for the console API client.
//!
//! # Design
//! The server answers application-level failures with a
//! `{success: false, message}` envelope, sometimes on a 2xx status and
//! sometimes on a 4xx. `Rejected` covers the first case; `NotFound` and
//! `HttpError` cover non-2xx statuses and keep whatever message the body
//! carried so forms can show it. `Transport` is the host telling us no
//! response arrived at all.

use crate::http::TransportError;

/// Errors returned by `ConsoleClient` parse methods.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 2xx response whose envelope says `success: false`.
    #[error("request rejected: {}", or_unspecified(.message))]
    Rejected { message: Option<String> },

    /// The server returned 404.
    #[error("resource not found")]
    NotFound { message: Option<String> },

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError {
        status: u16,
        message: Option<String>,
        body: String,
    },

    /// No response was received.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

fn or_unspecified(message: &Option<String>) -> &str {
    message.as_deref().unwrap_or("no message")
}

impl ApiError {
    /// The human-readable message the server attached, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { message }
            | ApiError::NotFound { message }
            | ApiError::HttpError { message, .. } => {
                message.as_deref().filter(|m| !m.trim().is_empty())
            }
            _ => None,
        }
    }

    /// True for a well-formed `success: false` answer.
    pub fn is_rejection(&self) -> bool {
        matches!(self, ApiError::Rejected { .. })
    }
}

//! Call-level error type.

use thiserror::Error;

use super::category::ErrorCategory;
use crate::traits::HttpError;

/// Failures of a single JSON-RPC call.
///
/// Cancellation is deliberately absent: an aborted call ends with
/// [`CallOutcome::Aborted`](crate::client::CallOutcome), not an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    /// A streaming method got a response with no readable body.
    #[error("Streaming is not supported by the server (no response body)")]
    StreamUnsupported,

    /// Non-2xx HTTP status. `body` is the raw response text.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Request parameters were malformed; the call was never issued.
    #[error("Invalid request payload: {0}")]
    PayloadParse(String),

    /// Network failure before or during the response body.
    #[error("Transport error: {0}")]
    Transport(String),

    /// JSON-RPC error object in a 2xx response.
    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ClientError::StreamUnsupported => ErrorCategory::Server,
            ClientError::Http { status, .. } if *status >= 500 => ErrorCategory::Server,
            ClientError::Http { .. } => ErrorCategory::Client,
            ClientError::PayloadParse(_) => ErrorCategory::User,
            ClientError::Transport(_) => ErrorCategory::Network,
            ClientError::Rpc { .. } => ErrorCategory::Server,
            ClientError::Config(_) => ErrorCategory::Configuration,
        }
    }

    /// Whether retrying the same call could plausibly succeed.
    ///
    /// The client itself never retries; this is advice for the caller.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Http { status, .. } => *status >= 500 || *status == 429 || *status == 408,
            ClientError::StreamUnsupported => false,
            other => other.category().is_retryable(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::StreamUnsupported => "E_STREAM_UNSUPPORTED",
            ClientError::Http { .. } => "E_HTTP",
            ClientError::PayloadParse(_) => "E_PAYLOAD",
            ClientError::Transport(_) => "E_TRANSPORT",
            ClientError::Rpc { .. } => "E_RPC",
            ClientError::Config(_) => "E_CONFIG",
        }
    }

    /// HTTP status carried by this error, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<HttpError> for ClientError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::ServerError { status, message } => ClientError::Http {
                status,
                body: message,
            },
            other => ClientError::Transport(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::PayloadParse(err.to_string())
    }
}

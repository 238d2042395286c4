//! Error category classification.
//!
//! Categories give callers a coarse handle on a failure: whether retrying
//! could help and which side of the wire is at fault.

use std::fmt;

/// High-level categorization of client errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Connection, DNS, timeout, or a stream cut off mid-body.
    Network,

    /// Service-side failure (HTTP 5xx, JSON-RPC error, missing stream body).
    Server,

    /// Request rejected as malformed or unauthorized (HTTP 4xx).
    Client,

    /// Caller-provided input could not be used (bad JSON params).
    User,

    /// Missing or malformed configuration.
    Configuration,
}

impl ErrorCategory {
    /// Returns true if errors in this category are generally transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Server => "server",
            ErrorCategory::Client => "client",
            ErrorCategory::User => "user",
            ErrorCategory::Configuration => "configuration",
        }
    }

    /// Returns suggested recovery actions for this category.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Check that the endpoint is reachable and try again",
            ErrorCategory::Server => "The task service reported a failure; inspect the response body",
            ErrorCategory::Client => "Check the method, parameters, and authentication headers",
            ErrorCategory::User => "Fix the request parameters and send again",
            ErrorCategory::Configuration => "Check the endpoint and credential settings",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

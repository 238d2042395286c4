//! Endpoint and authentication provider trait.
//!
//! The client never builds or validates credentials itself. On every call it
//! asks the provider for the endpoint URL and the headers to forward, and
//! passes those headers through unchanged.

use super::http::Headers;

/// Supplies the endpoint, authentication headers, and user identifier.
///
/// # Example
///
/// ```ignore
/// use a2a_probe::traits::{AuthProvider, Headers};
///
/// struct Static;
///
/// impl AuthProvider for Static {
///     fn endpoint(&self) -> String {
///         "http://localhost:8000/a2a".to_string()
///     }
///     fn headers(&self) -> Headers {
///         Headers::new()
///     }
/// }
/// ```
pub trait AuthProvider: Send + Sync {
    /// JSON-RPC endpoint URL for the next call.
    fn endpoint(&self) -> String;

    /// Extra headers (bearer token, API key, ...) forwarded on every call.
    fn headers(&self) -> Headers;

    /// User identifier attached to outgoing messages, if any.
    fn user_id(&self) -> Option<String> {
        None
    }
}

/// Fixed endpoint with no authentication, mostly for tests and local servers.
#[derive(Debug, Clone, Default)]
pub struct StaticAuth {
    pub endpoint: String,
    pub headers: Headers,
    pub user_id: Option<String>,
}

impl StaticAuth {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

impl AuthProvider for StaticAuth {
    fn endpoint(&self) -> String {
        self.endpoint.clone()
    }

    fn headers(&self) -> Headers {
        self.headers.clone()
    }

    fn user_id(&self) -> Option<String> {
        self.user_id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_auth_builder() {
        let auth = StaticAuth::new("http://localhost/a2a")
            .with_header("X-API-Key", "k")
            .with_user_id("alice");
        assert_eq!(auth.endpoint(), "http://localhost/a2a");
        assert_eq!(auth.headers().get("X-API-Key"), Some(&"k".to_string()));
        assert_eq!(auth.user_id().as_deref(), Some("alice"));
    }

    #[test]
    fn test_default_user_id_is_none() {
        struct Bare;
        impl AuthProvider for Bare {
            fn endpoint(&self) -> String {
                String::new()
            }
            fn headers(&self) -> Headers {
                Headers::new()
            }
        }
        assert!(Bare.user_id().is_none());
    }
}

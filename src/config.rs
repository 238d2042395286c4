//! Client configuration.
//!
//! Settings are layered, later layers winning:
//! 1. Built-in defaults
//! 2. JSON file (`<config_dir>/a2a-probe/config.json`, or an explicit path)
//! 3. Environment variables (`A2A_PROBE_*`)
//! 4. Command-line flags (applied by the binary through the `with_*` setters)

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::traits::{AuthProvider, Headers};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/a2a";

pub const ENV_ENDPOINT: &str = "A2A_PROBE_ENDPOINT";
pub const ENV_USER_ID: &str = "A2A_PROBE_USER_ID";
pub const ENV_API_KEY: &str = "A2A_PROBE_API_KEY";
pub const ENV_BEARER_TOKEN: &str = "A2A_PROBE_BEARER_TOKEN";

const CONFIG_DIR_NAME: &str = "a2a-probe";
const CONFIG_FILE_NAME: &str = "config.json";

/// Endpoint and credentials for the task service.
///
/// # Example
///
/// ```ignore
/// use a2a_probe::config::ClientConfig;
///
/// let config = ClientConfig::load(None)?
///     .with_endpoint("http://localhost:9000/a2a")
///     .with_bearer_token("secret");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
    pub endpoint: String,
    pub user_id: Option<String>,
    pub api_key: Option<String>,
    pub bearer_token: Option<String>,
    pub extra_headers: HashMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_id: None,
            api_key: None,
            bearer_token: None,
            extra_headers: HashMap::new(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config file location, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load defaults, file and environment layers.
    ///
    /// An explicit path must exist. The default path is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ClientError> {
        let config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|path| path.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        let config = config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ClientError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&text)
            .map_err(|e| ClientError::Config(format!("invalid {}: {}", path.display(), e)))
    }

    /// Overlay the `A2A_PROBE_*` environment variables.
    pub fn apply_env(self) -> Self {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay variables from `lookup`. Blank values are ignored.
    pub fn apply_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(endpoint) = get(ENV_ENDPOINT) {
            self.endpoint = endpoint;
        }
        if let Some(user_id) = get(ENV_USER_ID) {
            self.user_id = Some(user_id);
        }
        if let Some(api_key) = get(ENV_API_KEY) {
            self.api_key = Some(api_key);
        }
        if let Some(token) = get(ENV_BEARER_TOKEN) {
            self.bearer_token = Some(token);
        }
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(name.into(), value.into());
        self
    }

    /// The endpoint must be an absolute http(s) URL.
    pub fn validate(&self) -> Result<(), ClientError> {
        let endpoint = self.endpoint.trim();
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            Ok(())
        } else {
            Err(ClientError::Config(format!(
                "endpoint must be an http(s) URL, got '{}'",
                self.endpoint
            )))
        }
    }
}

impl AuthProvider for ClientConfig {
    fn endpoint(&self) -> String {
        self.endpoint.trim().to_string()
    }

    fn headers(&self) -> Headers {
        let mut headers = self.extra_headers.clone();
        if let Some(token) = self.bearer_token.as_deref().filter(|t| !t.is_empty()) {
            headers.insert("Authorization".to_string(), format!("Bearer {}", token));
        }
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            headers.insert("X-API-Key".to_string(), key.to_string());
        }
        headers
    }

    fn user_id(&self) -> Option<String> {
        self.user_id.clone().filter(|u| !u.trim().is_empty())
    }
}

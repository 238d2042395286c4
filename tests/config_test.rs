//! Config loading from files and the process environment.

use std::io::Write;

use a2a_probe::config::{
    ClientConfig, DEFAULT_ENDPOINT, ENV_API_KEY, ENV_BEARER_TOKEN, ENV_ENDPOINT, ENV_USER_ID,
};
use a2a_probe::error::ClientError;
use a2a_probe::traits::AuthProvider;
use serial_test::serial;
use tempfile::{NamedTempFile, TempDir};

fn clear_env() {
    for key in [ENV_ENDPOINT, ENV_USER_ID, ENV_API_KEY, ENV_BEARER_TOKEN] {
        std::env::remove_var(key);
    }
}

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
#[serial]
fn test_file_then_env_layering() {
    clear_env();
    let file = config_file(
        r#"{
            "endpoint": "https://agent.example/a2a",
            "apiKey": "file-key",
            "userId": "file-user",
            "extraHeaders": {"X-Tenant": "acme"}
        }"#,
    );
    std::env::set_var(ENV_BEARER_TOKEN, "env-token");
    std::env::set_var(ENV_USER_ID, "env-user");

    let config = ClientConfig::load(Some(file.path())).unwrap();
    clear_env();

    assert_eq!(config.endpoint(), "https://agent.example/a2a");
    assert_eq!(config.user_id().as_deref(), Some("env-user"));
    let headers = config.headers();
    assert_eq!(headers.get("X-API-Key").unwrap(), "file-key");
    assert_eq!(headers.get("Authorization").unwrap(), "Bearer env-token");
    assert_eq!(headers.get("X-Tenant").unwrap(), "acme");
}

#[test]
#[serial]
fn test_empty_file_uses_defaults() {
    clear_env();
    let file = config_file("{}");
    let config = ClientConfig::load(Some(file.path())).unwrap();
    assert_eq!(config, ClientConfig::default());
    assert_eq!(config.endpoint(), DEFAULT_ENDPOINT);
}

#[test]
#[serial]
fn test_missing_explicit_file_is_an_error() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.json");
    assert!(matches!(
        ClientConfig::load(Some(&missing)),
        Err(ClientError::Config(_))
    ));
}

#[test]
#[serial]
fn test_malformed_file_is_an_error() {
    clear_env();
    let file = config_file("{ endpoint: ");
    let err = ClientConfig::load(Some(file.path())).unwrap_err();
    assert!(matches!(err, ClientError::Config(_)));
    assert_eq!(err.error_code(), "E_CONFIG");
}

#[test]
#[serial]
fn test_env_endpoint_must_be_http() {
    clear_env();
    let file = config_file("{}");
    std::env::set_var(ENV_ENDPOINT, "ftp://agent.example");
    let result = ClientConfig::load(Some(file.path()));
    clear_env();
    assert!(matches!(result, Err(ClientError::Config(_))));
}

#[test]
#[serial]
fn test_blank_env_values_are_ignored() {
    clear_env();
    let file = config_file(r#"{"apiKey": "file-key"}"#);
    std::env::set_var(ENV_API_KEY, "   ");
    let config = ClientConfig::load(Some(file.path())).unwrap();
    clear_env();
    assert_eq!(config.api_key.as_deref(), Some("file-key"));
}

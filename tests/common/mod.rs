//! Common test utilities for integration tests.
//!
//! Fixtures for building clients against mock transports and for writing
//! SSE bodies.
//!
//! # Example
//!
//! ```ignore
//! use common::{mock_client, sse_body};
//!
//! let (client, http) = mock_client();
//! ```

#![allow(dead_code)]

pub mod mocks;

pub use mocks::*;

use std::sync::Arc;

use a2a_probe::client::A2aClient;
use a2a_probe::debug::{create_effect_channel, Effect};
use a2a_probe::traits::StaticAuth;
use serde_json::{json, Value};
use tokio::sync::broadcast;

pub const TEST_ENDPOINT: &str = "http://localhost:8000/a2a";

/// Client over a fresh [`MockHttpClient`], plus a handle to that mock.
pub fn mock_client() -> (A2aClient<MockHttpClient>, MockHttpClient) {
    let http = MockHttpClient::new();
    let client = A2aClient::new(
        http.clone(),
        Arc::new(StaticAuth::new(TEST_ENDPOINT).with_user_id("test-user")),
    );
    (client, http)
}

/// Same as [`mock_client`] with an effect receiver attached.
pub fn mock_client_with_effects() -> (
    A2aClient<MockHttpClient>,
    MockHttpClient,
    broadcast::Receiver<Effect>,
) {
    let (tx, rx) = create_effect_channel(1024);
    let (client, http) = mock_client();
    (client.with_effects(tx), http, rx)
}

/// Drain every effect currently buffered in the receiver.
pub fn drain(rx: &mut broadcast::Receiver<Effect>) -> Vec<Effect> {
    let mut effects = Vec::new();
    while let Ok(effect) = rx.try_recv() {
        effects.push(effect);
    }
    effects
}

/// Encode payloads as one SSE body.
pub fn sse_body(payloads: &[Value]) -> String {
    payloads
        .iter()
        .map(|p| format!("data: {}\n\n", p))
        .collect()
}

pub fn agent_message(text: &str) -> Value {
    json!({"message": {"role": "agent", "parts": [{"text": text}]}})
}

pub fn status_update(task_id: &str, context_id: &str, state: &str) -> Value {
    json!({"statusUpdate": {
        "taskId": task_id,
        "contextId": context_id,
        "status": {"state": state},
        "final": state == "completed"
    }})
}

pub fn artifact_update(text: &str, append: bool) -> Value {
    json!({"artifactUpdate": {
        "artifact": {"parts": [{"text": text}]},
        "append": append
    }})
}

/// JSON-RPC success wrapper.
pub fn rpc_result(result: Value) -> Value {
    json!({"jsonrpc": "2.0", "id": "1", "result": result})
}

/// A completed task with one user turn and one agent reply in its history.
pub fn completed_task(task_id: &str, context_id: &str, reply: &str) -> Value {
    json!({
        "id": task_id,
        "contextId": context_id,
        "status": {"state": "completed"},
        "history": [
            {"role": "user", "parts": [{"text": "question"}]},
            {"role": "agent", "parts": [{"text": reply}]}
        ]
    })
}

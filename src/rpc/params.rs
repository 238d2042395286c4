//! Request parameter builders.

use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::error::ClientError;
use crate::session::{normalize_id, SessionIdentity};

/// Parameters for `SendMessage` / `SendStreamingMessage`.
///
/// Identity fields and the user id are only included when known.
pub fn message_params(text: &str, identity: &SessionIdentity, user_id: Option<&str>) -> Value {
    let mut message = Map::new();
    message.insert("role".into(), json!("user"));
    message.insert("messageId".into(), json!(Uuid::new_v4().to_string()));
    message.insert("parts".into(), json!([{ "text": text }]));
    if !identity.task_id.is_empty() {
        message.insert("taskId".into(), json!(identity.task_id));
    }
    if !identity.context_id.is_empty() {
        message.insert("contextId".into(), json!(identity.context_id));
    }

    let mut params = Map::new();
    params.insert("message".into(), Value::Object(message));
    if let Some(user_id) = user_id.map(str::trim).filter(|u| !u.is_empty()) {
        params.insert("userId".into(), json!(user_id));
    }
    Value::Object(params)
}

/// Parameters addressing one task (`GetTask`, `CancelTask`, `SubscribeToTask`).
pub fn task_params(task_id: &str) -> Value {
    let id = normalize_id(task_id);
    json!({ "id": id, "name": format!("tasks/{}", id) })
}

pub fn list_params() -> Value {
    json!({})
}

/// Parse caller-supplied parameters. Anything but a JSON object is rejected.
pub fn parse_params(text: &str) -> Result<Value, ClientError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(list_params());
    }
    let value: Value = serde_json::from_str(trimmed)?;
    if !value.is_object() {
        return Err(ClientError::PayloadParse(
            "params must be a JSON object".to_string(),
        ));
    }
    Ok(value)
}

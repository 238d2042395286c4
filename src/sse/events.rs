//! Decoded stream event types.
//!
//! Every `data:` payload is decoded exactly once at the parser boundary into a
//! [`StreamPayload`]: either a typed [`StreamEvent`] or, when the payload is
//! not JSON, the raw text itself.

use serde::Serialize;
use serde_json::Value;

use crate::models::{Message, Task, TaskArtifactUpdate, TaskStatusUpdate};

/// Typed A2A stream event. Exactly one tag is populated per server event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum A2aEvent {
    /// Full task snapshot
    Task(Task),
    /// Task status transition
    StatusUpdate(TaskStatusUpdate),
    /// Artifact content chunk
    ArtifactUpdate(TaskArtifactUpdate),
    /// Direct agent (or echoed user) message
    Message(Message),
    /// Valid JSON that carries none of the known tags
    Unknown(Value),
}

impl A2aEvent {
    /// Decode a JSON value by tag presence.
    ///
    /// Also recognises bare results: a task object (`id` + `status`) and a
    /// message object (`role` + `parts`), which is how non-streaming
    /// `SendMessage` and `GetTask` replies commonly arrive.
    pub fn from_value(value: Value) -> Self {
        let Some(obj) = value.as_object() else {
            return A2aEvent::Unknown(value);
        };

        if let Some(inner) = obj.get("task") {
            if let Ok(task) = serde_json::from_value::<Task>(inner.clone()) {
                return A2aEvent::Task(task);
            }
        }
        if let Some(inner) = obj.get("statusUpdate") {
            if let Ok(update) = serde_json::from_value::<TaskStatusUpdate>(inner.clone()) {
                return A2aEvent::StatusUpdate(update);
            }
        }
        if let Some(inner) = obj.get("artifactUpdate") {
            if let Ok(update) = serde_json::from_value::<TaskArtifactUpdate>(inner.clone()) {
                return A2aEvent::ArtifactUpdate(update);
            }
        }
        if let Some(inner) = obj.get("message") {
            if let Ok(message) = serde_json::from_value::<Message>(inner.clone()) {
                return A2aEvent::Message(message);
            }
        }

        if obj.contains_key("id") && obj.contains_key("status") {
            if let Ok(task) = serde_json::from_value::<Task>(value.clone()) {
                return A2aEvent::Task(task);
            }
        }
        if obj.contains_key("role") && obj.contains_key("parts") {
            if let Ok(message) = serde_json::from_value::<Message>(value.clone()) {
                return A2aEvent::Message(message);
            }
        }

        A2aEvent::Unknown(value)
    }

    /// Returns the event tag name as used on the wire.
    pub fn event_type_name(&self) -> &'static str {
        match self {
            A2aEvent::Task(_) => "task",
            A2aEvent::StatusUpdate(_) => "statusUpdate",
            A2aEvent::ArtifactUpdate(_) => "artifactUpdate",
            A2aEvent::Message(_) => "message",
            A2aEvent::Unknown(_) => "unknown",
        }
    }

    /// Task state carried by this event, if any.
    pub fn status_state(&self) -> Option<&str> {
        let state = match self {
            A2aEvent::Task(task) => task.status.as_ref().map(|s| s.state.as_str()),
            A2aEvent::StatusUpdate(update) => update.status.as_ref().map(|s| s.state.as_str()),
            _ => None,
        };
        state.filter(|s| !s.trim().is_empty())
    }

    fn status_timestamp(&self) -> Option<String> {
        let status = match self {
            A2aEvent::Task(task) => task.status.as_ref(),
            A2aEvent::StatusUpdate(update) => update.status.as_ref(),
            _ => None,
        };
        status.and_then(|s| s.timestamp.clone())
    }
}

/// A decoded event plus its optional server timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamEvent {
    pub event: A2aEvent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl StreamEvent {
    pub fn new(event: A2aEvent) -> Self {
        let timestamp = event.status_timestamp();
        Self { event, timestamp }
    }

    /// Decode a JSON value, removing a JSON-RPC response wrapper if present.
    pub fn from_value(value: Value) -> Self {
        let value = unwrap_rpc_result(value);
        let top_level = value
            .get("timestamp")
            .and_then(Value::as_str)
            .map(str::to_string);
        let mut decoded = Self::new(A2aEvent::from_value(value));
        if top_level.is_some() {
            decoded.timestamp = top_level;
        }
        decoded
    }
}

/// One payload produced by the frame parser.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum StreamPayload {
    /// JSON payload decoded into a typed event
    Event(StreamEvent),
    /// Payload that was not valid JSON, passed through unchanged
    Raw(String),
}

impl StreamPayload {
    /// Parse payload text as JSON, falling back to the raw text.
    pub fn from_text(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => StreamPayload::Event(StreamEvent::from_value(value)),
            Err(_) => StreamPayload::Raw(text.to_string()),
        }
    }

    /// Event type label for logs (`raw` for unparsed payloads).
    pub fn event_type_name(&self) -> &'static str {
        match self {
            StreamPayload::Event(event) => event.event.event_type_name(),
            StreamPayload::Raw(_) => "raw",
        }
    }

    pub fn as_event(&self) -> Option<&A2aEvent> {
        match self {
            StreamPayload::Event(event) => Some(&event.event),
            StreamPayload::Raw(_) => None,
        }
    }
}

fn unwrap_rpc_result(value: Value) -> Value {
    match value {
        Value::Object(mut map)
            if map.contains_key("result")
                && (map.contains_key("jsonrpc") || map.contains_key("id")) =>
        {
            map.remove("result").unwrap_or_default()
        }
        other => other,
    }
}

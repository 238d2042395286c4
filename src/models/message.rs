//! A2A message and part types.

use serde::{Deserialize, Serialize};

/// A single content part of a message or artifact.
///
/// Servers may send text, structured data, or both. Only `text` contributes
/// to round output.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Part {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

/// A conversational message exchanged with the agent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
}

impl Message {
    /// Whether this message was authored by the user.
    ///
    /// Accepts both `user` and the enum-style `ROLE_USER` spelling.
    pub fn is_from_user(&self) -> bool {
        let role = self.role.trim();
        role.eq_ignore_ascii_case("user") || role.eq_ignore_ascii_case("role_user")
    }

    /// Concatenated text of all text-bearing parts.
    pub fn text(&self) -> String {
        join_part_text(&self.parts)
    }
}

/// Join the text of every text-bearing part, skipping data-only parts.
pub fn join_part_text(parts: &[Part]) -> String {
    parts
        .iter()
        .filter_map(|part| part.text.as_deref())
        .collect::<Vec<_>>()
        .join("")
}

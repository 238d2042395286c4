//! A2A task, status, and artifact types.

use serde::{Deserialize, Serialize};

use super::message::{join_part_text, Message, Part};

/// Current state of a task plus an optional status message from the agent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    #[serde(default)]
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// An output artifact produced by a task.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Artifact {
    pub fn text(&self) -> String {
        join_part_text(&self.parts)
    }
}

/// A task snapshot as returned by `GetTask` or streamed as a `task` event.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default)]
    pub id: String,
    /// Resource name, usually `tasks/<id>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub history: Vec<Message>,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
}

impl Task {
    /// The task id, falling back to the resource name when `id` is absent.
    pub fn task_id(&self) -> &str {
        if !self.id.trim().is_empty() {
            return &self.id;
        }
        self.name.as_deref().unwrap_or("")
    }

    pub fn state(&self) -> Option<&str> {
        self.status.as_ref().map(|s| s.state.as_str()).filter(|s| !s.is_empty())
    }

    /// Text of the most recent non-user history message that carries text.
    pub fn latest_history_text(&self) -> Option<String> {
        self.history
            .iter()
            .rev()
            .filter(|msg| !msg.is_from_user())
            .map(Message::text)
            .find(|text| !text.trim().is_empty())
    }

    /// Text of all artifacts, one artifact per line.
    pub fn artifact_text(&self) -> Option<String> {
        let text = self
            .artifacts
            .iter()
            .map(Artifact::text)
            .filter(|text| !text.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Streamed notification that a task's status changed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, rename = "final")]
    pub is_final: bool,
}

/// Streamed artifact chunk for a task.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskArtifactUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
    #[serde(default)]
    pub artifact: Artifact,
    /// When true, the parts extend the previously streamed artifact text
    #[serde(default)]
    pub append: bool,
    #[serde(default)]
    pub last_chunk: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(text: &str) -> Message {
        Message {
            role: "agent".to_string(),
            parts: vec![Part::text(text)],
            ..Default::default()
        }
    }

    fn user(text: &str) -> Message {
        Message {
            role: "user".to_string(),
            parts: vec![Part::text(text)],
            ..Default::default()
        }
    }

    #[test]
    fn test_task_deserializes_wire_shape() {
        let json = r#"{
            "id": "t-1",
            "name": "tasks/t-1",
            "contextId": "c-1",
            "status": {"state": "completed", "timestamp": "2026-01-01T00:00:00Z"},
            "artifacts": [{"name": "final", "parts": [{"text": "answer"}]}]
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.task_id(), "t-1");
        assert_eq!(task.context_id.as_deref(), Some("c-1"));
        assert_eq!(task.state(), Some("completed"));
        assert!(task.history.is_empty());
        assert_eq!(task.artifact_text().as_deref(), Some("answer"));
    }

    #[test]
    fn test_task_id_falls_back_to_name() {
        let task = Task {
            name: Some("tasks/abc".to_string()),
            ..Default::default()
        };
        assert_eq!(task.task_id(), "tasks/abc");
    }

    #[test]
    fn test_latest_history_text_skips_user_and_empty() {
        let task = Task {
            history: vec![agent("first"), agent("second"), agent("  "), user("question")],
            ..Default::default()
        };
        assert_eq!(task.latest_history_text().as_deref(), Some("second"));
    }

    #[test]
    fn test_artifact_text_none_when_empty() {
        let task = Task {
            artifacts: vec![Artifact::default()],
            ..Default::default()
        };
        assert!(task.artifact_text().is_none());
    }

    #[test]
    fn test_status_update_final_flag() {
        let json = r#"{"taskId":"t","status":{"state":"completed"},"final":true}"#;
        let update: TaskStatusUpdate = serde_json::from_str(json).unwrap();
        assert!(update.is_final);
        assert_eq!(update.task_id.as_deref(), Some("t"));
    }

    #[test]
    fn test_artifact_update_append_defaults_false() {
        let json = r#"{"artifact":{"parts":[{"text":"x"}]}}"#;
        let update: TaskArtifactUpdate = serde_json::from_str(json).unwrap();
        assert!(!update.append);
        assert!(!update.last_chunk);
        assert_eq!(update.artifact.text(), "x");
    }
}

//! Session identity reconciliation.
//!
//! A conversation is identified by a `(taskId, contextId)` pair. Servers and
//! users supply these piecemeal: a status update may carry only a task id, a
//! manual input field only a context id. The rules here keep the pair
//! consistent: if either side is known, both are populated, and a known value
//! is never replaced with emptiness.

use serde::{Deserialize, Serialize};

use crate::sse::A2aEvent;

const TASK_PREFIX: &str = "tasks/";

/// Normalize an identifier: trim whitespace and strip a leading `tasks/`.
pub fn normalize_id(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix(TASK_PREFIX)
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}

/// The `(taskId, contextId)` pair of the attached server-side conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionIdentity {
    pub task_id: String,
    pub context_id: String,
}

impl SessionIdentity {
    /// Resolve candidate ids into a pair.
    ///
    /// Both empty yields the empty identity. Otherwise a missing side is
    /// backfilled from the other side.
    pub fn resolve(task_id: &str, context_id: &str) -> Self {
        let task_id = normalize_id(task_id);
        let context_id = normalize_id(context_id);
        match (task_id.is_empty(), context_id.is_empty()) {
            (true, true) => Self::default(),
            (true, false) => Self {
                task_id: context_id.clone(),
                context_id,
            },
            (false, true) => Self {
                context_id: task_id.clone(),
                task_id,
            },
            (false, false) => Self { task_id, context_id },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.task_id.is_empty() && self.context_id.is_empty()
    }

    /// Merge candidate ids into this identity.
    ///
    /// A missing candidate side is first taken from the stored value, then
    /// the pair is resolved and compared field by field. Only differing
    /// fields are written; `changed` reports whether any field was.
    pub fn merge(&self, task_id: &str, context_id: &str) -> (Self, bool) {
        let mut task_candidate = normalize_id(task_id);
        let mut context_candidate = normalize_id(context_id);

        if task_candidate.is_empty() && context_candidate.is_empty() {
            return (self.clone(), false);
        }
        if task_candidate.is_empty() {
            task_candidate = self.task_id.clone();
        }
        if context_candidate.is_empty() {
            context_candidate = self.context_id.clone();
        }

        let resolved = Self::resolve(&task_candidate, &context_candidate);
        let mut next = self.clone();
        let mut changed = false;
        if !resolved.task_id.is_empty() && resolved.task_id != next.task_id {
            next.task_id = resolved.task_id;
            changed = true;
        }
        if !resolved.context_id.is_empty() && resolved.context_id != next.context_id {
            next.context_id = resolved.context_id;
            changed = true;
        }
        (next, changed)
    }
}

/// Raw `(taskId, contextId)` candidates carried by an event.
///
/// Returns `None` when the event carries no identity at all.
pub fn identity_candidates(event: &A2aEvent) -> Option<(String, String)> {
    let (task_id, context_id) = match event {
        A2aEvent::Task(task) => (Some(task.task_id()), task.context_id.as_deref()),
        A2aEvent::StatusUpdate(update) => (update.task_id.as_deref(), update.context_id.as_deref()),
        A2aEvent::ArtifactUpdate(update) => {
            (update.task_id.as_deref(), update.context_id.as_deref())
        }
        A2aEvent::Message(message) => (message.task_id.as_deref(), message.context_id.as_deref()),
        A2aEvent::Unknown(_) => (None, None),
    };
    let task_id = task_id.unwrap_or("").to_string();
    let context_id = context_id.unwrap_or("").to_string();
    if task_id.trim().is_empty() && context_id.trim().is_empty() {
        None
    } else {
        Some((task_id, context_id))
    }
}

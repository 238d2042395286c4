//! Structured side effects produced by the session core.
//!
//! The session never performs I/O. Each state transition returns a list of
//! [`Effect`]s (log entries, duration annotations, output text, statistics
//! snapshots) which the client forwards to collaborators over a tokio
//! broadcast channel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::session::RunStatistics;

/// Type alias for the effect sender.
pub type EffectSender = broadcast::Sender<Effect>;

/// Create a new effect channel with the specified capacity.
///
/// The sender can be cloned for multiple producers, and the receiver can be
/// resubscribed for multiple consumers.
pub fn create_effect_channel(capacity: usize) -> (EffectSender, broadcast::Receiver<Effect>) {
    broadcast::channel(capacity)
}

/// Send effects to the channel, ignoring the case where nobody listens.
pub fn emit_effects(tx: &Option<EffectSender>, effects: Vec<Effect>) {
    if let Some(tx) = tx {
        for effect in effects {
            let _ = tx.send(effect);
        }
    }
}

/// Opaque identifier of a log entry, used to annotate it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogHandle(pub u64);

/// Which part of a call a log entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogStage {
    /// Outbound JSON-RPC request
    Request,
    /// One decoded stream event
    Stream,
    /// Single-shot response or end of stream
    Response,
    /// Call failure
    Error,
    /// Caller cancelled the call
    Aborted,
    /// Session identity or round bookkeeping
    Session,
    /// History replay
    History,
}

/// One structured log record for the log sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub handle: LogHandle,
    pub title: String,
    pub event_type: String,
    pub stage: LogStage,
    pub detail: String,
    pub timestamp: DateTime<Utc>,
}

/// A side effect to be applied by the caller.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    /// Append a record to the log sink
    Log(LogEntry),
    /// Attach a request/response duration to an earlier request entry
    Annotate { handle: LogHandle, duration_ms: i64 },
    /// The selected round's text changed
    Output { round_id: Option<u64>, text: String },
    /// Latest statistics record
    Stats(RunStatistics),
}

impl Effect {
    pub fn as_log(&self) -> Option<&LogEntry> {
        match self {
            Effect::Log(entry) => Some(entry),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> LogEntry {
        LogEntry {
            handle: LogHandle(7),
            title: "SendMessage".to_string(),
            event_type: "request".to_string(),
            stage: LogStage::Request,
            detail: "{}".to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_log_effect_serialization() {
        let json = serde_json::to_string(&Effect::Log(entry())).expect("Failed to serialize");
        assert!(json.contains("\"type\":\"log\""));
        assert!(json.contains("\"stage\":\"request\""));
        assert!(json.contains("\"handle\":7"));
        assert!(json.contains("\"timestamp\""));
    }

    #[test]
    fn test_annotate_serialization() {
        let effect = Effect::Annotate {
            handle: LogHandle(3),
            duration_ms: 120,
        };
        let json = serde_json::to_string(&effect).expect("Failed to serialize");
        assert!(json.contains("\"type\":\"annotate\""));
        assert!(json.contains("\"duration_ms\":120"));
    }

    #[test]
    fn test_emit_effects_reaches_receiver() {
        let (tx, mut rx) = create_effect_channel(8);
        emit_effects(
            &Some(tx),
            vec![Effect::Output {
                round_id: Some(1),
                text: "hi".to_string(),
            }],
        );
        match rx.try_recv().unwrap() {
            Effect::Output { round_id, text } => {
                assert_eq!(round_id, Some(1));
                assert_eq!(text, "hi");
            }
            other => panic!("Expected Output, got {:?}", other),
        }
    }

    #[test]
    fn test_emit_effects_without_sender_is_noop() {
        emit_effects(&None, vec![Effect::Log(entry())]);
    }

    #[test]
    fn test_as_log() {
        assert!(Effect::Log(entry()).as_log().is_some());
        let effect = Effect::Annotate {
            handle: LogHandle(1),
            duration_ms: 0,
        };
        assert!(effect.as_log().is_none());
    }
}

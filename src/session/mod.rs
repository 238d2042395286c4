//! Per-session protocol state.
//!
//! [`Session`] owns the identity pair, the rounds, the live statistics record
//! and the pending-request queue. It performs no I/O: every transition returns
//! the [`Effect`]s the caller should apply (log entries, duration annotations,
//! output changes, statistics snapshots).
//!
//! # Module structure
//! - `identity` - `(taskId, contextId)` normalization and merge rules
//! - `rounds` - Round numbering, output accumulation and selection
//! - `stats` - Run statistics and request/response timing

mod identity;
mod rounds;
mod stats;

pub use identity::{identity_candidates, normalize_id, SessionIdentity};
pub use rounds::{extract_output, Round, RoundCorrelator, RoundOutput};
pub use stats::{PendingRequests, RunStatistics, StatsTracker};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::debug::{Effect, LogEntry, LogHandle, LogStage};
use crate::error::ClientError;
use crate::models::Task;
use crate::rpc::RpcMethod;
use crate::sse::StreamPayload;

/// Title used for entries not tied to a call.
const SESSION_TITLE: &str = "session";

#[derive(Debug, Clone, Default)]
pub struct Session {
    identity: SessionIdentity,
    rounds: RoundCorrelator,
    stats: StatsTracker,
    pending: PendingRequests,
    next_handle: u64,
    /// Last output delivered to the sink, used to suppress duplicates
    last_output: Option<(Option<u64>, String)>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    pub fn rounds(&self) -> &RoundCorrelator {
        &self.rounds
    }

    pub fn stats(&self) -> Option<RunStatistics> {
        self.stats.snapshot()
    }

    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }

    /// Text of the selected round.
    pub fn output_text(&self) -> String {
        self.rounds.current_output_text()
    }

    /// Merge candidate ids from traffic or from manual input.
    pub fn merge_identity(
        &mut self,
        task_id: &str,
        context_id: &str,
        now: DateTime<Utc>,
    ) -> Vec<Effect> {
        let (next, changed) = self.identity.merge(task_id, context_id);
        if !changed {
            return Vec::new();
        }
        tracing::debug!(
            "Session identity changed: task={} context={}",
            next.task_id, next.context_id
        );
        self.identity = next;
        self.stats
            .on_identity(&self.identity.task_id, &self.identity.context_id);
        let detail = to_detail(&self.identity);
        let (_, entry) = self.log(SESSION_TITLE, "identity", LogStage::Session, detail, now);
        vec![entry]
    }

    /// Enter the `sending` state of a call.
    ///
    /// Starts a fresh statistics record, opens a round for send-type methods,
    /// and logs the request with a pending entry for later timing.
    pub fn begin_call(
        &mut self,
        request_id: &str,
        method: RpcMethod,
        endpoint: &str,
        request_json: String,
        now: DateTime<Utc>,
    ) -> Vec<Effect> {
        self.stats
            .start_at(request_id, method.as_str(), endpoint, method.is_streaming(), now);
        self.stats
            .on_identity(&self.identity.task_id, &self.identity.context_id);
        if method.starts_round() {
            self.rounds.start_round(now);
        }

        let (handle, entry) = self.log(
            method.as_str(),
            "request",
            LogStage::Request,
            request_json,
            now,
        );
        self.pending.push(handle, now);

        let mut effects = vec![entry];
        effects.extend(self.output_effect());
        effects.extend(self.stats_effect());
        effects
    }

    pub fn record_http_status(&mut self, status: u16) {
        self.stats.on_http_status(status);
    }

    /// Apply one decoded payload.
    ///
    /// Streaming events arrive with [`LogStage::Stream`]; the single payload
    /// of a non-streaming call arrives with [`LogStage::Response`], which also
    /// closes the pending request entry. Both go through the same path.
    pub fn handle_payload(
        &mut self,
        payload: &StreamPayload,
        stage: LogStage,
        now: DateTime<Utc>,
    ) -> Vec<Effect> {
        self.stats.on_event();

        let title = self.call_title();
        let detail = match payload {
            StreamPayload::Raw(text) => text.clone(),
            StreamPayload::Event(event) => to_detail(event),
        };
        let (_, entry) = self.log(&title, payload.event_type_name(), stage, detail, now);
        let mut effects = vec![entry];
        if stage == LogStage::Response {
            effects.extend(self.annotate_pending(now));
        }

        if let Some(event) = payload.as_event() {
            if let Some((task_id, context_id)) = identity_candidates(event) {
                effects.extend(self.merge_identity(&task_id, &context_id, now));
            }
            if let Some(state) = event.status_state() {
                self.stats.on_status(state);
            }
            if let Some(output) = extract_output(event) {
                let round_id = self.rounds.ensure_current_round(now).id;
                self.rounds.append_output(round_id, output);
            }
        }

        effects.extend(self.output_effect());
        effects.extend(self.stats_effect());
        effects
    }

    /// The event stream ended normally.
    pub fn record_stream_end(&mut self, now: DateTime<Utc>) -> Vec<Effect> {
        let title = self.call_title();
        let events = self.stats.snapshot().map_or(0, |s| s.event_count);
        let (_, entry) = self.log(
            &title,
            "stream_end",
            LogStage::Response,
            format!("{} events", events),
            now,
        );
        let mut effects = vec![entry];
        effects.extend(self.annotate_pending(now));
        effects
    }

    /// The call failed. Counted once per call by the caller.
    pub fn record_error(&mut self, error: &ClientError, now: DateTime<Utc>) -> Vec<Effect> {
        self.stats.on_error();
        if let Some(status) = error.http_status() {
            self.stats.on_http_status(status);
        }
        let title = self.call_title();
        let (_, entry) = self.log(
            &title,
            error.error_code(),
            LogStage::Error,
            error.to_string(),
            now,
        );
        let mut effects = vec![entry];
        effects.extend(self.annotate_pending(now));
        effects
    }

    /// The caller cancelled the call. Not an error.
    pub fn record_aborted(&mut self, now: DateTime<Utc>) -> Vec<Effect> {
        self.stats.on_aborted();
        let title = self.call_title();
        let (_, entry) = self.log(
            &title,
            "aborted",
            LogStage::Aborted,
            "request aborted".to_string(),
            now,
        );
        let mut effects = vec![entry];
        effects.extend(self.annotate_pending(now));
        effects
    }

    /// Terminal cleanup shared by every exit path.
    pub fn finish_call(&mut self, now: DateTime<Utc>) -> Vec<Effect> {
        self.stats.finish_at(now);
        self.stats_effect().into_iter().collect()
    }

    /// Select a round for display.
    pub fn select_round(&mut self, round_id: u64, manual: bool) -> Vec<Effect> {
        if !self.rounds.select_round(round_id, manual) {
            return Vec::new();
        }
        self.output_effect().into_iter().collect()
    }

    /// Drop rounds, identity, statistics and pending entries.
    ///
    /// Always emits an empty output so the sink clears its view.
    pub fn clear(&mut self) -> Vec<Effect> {
        *self = Self::default();
        self.last_output = Some((None, String::new()));
        vec![Effect::Output {
            round_id: None,
            text: String::new(),
        }]
    }

    /// Rehydrate identity and the current round from a fetched task.
    ///
    /// The current round's output is replaced with the latest history text,
    /// falling back to artifacts.
    pub fn restore_from_task(&mut self, task: &Task, now: DateTime<Utc>) -> Vec<Effect> {
        let mut effects =
            self.merge_identity(task.task_id(), task.context_id.as_deref().unwrap_or(""), now);

        let text = task
            .latest_history_text()
            .or_else(|| task.artifact_text())
            .unwrap_or_default();
        let round_id = self.rounds.ensure_current_round(now).id;
        self.rounds.set_output_text(round_id, text.as_str());

        let detail = format!("restored task {} into round {}", task.task_id(), round_id);
        let (_, entry) = self.log(SESSION_TITLE, "restore", LogStage::History, detail, now);
        effects.push(entry);
        effects.extend(self.output_effect());
        effects
    }

    fn log(
        &mut self,
        title: &str,
        event_type: &str,
        stage: LogStage,
        detail: String,
        now: DateTime<Utc>,
    ) -> (LogHandle, Effect) {
        self.next_handle += 1;
        let handle = LogHandle(self.next_handle);
        let entry = LogEntry {
            handle,
            title: title.to_string(),
            event_type: event_type.to_string(),
            stage,
            detail,
            timestamp: now,
        };
        (handle, Effect::Log(entry))
    }

    fn annotate_pending(&mut self, now: DateTime<Utc>) -> Option<Effect> {
        self.pending
            .complete(now)
            .map(|(handle, duration_ms)| Effect::Annotate {
                handle,
                duration_ms,
            })
    }

    fn output_effect(&mut self) -> Option<Effect> {
        let current = (
            self.rounds.selected_round_id(),
            self.rounds.current_output_text(),
        );
        if self.last_output.as_ref() == Some(&current) {
            return None;
        }
        self.last_output = Some(current.clone());
        Some(Effect::Output {
            round_id: current.0,
            text: current.1,
        })
    }

    fn stats_effect(&self) -> Option<Effect> {
        self.stats.snapshot().map(Effect::Stats)
    }

    fn call_title(&self) -> String {
        self.stats
            .snapshot()
            .map(|s| s.method)
            .unwrap_or_else(|| SESSION_TITLE.to_string())
    }
}

fn to_detail<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Message, Part, TaskStatus};
    use crate::sse::{A2aEvent, StreamEvent};
    use chrono::Duration;

    fn begin(session: &mut Session, method: RpcMethod, now: DateTime<Utc>) -> Vec<Effect> {
        session.begin_call("req", method, "http://localhost/a2a", "{}".to_string(), now)
    }

    fn agent_message(text: &str) -> StreamPayload {
        StreamPayload::Event(StreamEvent::new(A2aEvent::Message(Message {
            role: "assistant".to_string(),
            parts: vec![Part::text(text)],
            ..Default::default()
        })))
    }

    fn outputs(effects: &[Effect]) -> Vec<String> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Output { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_send_opens_round_and_collects_output() {
        let now = Utc::now();
        let mut session = Session::new();
        begin(&mut session, RpcMethod::SendStreamingMessage, now);
        assert_eq!(session.rounds().rounds().len(), 1);

        let effects = session.handle_payload(&agent_message("hi"), LogStage::Stream, now);
        assert_eq!(outputs(&effects), vec!["hi".to_string()]);
        assert_eq!(session.output_text(), "hi");
        assert_eq!(session.stats().unwrap().event_count, 1);
    }

    #[test]
    fn test_non_send_call_reuses_round() {
        let now = Utc::now();
        let mut session = Session::new();
        begin(&mut session, RpcMethod::SendMessage, now);
        begin(&mut session, RpcMethod::SubscribeToTask, now);
        assert_eq!(session.rounds().rounds().len(), 1);
    }

    #[test]
    fn test_unchanged_output_is_not_reemitted() {
        let now = Utc::now();
        let mut session = Session::new();
        begin(&mut session, RpcMethod::GetTask, now);
        let status_only = StreamPayload::from_text(r#"{"statusUpdate":{"status":{"state":"working"}}}"#);
        let effects = session.handle_payload(&status_only, LogStage::Stream, now);
        assert!(outputs(&effects).is_empty());
        assert_eq!(session.stats().unwrap().status.as_deref(), Some("working"));
    }

    #[test]
    fn test_identity_from_events_is_merged() {
        let now = Utc::now();
        let mut session = Session::new();
        begin(&mut session, RpcMethod::SendStreamingMessage, now);
        let payload = StreamPayload::from_text(
            r#"{"statusUpdate":{"taskId":"tasks/t-1","status":{"state":"submitted"}}}"#,
        );
        let effects = session.handle_payload(&payload, LogStage::Stream, now);

        assert_eq!(session.identity(), &SessionIdentity::resolve("t-1", "t-1"));
        assert!(effects
            .iter()
            .filter_map(Effect::as_log)
            .any(|log| log.stage == LogStage::Session));
        let stats = session.stats().unwrap();
        assert_eq!(stats.task_id, "t-1");
        assert_eq!(stats.context_id, "t-1");
    }

    #[test]
    fn test_raw_payload_counts_but_is_not_output() {
        let now = Utc::now();
        let mut session = Session::new();
        begin(&mut session, RpcMethod::SendStreamingMessage, now);
        let effects =
            session.handle_payload(&StreamPayload::Raw("not json".into()), LogStage::Stream, now);
        let log = effects.iter().find_map(Effect::as_log).unwrap();
        assert_eq!(log.event_type, "raw");
        assert_eq!(log.detail, "not json");
        assert_eq!(session.output_text(), "");
        assert_eq!(session.stats().unwrap().event_count, 1);
    }

    #[test]
    fn test_response_annotates_request_duration() {
        let t0 = Utc::now();
        let mut session = Session::new();
        let effects = begin(&mut session, RpcMethod::GetTask, t0);
        let request_handle = effects.iter().find_map(Effect::as_log).unwrap().handle;
        assert_eq!(session.pending_requests(), 1);

        let payload = StreamPayload::from_text(r#"{"tasks":[]}"#);
        let effects =
            session.handle_payload(&payload, LogStage::Response, t0 + Duration::milliseconds(40));
        assert!(effects.iter().any(|e| matches!(
            e,
            Effect::Annotate { handle, duration_ms: 40 } if *handle == request_handle
        )));
        assert_eq!(session.pending_requests(), 0);
    }

    #[test]
    fn test_stream_events_do_not_close_pending() {
        let now = Utc::now();
        let mut session = Session::new();
        begin(&mut session, RpcMethod::SendStreamingMessage, now);
        session.handle_payload(&agent_message("a"), LogStage::Stream, now);
        assert_eq!(session.pending_requests(), 1);
        let effects = session.record_stream_end(now);
        assert!(effects.iter().any(|e| matches!(e, Effect::Annotate { .. })));
        assert_eq!(session.pending_requests(), 0);
    }

    #[test]
    fn test_error_and_finish() {
        let now = Utc::now();
        let mut session = Session::new();
        begin(&mut session, RpcMethod::GetTask, now);
        let error = ClientError::Http {
            status: 404,
            body: "missing".to_string(),
        };
        let effects = session.record_error(&error, now);
        let log = effects.iter().find_map(Effect::as_log).unwrap();
        assert_eq!(log.stage, LogStage::Error);
        assert_eq!(log.event_type, "E_HTTP");

        let effects = session.finish_call(now);
        assert!(matches!(effects.as_slice(), [Effect::Stats(_)]));
        let stats = session.stats().unwrap();
        assert_eq!(stats.error_count, 1);
        assert_eq!(stats.event_count, 0);
        assert_eq!(stats.http_status, Some(404));
        assert!(stats.is_finished());
        assert!(session.rounds().rounds().is_empty());
    }

    #[test]
    fn test_aborted_is_not_an_error() {
        let now = Utc::now();
        let mut session = Session::new();
        begin(&mut session, RpcMethod::SendStreamingMessage, now);
        session.record_aborted(now);
        session.finish_call(now);
        let stats = session.stats().unwrap();
        assert!(stats.aborted);
        assert_eq!(stats.error_count, 0);
    }

    #[test]
    fn test_select_round_emits_output() {
        let now = Utc::now();
        let mut session = Session::new();
        begin(&mut session, RpcMethod::SendMessage, now);
        session.handle_payload(&agent_message("first"), LogStage::Response, now);
        begin(&mut session, RpcMethod::SendMessage, now);
        session.handle_payload(&agent_message("second"), LogStage::Response, now);

        let effects = session.select_round(1, true);
        assert_eq!(outputs(&effects), vec!["first".to_string()]);
        assert!(session.select_round(1, true).is_empty());
        assert!(session.select_round(42, true).is_empty());
    }

    #[test]
    fn test_clear_resets_everything() {
        let now = Utc::now();
        let mut session = Session::new();
        session.merge_identity("t-1", "c-1", now);
        begin(&mut session, RpcMethod::SendMessage, now);
        session.handle_payload(&agent_message("x"), LogStage::Response, now);

        let effects = session.clear();
        assert_eq!(outputs(&effects), vec![String::new()]);
        assert!(session.identity().is_empty());
        assert!(session.rounds().rounds().is_empty());
        assert!(session.stats().is_none());
        assert_eq!(session.pending_requests(), 0);

        begin(&mut session, RpcMethod::SendMessage, now);
        assert_eq!(session.rounds().current_round_id(), Some(1));
    }

    #[test]
    fn test_restore_from_task_overwrites_round() {
        let now = Utc::now();
        let mut session = Session::new();
        begin(&mut session, RpcMethod::SendMessage, now);
        session.handle_payload(&agent_message("live"), LogStage::Response, now);

        let task = Task {
            id: "t-7".to_string(),
            context_id: Some("c-7".to_string()),
            status: Some(TaskStatus {
                state: "completed".to_string(),
                ..Default::default()
            }),
            history: vec![Message {
                role: "agent".to_string(),
                parts: vec![Part::text("from history")],
                ..Default::default()
            }],
            ..Default::default()
        };
        let effects = session.restore_from_task(&task, now);
        assert_eq!(outputs(&effects), vec!["from history".to_string()]);
        assert_eq!(session.identity(), &SessionIdentity::resolve("t-7", "c-7"));
        assert_eq!(session.rounds().rounds().len(), 1);
        assert!(effects
            .iter()
            .filter_map(Effect::as_log)
            .any(|log| log.stage == LogStage::History));
    }

    #[test]
    fn test_log_handles_are_monotonic() {
        let now = Utc::now();
        let mut session = Session::new();
        let mut handles = Vec::new();
        for effect in begin(&mut session, RpcMethod::SendStreamingMessage, now)
            .into_iter()
            .chain(session.handle_payload(&agent_message("a"), LogStage::Stream, now))
            .chain(session.record_stream_end(now))
        {
            if let Effect::Log(entry) = effect {
                handles.push(entry.handle.0);
            }
        }
        assert!(handles.windows(2).all(|w| w[0] < w[1]));
    }
}

//! Run statistics and request/response timing.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::debug::LogHandle;

/// Statistics for the most recent call.
///
/// Created fresh by [`StatsTracker::start`]. Counters only ever increase and
/// the end timestamp is written once.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStatistics {
    pub request_id: String,
    pub method: String,
    pub endpoint: String,
    pub stream: bool,
    pub http_status: Option<u16>,
    pub task_id: String,
    pub context_id: String,
    pub status: Option<String>,
    pub event_count: u64,
    pub error_count: u64,
    pub aborted: bool,
    pub request_start_at: DateTime<Utc>,
    pub request_end_at: Option<DateTime<Utc>>,
}

impl RunStatistics {
    /// Elapsed time of the call.
    ///
    /// Live (`now - start`) while running, `end - start` once finished.
    /// `None` when the clock went backwards.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Option<Duration> {
        let end = self.request_end_at.unwrap_or(now);
        if end < self.request_start_at {
            return None;
        }
        Some(end - self.request_start_at)
    }

    pub fn is_finished(&self) -> bool {
        self.request_end_at.is_some()
    }
}

/// Holds the single live [`RunStatistics`] record.
#[derive(Debug, Clone, Default)]
pub struct StatsTracker {
    current: Option<RunStatistics>,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh record, discarding the previous one.
    pub fn start(&mut self, request_id: &str, method: &str, endpoint: &str, stream: bool) {
        self.start_at(request_id, method, endpoint, stream, Utc::now());
    }

    pub fn start_at(
        &mut self,
        request_id: &str,
        method: &str,
        endpoint: &str,
        stream: bool,
        now: DateTime<Utc>,
    ) {
        self.current = Some(RunStatistics {
            request_id: request_id.to_string(),
            method: method.to_string(),
            endpoint: endpoint.to_string(),
            stream,
            http_status: None,
            task_id: String::new(),
            context_id: String::new(),
            status: None,
            event_count: 0,
            error_count: 0,
            aborted: false,
            request_start_at: now,
            request_end_at: None,
        });
    }

    pub fn on_event(&mut self) {
        if let Some(stats) = self.current.as_mut() {
            stats.event_count += 1;
        }
    }

    pub fn on_error(&mut self) {
        if let Some(stats) = self.current.as_mut() {
            stats.error_count += 1;
        }
    }

    /// Record the session identity; empty values never clear a known one.
    pub fn on_identity(&mut self, task_id: &str, context_id: &str) {
        if let Some(stats) = self.current.as_mut() {
            if !task_id.is_empty() {
                stats.task_id = task_id.to_string();
            }
            if !context_id.is_empty() {
                stats.context_id = context_id.to_string();
            }
        }
    }

    pub fn on_status(&mut self, value: &str) {
        if value.is_empty() {
            return;
        }
        if let Some(stats) = self.current.as_mut() {
            stats.status = Some(value.to_string());
        }
    }

    pub fn on_http_status(&mut self, status: u16) {
        if let Some(stats) = self.current.as_mut() {
            stats.http_status = Some(status);
        }
    }

    pub fn on_aborted(&mut self) {
        if let Some(stats) = self.current.as_mut() {
            stats.aborted = true;
        }
    }

    /// Stamp the end time. Later calls leave the first stamp in place.
    pub fn finish(&mut self) {
        self.finish_at(Utc::now());
    }

    pub fn finish_at(&mut self, now: DateTime<Utc>) {
        if let Some(stats) = self.current.as_mut() {
            if stats.request_end_at.is_none() {
                stats.request_end_at = Some(now);
            }
        }
    }

    pub fn snapshot(&self) -> Option<RunStatistics> {
        self.current.clone()
    }

    pub fn is_running(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|stats| !stats.is_finished())
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingRequest {
    log_handle: LogHandle,
    request_timestamp: DateTime<Utc>,
}

/// FIFO of logged requests still waiting for their response entry.
#[derive(Debug, Clone, Default)]
pub struct PendingRequests {
    queue: VecDeque<PendingRequest>,
}

impl PendingRequests {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, log_handle: LogHandle, request_timestamp: DateTime<Utc>) {
        self.queue.push_back(PendingRequest {
            log_handle,
            request_timestamp,
        });
    }

    /// Pop the oldest entry and return its handle with the elapsed milliseconds.
    pub fn complete(&mut self, response_timestamp: DateTime<Utc>) -> Option<(LogHandle, i64)> {
        let entry = self.queue.pop_front()?;
        let duration = response_timestamp - entry.request_timestamp;
        Some((entry.log_handle, duration.num_milliseconds().max(0)))
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

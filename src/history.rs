//! History replay: rehydrating the session from a past task.
//!
//! Fetching and validation happen before any session state is touched, so a
//! failed restore leaves identity and rounds exactly as they were.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ClientError;
use crate::models::Task;
use crate::rpc::{decode_response, task_params, RpcMethod, RpcRequest};
use crate::session::normalize_id;
use crate::sse::A2aEvent;
use crate::traits::{AuthProvider, Headers, HttpClient, TaskSource};

/// Fetches and validates a task for restore.
pub struct HistoryReplay<'a, S: TaskSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: TaskSource + ?Sized> HistoryReplay<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Fetch `task_id` and check that the service returned that task.
    ///
    /// Returns `None` on lookup failure, a missing task, or an id mismatch.
    pub async fn fetch(&self, task_id: &str) -> Option<Task> {
        let wanted = normalize_id(task_id);
        if wanted.is_empty() {
            tracing::warn!("Restore skipped: empty task id");
            return None;
        }

        let task = match self.source.fetch_task(&wanted).await {
            Ok(Some(task)) => task,
            Ok(None) => {
                tracing::warn!("Restore failed: task {} not found", wanted);
                return None;
            }
            Err(e) => {
                tracing::warn!("Restore failed for task {}: {}", wanted, e);
                return None;
            }
        };

        let found = normalize_id(task.task_id());
        if found != wanted {
            tracing::warn!(
                "Restore failed: asked for task {} but service returned {:?}",
                wanted,
                found
            );
            return None;
        }
        tracing::info!("Restored task {}", wanted);
        Some(task)
    }
}

/// [`TaskSource`] issuing a read-only `GetTask` call.
///
/// Goes straight to the transport, so live call statistics and rounds are
/// never touched by a lookup.
pub struct RpcTaskSource<H: HttpClient> {
    http: Arc<H>,
    auth: Arc<dyn AuthProvider>,
}

impl<H: HttpClient> RpcTaskSource<H> {
    pub fn new(http: Arc<H>, auth: Arc<dyn AuthProvider>) -> Self {
        Self { http, auth }
    }
}

#[async_trait]
impl<H: HttpClient> TaskSource for RpcTaskSource<H> {
    async fn fetch_task(&self, task_id: &str) -> Result<Option<Task>, ClientError> {
        let request = RpcRequest::new(RpcMethod::GetTask, task_params(task_id));
        let body = request.to_json()?;

        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Accept".to_string(), RpcMethod::GetTask.accept().to_string());
        headers.extend(self.auth.headers());

        let response = self
            .http
            .post(&self.auth.endpoint(), &body, &headers)
            .await?;
        if response.status == 404 {
            return Ok(None);
        }
        if !response.is_success() {
            return Err(ClientError::Http {
                status: response.status,
                body: response.text_lossy(),
            });
        }

        let payload = decode_response(&response.text_lossy())?;
        match payload.as_event() {
            Some(A2aEvent::Task(task)) => Ok(Some(task.clone())),
            _ => Ok(None),
        }
    }
}

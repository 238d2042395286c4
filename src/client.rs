//! A2A JSON-RPC client with streaming, cancellation and session tracking.
//!
//! [`A2aClient`] drives one call at a time through
//! `idle -> sending -> (streaming | awaiting response) -> finished`, with
//! `aborted` reachable from any non-idle phase. Every exit path runs the same
//! cleanup, so the statistics record is always finished, including when the
//! caller drops the `send` future before it completes.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use serde_json::Value;
use tokio::sync::watch;

use crate::debug::{emit_effects, Effect, EffectSender, LogStage};
use crate::error::ClientError;
use crate::history::{HistoryReplay, RpcTaskSource};
use crate::rpc::{decode_response, message_params, RpcMethod, RpcRequest};
use crate::session::{Round, RunStatistics, Session, SessionIdentity};
use crate::sse::decode_stream;
use crate::traits::{AuthProvider, Headers, HttpClient, TaskSource};

/// How a call ended, when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    /// The response was consumed; `events` payloads were applied
    Completed { events: u64 },
    /// The caller cancelled the call
    Aborted,
    /// Another call was already active; nothing was sent
    Skipped,
}

/// Phase of the active call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPhase {
    Idle,
    /// Request issued, response headers not yet received
    Sending,
    Streaming,
    AwaitingResponse,
    /// A history restore holds the client
    Restoring,
}

struct ActiveCall {
    cancel: watch::Sender<bool>,
    phase: CallPhase,
}

type ActiveSlot = Arc<Mutex<Option<ActiveCall>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Holds the active slot; frees it when dropped.
struct SlotLease {
    active: ActiveSlot,
}

impl Drop for SlotLease {
    fn drop(&mut self) {
        *lock(&self.active) = None;
    }
}

/// Terminal cleanup for one call.
///
/// Dropped on every exit path. When the call never reached an outcome (the
/// `send` future was dropped mid-flight) it is recorded as aborted. The slot
/// lease is a field, so it is released after `finish_call` has run.
struct CallGuard<'a, H: HttpClient + 'static> {
    client: &'a A2aClient<H>,
    method: RpcMethod,
    settled: bool,
    _lease: SlotLease,
}

impl<H: HttpClient + 'static> CallGuard<'_, H> {
    fn settle(&mut self, result: &Result<CallOutcome, ClientError>) {
        match result {
            Ok(CallOutcome::Aborted) => {
                tracing::info!("{} aborted by caller", self.method);
                self.client.apply(|session, now| session.record_aborted(now));
            }
            Err(error) => {
                tracing::warn!("{} failed [{}]: {}", self.method, error.error_code(), error);
                self.client.apply(|session, now| session.record_error(error, now));
            }
            Ok(_) => {}
        }
        self.settled = true;
    }
}

impl<H: HttpClient + 'static> Drop for CallGuard<'_, H> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::info!("{} dropped before completion", self.method);
            self.client.apply(|session, now| session.record_aborted(now));
        }
        self.client.apply(|session, now| session.finish_call(now));
    }
}

/// Cancels whatever call is active on the client it was taken from.
///
/// Cheap to clone and `Send`, so it can live in a signal handler.
#[derive(Clone)]
pub struct CancelHandle {
    active: ActiveSlot,
}

impl CancelHandle {
    /// Signal the active call to abort. Returns false when idle or restoring.
    pub fn cancel(&self) -> bool {
        match lock(&self.active).as_ref() {
            Some(call) if call.phase != CallPhase::Restoring => {
                let _ = call.cancel.send(true);
                true
            }
            _ => false,
        }
    }
}

/// Client for the A2A task service.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use a2a_probe::adapters::ReqwestHttpClient;
/// use a2a_probe::client::A2aClient;
/// use a2a_probe::rpc::RpcMethod;
/// use a2a_probe::traits::StaticAuth;
///
/// let client = A2aClient::new(
///     ReqwestHttpClient::new(),
///     Arc::new(StaticAuth::new("http://localhost:8000/a2a")),
/// );
/// client.send_text(RpcMethod::SendStreamingMessage, "hello").await?;
/// println!("{}", client.output_text());
/// ```
pub struct A2aClient<H: HttpClient> {
    http: Arc<H>,
    auth: Arc<dyn AuthProvider>,
    session: Arc<Mutex<Session>>,
    active: ActiveSlot,
    effects: Option<EffectSender>,
}

impl<H: HttpClient> Clone for A2aClient<H> {
    fn clone(&self) -> Self {
        Self {
            http: Arc::clone(&self.http),
            auth: Arc::clone(&self.auth),
            session: Arc::clone(&self.session),
            active: Arc::clone(&self.active),
            effects: self.effects.clone(),
        }
    }
}

impl<H: HttpClient + 'static> A2aClient<H> {
    pub fn new(http: H, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            http: Arc::new(http),
            auth,
            session: Arc::new(Mutex::new(Session::new())),
            active: Arc::new(Mutex::new(None)),
            effects: None,
        }
    }

    /// Forward every [`Effect`] to this channel.
    pub fn with_effects(mut self, sender: EffectSender) -> Self {
        self.effects = Some(sender);
        self
    }

    /// Issue a call and apply its response to the session.
    ///
    /// Returns [`CallOutcome::Skipped`] without sending anything when another
    /// call is still active.
    pub async fn send(&self, method: RpcMethod, params: Value) -> Result<CallOutcome, ClientError> {
        let request = RpcRequest::new(method, params);
        let request_json = request.to_json()?;

        let Some((cancel_rx, lease)) = self.acquire(CallPhase::Sending) else {
            tracing::debug!("Call already active, ignoring {}", method);
            return Ok(CallOutcome::Skipped);
        };

        let endpoint = self.auth.endpoint();
        tracing::info!("{} -> {} (id {})", method, endpoint, request.id);
        self.apply(|session, now| {
            session.begin_call(&request.id, method, &endpoint, request_json.clone(), now)
        });
        let mut guard = CallGuard {
            client: self,
            method,
            settled: false,
            _lease: lease,
        };

        let result = self
            .execute(&request, &endpoint, &request_json, cancel_rx)
            .await;

        guard.settle(&result);
        drop(guard);
        result
    }

    /// Send a user message carrying the current session identity.
    pub async fn send_text(&self, method: RpcMethod, text: &str) -> Result<CallOutcome, ClientError> {
        let identity = self.identity();
        let user_id = self.auth.user_id();
        let params = message_params(text, &identity, user_id.as_deref());
        self.send(method, params).await
    }

    /// Parse a method name and JSON params, then send.
    ///
    /// Malformed input fails here and the call is never issued.
    pub async fn send_raw(&self, method: &str, params: &str) -> Result<CallOutcome, ClientError> {
        let method: RpcMethod = method.parse()?;
        let params = crate::rpc::parse_params(params)?;
        self.send(method, params).await
    }

    /// Signal the active call to abort. Returns false when idle or restoring.
    pub fn cancel(&self) -> bool {
        self.cancel_handle().cancel()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            active: Arc::clone(&self.active),
        }
    }

    pub fn phase(&self) -> CallPhase {
        lock(&self.active)
            .as_ref()
            .map_or(CallPhase::Idle, |call| call.phase)
    }

    pub fn is_busy(&self) -> bool {
        self.phase() != CallPhase::Idle
    }

    /// Merge manually entered ids into the session identity.
    pub fn set_identity(&self, task_id: &str, context_id: &str) {
        self.apply(|session, now| session.merge_identity(task_id, context_id, now));
    }

    /// Manually select a round for display.
    pub fn select_round(&self, round_id: u64) -> bool {
        let mut selected = false;
        self.apply(|session, _| {
            let effects = session.select_round(round_id, true);
            selected = session.rounds().selected_round_id() == Some(round_id);
            effects
        });
        selected
    }

    pub fn clear_session(&self) {
        self.apply(|session, _| session.clear());
    }

    /// Restore a past task into the session via `GetTask`.
    pub async fn restore(&self, task_id: &str) -> bool {
        let source = RpcTaskSource::new(Arc::clone(&self.http), Arc::clone(&self.auth));
        self.restore_from(&source, task_id).await
    }

    /// Restore a past task from any [`TaskSource`].
    ///
    /// Holds the active slot for the whole restore: it returns false without
    /// fetching while a call is active, and calls issued meanwhile are skipped.
    pub async fn restore_from<S: TaskSource + ?Sized>(&self, source: &S, task_id: &str) -> bool {
        let Some((_cancel_rx, _lease)) = self.acquire(CallPhase::Restoring) else {
            tracing::warn!("Restore of {} skipped: a call is active", task_id);
            return false;
        };
        let replay = HistoryReplay::new(source);
        let Some(task) = replay.fetch(task_id).await else {
            return false;
        };
        self.apply(|session, now| session.restore_from_task(&task, now));
        true
    }

    pub fn identity(&self) -> SessionIdentity {
        lock(&self.session).identity().clone()
    }

    pub fn stats(&self) -> Option<RunStatistics> {
        lock(&self.session).stats()
    }

    pub fn output_text(&self) -> String {
        lock(&self.session).output_text()
    }

    pub fn rounds(&self) -> Vec<Round> {
        lock(&self.session).rounds().rounds().to_vec()
    }

    pub fn selected_round_id(&self) -> Option<u64> {
        lock(&self.session).rounds().selected_round_id()
    }

    async fn execute(
        &self,
        request: &RpcRequest,
        endpoint: &str,
        body: &str,
        mut cancel_rx: watch::Receiver<bool>,
    ) -> Result<CallOutcome, ClientError> {
        let method = request.method;
        let headers = self.headers_for(method);

        if method.is_streaming() {
            let response = tokio::select! {
                response = self.http.post_stream(endpoint, body, &headers) => response?,
                _ = cancelled(&mut cancel_rx) => return Ok(CallOutcome::Aborted),
            };
            self.with_session(|session| session.record_http_status(response.status));
            let body = response.body.ok_or(ClientError::StreamUnsupported)?;
            self.set_phase(CallPhase::Streaming);

            let mut payloads = Box::pin(decode_stream(body));
            let mut events = 0;
            loop {
                tokio::select! {
                    biased;
                    _ = cancelled(&mut cancel_rx) => return Ok(CallOutcome::Aborted),
                    next = payloads.next() => match next {
                        Some(Ok(payload)) => {
                            events += 1;
                            self.apply(|session, now| {
                                session.handle_payload(&payload, LogStage::Stream, now)
                            });
                        }
                        Some(Err(e)) => return Err(e.into()),
                        None => break,
                    },
                }
            }
            tracing::debug!("{} stream ended after {} events", method, events);
            self.apply(|session, now| session.record_stream_end(now));
            Ok(CallOutcome::Completed { events })
        } else {
            self.set_phase(CallPhase::AwaitingResponse);
            let response = tokio::select! {
                response = self.http.post(endpoint, body, &headers) => response?,
                _ = cancelled(&mut cancel_rx) => return Ok(CallOutcome::Aborted),
            };
            self.with_session(|session| session.record_http_status(response.status));
            if !response.is_success() {
                return Err(ClientError::Http {
                    status: response.status,
                    body: response.text_lossy(),
                });
            }

            let payload = decode_response(&response.text_lossy())?;
            self.apply(|session, now| session.handle_payload(&payload, LogStage::Response, now));
            Ok(CallOutcome::Completed { events: 1 })
        }
    }

    fn headers_for(&self, method: RpcMethod) -> Headers {
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Accept".to_string(), method.accept().to_string());
        headers.extend(self.auth.headers());
        headers
    }

    fn acquire(&self, phase: CallPhase) -> Option<(watch::Receiver<bool>, SlotLease)> {
        let mut active = lock(&self.active);
        if active.is_some() {
            return None;
        }
        let (cancel, cancel_rx) = watch::channel(false);
        *active = Some(ActiveCall { cancel, phase });
        let lease = SlotLease {
            active: Arc::clone(&self.active),
        };
        Some((cancel_rx, lease))
    }

    fn set_phase(&self, phase: CallPhase) {
        if let Some(call) = lock(&self.active).as_mut() {
            call.phase = phase;
        }
    }

    fn with_session<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        f(&mut lock(&self.session))
    }

    /// Run a session transition and forward its effects.
    fn apply(&self, f: impl FnOnce(&mut Session, DateTime<Utc>) -> Vec<Effect>) {
        let effects = self.with_session(|session| f(session, Utc::now()));
        emit_effects(&self.effects, effects);
    }
}

/// Resolves once the cancel flag is set. Never resolves if the sender is gone.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

//! Mock HTTP client for testing.
//!
//! Provides a configurable mock HTTP client that returns predefined JSON-RPC
//! bodies, SSE chunk sequences, or errors, and records every request.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::traits::{Headers, HttpClient, HttpError, Response, StreamResponse};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// `post` or `post_stream`
    pub kind: &'static str,
    pub url: String,
    pub headers: Headers,
    pub body: String,
}

impl RecordedRequest {
    /// Parse the recorded body as JSON.
    pub fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.body).ok()
    }
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a complete response (any status)
    Success(Response),
    /// Fail before a response is received
    Error(HttpError),
    /// 200 stream yielding these chunks, then ending
    Stream(Vec<Bytes>),
    /// 200 stream yielding these items, including mid-stream errors
    StreamChunks(Vec<Result<Bytes, HttpError>>),
    /// 200 stream yielding these chunks, then never ending
    PendingStream(Vec<Bytes>),
    /// 2xx streaming response without a readable body
    StreamWithoutBody(u16),
    /// No response ever arrives; the request hangs before headers
    NoResponse,
}

/// Mock HTTP client for testing.
///
/// Responses come from a FIFO queue first (see [`push_response`]), then from
/// per-URL configuration (exact match, then prefix match), then the default.
///
/// [`push_response`]: MockHttpClient::push_response
///
/// # Example
///
/// ```ignore
/// use a2a_probe::adapters::mock::{MockHttpClient, MockResponse};
/// use a2a_probe::traits::{HttpClient, Response, Headers};
/// use bytes::Bytes;
///
/// let client = MockHttpClient::new();
/// client.set_response(
///     "http://localhost/a2a",
///     MockResponse::Success(Response::new(200, Bytes::from(r#"{"result":{}}"#))),
/// );
///
/// let response = client.post("http://localhost/a2a", "{}", &Headers::new()).await?;
/// assert_eq!(response.status, 200);
/// assert_eq!(client.get_requests().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    responses: Arc<Mutex<HashMap<String, MockResponse>>>,
    queued: Arc<Mutex<VecDeque<MockResponse>>>,
    default_response: Arc<Mutex<Option<MockResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a response for a specific URL.
    pub fn set_response(&self, url: &str, response: MockResponse) {
        lock(&self.responses).insert(url.to_string(), response);
    }

    /// Queue a one-shot response, consumed by the next request.
    pub fn push_response(&self, response: MockResponse) {
        lock(&self.queued).push_back(response);
    }

    /// Set a default response for URLs without specific matches.
    pub fn set_default_response(&self, response: MockResponse) {
        *lock(&self.default_response) = Some(response);
    }

    /// Convenience: 200 with a JSON body.
    pub fn json_response(body: serde_json::Value) -> MockResponse {
        MockResponse::Success(Response::new(200, Bytes::from(body.to_string())))
    }

    /// Convenience: an SSE stream with one `data:` block per payload.
    pub fn sse_response(payloads: &[serde_json::Value]) -> MockResponse {
        MockResponse::Stream(
            payloads
                .iter()
                .map(|p| Bytes::from(format!("data: {}\n\n", p)))
                .collect(),
        )
    }

    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    pub fn clear_requests(&self) {
        lock(&self.requests).clear();
    }

    pub fn clear_responses(&self) {
        lock(&self.responses).clear();
        lock(&self.queued).clear();
    }

    fn record_request(&self, kind: &'static str, url: &str, headers: &Headers, body: &str) {
        lock(&self.requests).push(RecordedRequest {
            kind,
            url: url.to_string(),
            headers: headers.clone(),
            body: body.to_string(),
        });
    }

    fn get_response(&self, url: &str) -> Option<MockResponse> {
        if let Some(response) = lock(&self.queued).pop_front() {
            return Some(response);
        }

        let responses = lock(&self.responses);
        if let Some(response) = responses.get(url) {
            return Some(response.clone());
        }
        for (pattern, response) in responses.iter() {
            if url.starts_with(pattern) {
                return Some(response.clone());
            }
        }
        drop(responses);

        lock(&self.default_response).clone()
    }
}

fn stream_response(body: crate::traits::ByteStream) -> StreamResponse {
    StreamResponse {
        status: 200,
        headers: Headers::new(),
        body: Some(body),
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record_request("post", url, headers, body);

        match self.get_response(url) {
            Some(MockResponse::Success(response)) => Ok(response),
            Some(MockResponse::Error(err)) => Err(err),
            Some(MockResponse::NoResponse) => std::future::pending().await,
            Some(_) => Err(HttpError::Other(
                "Stream response on non-stream request".to_string(),
            )),
            None => Err(HttpError::Other(format!("No mock response for URL: {}", url))),
        }
    }

    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<StreamResponse, HttpError> {
        self.record_request("post_stream", url, headers, body);

        match self.get_response(url) {
            Some(MockResponse::Stream(chunks)) => Ok(stream_response(Box::pin(
                futures::stream::iter(chunks.into_iter().map(Ok)),
            ))),
            Some(MockResponse::StreamChunks(items)) => {
                Ok(stream_response(Box::pin(futures::stream::iter(items))))
            }
            Some(MockResponse::PendingStream(chunks)) => {
                use futures::StreamExt;
                let stream = futures::stream::iter(chunks.into_iter().map(Ok))
                    .chain(futures::stream::pending());
                Ok(stream_response(Box::pin(stream)))
            }
            Some(MockResponse::StreamWithoutBody(status)) => Ok(StreamResponse {
                status,
                headers: Headers::new(),
                body: None,
            }),
            Some(MockResponse::Success(response)) if !response.is_success() => {
                Err(HttpError::ServerError {
                    status: response.status,
                    message: response.text_lossy(),
                })
            }
            Some(MockResponse::Success(_)) => Err(HttpError::Other(
                "Non-stream response on stream request".to_string(),
            )),
            Some(MockResponse::Error(err)) => Err(err),
            Some(MockResponse::NoResponse) => std::future::pending().await,
            None => Err(HttpError::Other(format!("No mock response for URL: {}", url))),
        }
    }
}

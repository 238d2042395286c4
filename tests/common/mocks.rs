//! Mock implementations for test fixtures.
//!
//! Re-exports the mocks from `a2a_probe::adapters::mock` and adds response
//! builders used across the integration tests.

#![allow(dead_code)]

pub use a2a_probe::adapters::mock::{MockHttpClient, MockResponse, MockTaskSource};
pub use a2a_probe::traits::{Headers, HttpClient, HttpError, Response};

use bytes::Bytes;
use serde_json::Value;

/// Response with a status and a plain body.
pub fn status_response(status: u16, body: &str) -> MockResponse {
    MockResponse::Success(Response::new(status, Bytes::from(body.to_string())))
}

/// SSE stream delivered in fixed-size chunks.
pub fn chunked_sse(payloads: &[Value], chunk_size: usize) -> MockResponse {
    let body = super::sse_body(payloads).into_bytes();
    MockResponse::Stream(
        body.chunks(chunk_size.max(1))
            .map(Bytes::copy_from_slice)
            .collect(),
    )
}

/// SSE stream that fails with a transport error after `payloads`.
pub fn sse_then_error(payloads: &[Value], error: HttpError) -> MockResponse {
    let mut items: Vec<Result<Bytes, HttpError>> = payloads
        .iter()
        .map(|p| Ok(Bytes::from(format!("data: {}\n\n", p))))
        .collect();
    items.push(Err(error));
    MockResponse::StreamChunks(items)
}

/// SSE stream that delivers `payloads` and then stays open.
pub fn sse_then_hang(payloads: &[Value]) -> MockResponse {
    MockResponse::PendingStream(
        payloads
            .iter()
            .map(|p| Bytes::from(format!("data: {}\n\n", p)))
            .collect(),
    )
}

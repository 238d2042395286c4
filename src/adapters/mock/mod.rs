//! Mock implementations for testing.
//!
//! Test doubles for the trait abstractions, enabling client tests without
//! network access.
//!
//! # Available Mocks
//!
//! - [`MockHttpClient`] - HTTP client with configurable responses
//! - [`MockTaskSource`] - In-memory task lookup for history replay

pub mod http;
pub mod task_source;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};
pub use task_source::MockTaskSource;

//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`HttpClient`] - JSON-RPC transport (single-shot and streaming POST)
//! - [`AuthProvider`] - Endpoint, auth headers, and user id collaborator
//! - [`TaskSource`] - Read-only task lookup for history replay

pub mod auth;
pub mod http;
pub mod task_source;

pub use auth::{AuthProvider, StaticAuth};
pub use http::{ByteStream, Headers, HttpClient, HttpError, Response, StreamResponse};
pub use task_source::TaskSource;

//! a2a-probe - A streaming JSON-RPC debug client for A2A task services
//!
//! This library exposes modules for use in integration tests.

pub mod adapters;
pub mod cli;
pub mod client;
pub mod config;
pub mod debug;
pub mod error;
pub mod history;
pub mod models;
pub mod rpc;
pub mod session;
pub mod sse;
pub mod traits;

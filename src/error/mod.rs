//! Error handling for the A2A debug client.
//!
//! | Error | Category | Counted as call error |
//! |-------|----------|-----------------------|
//! | `StreamUnsupported` | Server | Yes |
//! | `Http` | Client (4xx) / Server (5xx) | Yes |
//! | `Transport` | Network | Yes |
//! | `Rpc` | Server | Yes |
//! | `PayloadParse` | User | No, the call is never issued |
//! | `Config` | Configuration | No, raised before any call |
//!
//! Cancellation is not an error; see [`CallOutcome`](crate::client::CallOutcome).

mod category;
mod client;

pub use category::ErrorCategory;
pub use client::ClientError;

/// Type alias for Results using ClientError.
pub type ClientResult<T> = Result<T, ClientError>;

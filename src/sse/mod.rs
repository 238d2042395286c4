//! SSE (Server-Sent Events) frame parsing for A2A streaming responses.
//!
//! The task service streams newline-delimited SSE:
//! - `data: <json>` - payload line(s), rejoined with newlines
//! - Blank line - ends the block
//! - Lines starting with `:` and other fields - ignored
//!
//! # Module structure
//! - `events` - Decoded payload types (`StreamPayload`, `StreamEvent`, `A2aEvent`)
//! - `frame` - Chunk-boundary independent block parser (`FrameParser`)
//! - `stream` - Lazy payload stream over a response body (`decode_stream`)

mod events;
mod frame;
mod stream;

pub use events::{A2aEvent, StreamEvent, StreamPayload};
pub use frame::{parse_block, FrameParser};
pub use stream::decode_stream;

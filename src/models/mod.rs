//! Wire data models for the A2A task protocol.
//!
//! These mirror the camelCase JSON objects exchanged with the task service.
//! Nearly every field is optional so that partial or older server payloads
//! still decode.

pub mod message;
pub mod task;

pub use message::{join_part_text, Message, Part};
pub use task::{Artifact, Task, TaskArtifactUpdate, TaskStatus, TaskStatusUpdate};

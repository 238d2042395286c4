//! Read-only task lookup used by history replay.

use async_trait::async_trait;

use crate::error::ClientError;
use crate::models::Task;

/// Fetches a past task snapshot by id.
///
/// Implementations must not touch live call state (statistics, rounds);
/// history replay applies the result itself.
#[async_trait]
pub trait TaskSource: Send + Sync {
    /// Returns `Ok(None)` when the service has no such task.
    async fn fetch_task(&self, task_id: &str) -> Result<Option<Task>, ClientError>;
}

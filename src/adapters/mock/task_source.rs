//! In-memory task source for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::ClientError;
use crate::models::Task;
use crate::traits::TaskSource;

/// Task source backed by a map, with an optional forced failure.
#[derive(Debug, Clone, Default)]
pub struct MockTaskSource {
    tasks: Arc<Mutex<HashMap<String, Task>>>,
    failure: Arc<Mutex<Option<ClientError>>>,
}

impl MockTaskSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task under a lookup id (which may differ from `task.id`).
    pub fn insert(&self, lookup_id: &str, task: Task) {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(lookup_id.to_string(), task);
    }

    /// Make every fetch fail with this error.
    pub fn fail_with(&self, error: ClientError) {
        *self.failure.lock().unwrap_or_else(PoisonError::into_inner) = Some(error);
    }
}

#[async_trait]
impl TaskSource for MockTaskSource {
    async fn fetch_task(&self, task_id: &str) -> Result<Option<Task>, ClientError> {
        if let Some(error) = self
            .failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            return Err(error);
        }
        Ok(self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(task_id)
            .cloned())
    }
}

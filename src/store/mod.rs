//! Record store access: the hosted record API and its in-memory stand-in.
//!
//! Both implementations speak in terms of [`Task`] and [`Category`]; the
//! external schema never leaves `records`.

mod mock;
mod records;
mod remote;

use std::sync::Arc;

use async_trait::async_trait;
use log::error;

use crate::errors::StoreError;
use crate::models::{
    Category, CategoryId, CategoryUpdate, NewCategory, NewTask, Task, TaskId, TaskUpdate,
};

pub use mock::{Latency, MockStore};
pub use remote::RemoteStore;

pub type SharedStore = Arc<dyn RecordStore>;

/// A record the store refused, by its position in the submitted batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFailure {
    pub index: usize,
    pub message: String,
    /// Set when the record was refused because the id does not exist.
    pub missing_id: Option<i64>,
}

/// Per-record result of a batch write. Batches are not atomic: some records
/// may be written while others are refused.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome<T> {
    pub succeeded: Vec<T>,
    pub failed: Vec<RecordFailure>,
}

impl<T> Default for BatchOutcome<T> {
    fn default() -> Self {
        BatchOutcome {
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }
}

impl<T> BatchOutcome<T> {
    pub fn is_partial(&self) -> bool {
        !self.succeeded.is_empty() && !self.failed.is_empty()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> BatchOutcome<U> {
        BatchOutcome {
            succeeded: self.succeeded.into_iter().map(f).collect(),
            failed: self.failed,
        }
    }

    /// Successful records, if any record succeeded. Refused records are
    /// logged and otherwise dropped; the call only fails when nothing was
    /// written.
    pub fn into_result(self, action: &str, entity: &'static str) -> Result<Vec<T>, StoreError> {
        if !self.failed.is_empty() {
            error!(
                "Failed to {} {} {} record(s): {:?}",
                action,
                self.failed.len(),
                entity,
                self.failed
            );
        }
        if !self.succeeded.is_empty() || self.failed.is_empty() {
            return Ok(self.succeeded);
        }

        let first = &self.failed[0];
        match first.missing_id {
            Some(id) => Err(StoreError::NotFound { entity, id }),
            None => Err(StoreError::rejected(first.message.clone())),
        }
    }

    /// The single record of a one-record batch.
    pub fn into_single(self, action: &str, entity: &'static str) -> Result<T, StoreError> {
        self.into_result(action, entity)?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::rejected(format!("Failed to {} {}", action, entity)))
    }
}

/// CRUD over the two record kinds. Batch operations report per-record
/// success; the single-record helpers apply the lenient policy of
/// [`BatchOutcome::into_result`].
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Newest first.
    async fn list_tasks(&self) -> Result<Vec<Task>, StoreError>;
    async fn get_task(&self, id: TaskId) -> Result<Option<Task>, StoreError>;
    async fn create_tasks(&self, tasks: Vec<NewTask>) -> Result<BatchOutcome<Task>, StoreError>;
    async fn update_tasks(
        &self,
        updates: Vec<(TaskId, TaskUpdate)>,
    ) -> Result<BatchOutcome<Task>, StoreError>;
    async fn delete_tasks(&self, ids: Vec<TaskId>) -> Result<BatchOutcome<TaskId>, StoreError>;

    /// Ordered by name.
    async fn list_categories(&self) -> Result<Vec<Category>, StoreError>;
    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, StoreError>;
    async fn create_categories(
        &self,
        categories: Vec<NewCategory>,
    ) -> Result<BatchOutcome<Category>, StoreError>;
    async fn update_categories(
        &self,
        updates: Vec<(CategoryId, CategoryUpdate)>,
    ) -> Result<BatchOutcome<Category>, StoreError>;
    async fn delete_categories(
        &self,
        ids: Vec<CategoryId>,
    ) -> Result<BatchOutcome<CategoryId>, StoreError>;

    async fn create_task(&self, task: NewTask) -> Result<Task, StoreError> {
        self.create_tasks(vec![task])
            .await?
            .into_single("create", "Task")
    }

    async fn update_task(&self, id: TaskId, update: TaskUpdate) -> Result<Task, StoreError> {
        self.update_tasks(vec![(id, update)])
            .await?
            .into_single("update", "Task")
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), StoreError> {
        self.delete_tasks(vec![id])
            .await?
            .into_single("delete", "Task")
            .map(|_| ())
    }

    /// Reads the current state, flips `completed` and persists it. The
    /// update path stamps or clears `completed_at`.
    async fn toggle_complete(&self, id: TaskId) -> Result<Task, StoreError> {
        let current = self
            .get_task(id)
            .await?
            .ok_or_else(|| StoreError::task_not_found(id))?;
        self.update_task(id, TaskUpdate::completion(!current.completed))
            .await
    }

    async fn create_category(&self, category: NewCategory) -> Result<Category, StoreError> {
        self.create_categories(vec![category])
            .await?
            .into_single("create", "Category")
    }

    async fn update_category(
        &self,
        id: CategoryId,
        update: CategoryUpdate,
    ) -> Result<Category, StoreError> {
        self.update_categories(vec![(id, update)])
            .await?
            .into_single("update", "Category")
    }

    async fn delete_category(&self, id: CategoryId) -> Result<(), StoreError> {
        self.delete_categories(vec![id])
            .await?
            .into_single("delete", "Category")
            .map(|_| ())
    }
}

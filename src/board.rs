// src/board.rs

use std::collections::HashMap;
use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, TimeZone};
use futures::try_join;
use log::{debug, error, info, warn};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::due_date::{classify, due_label, DueStatus};
use crate::errors::{BoardError, StoreError};
use crate::filter::TaskFilter;
use crate::models::{Category, CategoryId, Task, TaskId};
use crate::stats::{aggregate, TaskStats};
use crate::store::SharedStore;
use crate::validation::{CategoryDraft, TaskDraft};

pub const LOAD_FAILED: &str = "Failed to load tasks. Please try again.";

/// A mutation the store confirmed, with the notice to show for it.
#[derive(Debug, Clone, Serialize)]
pub struct Applied<T> {
    pub data: T,
    pub notice: &'static str,
}

impl<T> Applied<T> {
    fn new(data: T, notice: &'static str) -> Self {
        Applied { data, notice }
    }
}

/// One entry of the task list, ready for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCard {
    #[serde(flatten)]
    pub task: Task,
    pub category: Option<Category>,
    pub due_status: DueStatus,
    pub due_label: Option<String>,
    pub priority_label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmptyState {
    pub title: &'static str,
    pub description: &'static str,
    pub action_label: &'static str,
}

impl EmptyState {
    pub const NO_TASKS: EmptyState = EmptyState {
        title: "No tasks yet",
        description: "Get started by creating your first task to stay organized and productive.",
        action_label: "Create Your First Task",
    };

    pub const NO_MATCHES: EmptyState = EmptyState {
        title: "No tasks match your filters",
        description: "Try adjusting your search or filters to find the tasks you're looking for.",
        action_label: "Create New Task",
    };
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListView {
    pub tasks: Vec<TaskCard>,
    /// The criteria as applied, echoed back for the filter panel.
    pub filter: TaskFilter,
    pub status_label: &'static str,
    pub total: usize,
    pub has_active_filters: bool,
    pub empty: Option<EmptyState>,
    pub error: Option<&'static str>,
}

/// The last loaded copy of the store's contents.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub tasks: Vec<Task>,
    pub categories: Vec<Category>,
    pub loaded: bool,
    pub load_error: Option<&'static str>,
}

impl Snapshot {
    pub fn stats<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> TaskStats {
        aggregate(&self.tasks, now)
    }
}

#[derive(Default)]
struct BoardState {
    snapshot: Snapshot,
    applied_seq: u64,
}

/// Cached view of the record store that every screen reads from.
///
/// Loads are numbered as they are issued. A load's result is applied only if
/// no later-issued load has been applied already, so a slow response cannot
/// overwrite newer data. The snapshot is replaced wholesale, never patched;
/// mutations go to the store first and are followed by a full reload.
pub struct TaskBoard {
    store: SharedStore,
    state: RwLock<BoardState>,
    issued_seq: AtomicU64,
}

impl TaskBoard {
    pub fn new(store: SharedStore) -> Self {
        TaskBoard {
            store,
            state: RwLock::new(BoardState::default()),
            issued_seq: AtomicU64::new(0),
        }
    }

    fn begin_load(&self) -> u64 {
        self.issued_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Returns whether the result was applied.
    async fn finish_load(
        &self,
        seq: u64,
        result: Result<(Vec<Task>, Vec<Category>), StoreError>,
    ) -> Result<bool, BoardError> {
        let mut state = self.state.write().await;
        if seq <= state.applied_seq {
            // newer data is already showing, so a stale failure is not an error
            match result {
                Ok(_) => warn!(
                    "Discarding load #{}: load #{} was already applied",
                    seq, state.applied_seq
                ),
                Err(source) => warn!(
                    "Discarding failed load #{} (load #{} was already applied): {}",
                    seq, state.applied_seq, source
                ),
            }
            return Ok(false);
        }

        match result {
            Ok((tasks, categories)) => {
                debug!(
                    "Applying load #{}: {} tasks, {} categories",
                    seq,
                    tasks.len(),
                    categories.len()
                );
                state.applied_seq = seq;
                state.snapshot = Snapshot {
                    tasks,
                    categories,
                    loaded: true,
                    load_error: None,
                };
                Ok(true)
            }
            Err(source) => {
                error!("Error loading tasks: {}", source);
                state.snapshot.load_error = Some(LOAD_FAILED);
                Err(BoardError::Load {
                    message: LOAD_FAILED,
                    source,
                })
            }
        }
    }

    /// Fetch tasks and categories together and replace the snapshot.
    pub async fn load(&self) -> Result<(), BoardError> {
        let seq = self.begin_load();
        debug!("Starting load #{}", seq);
        let result = try_join!(self.store.list_tasks(), self.store.list_categories());
        self.finish_load(seq, result).await.map(|_| ())
    }

    /// Re-issue a load after a failure. Never called automatically.
    pub async fn retry(&self) -> Result<(), BoardError> {
        info!("Retrying task load");
        self.load().await
    }

    /// Reload after a confirmed mutation. A failure here only marks the
    /// snapshot as failed; the mutation itself stands.
    async fn refresh(&self) {
        if let Err(e) = self.load().await {
            warn!("Reload after mutation failed: {}", e);
        }
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.state.read().await.snapshot.clone()
    }

    pub async fn categories(&self) -> Vec<Category> {
        self.state.read().await.snapshot.categories.clone()
    }

    pub async fn stats<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> TaskStats {
        self.state.read().await.snapshot.stats(now)
    }

    pub async fn view<Tz>(&self, filter: &TaskFilter, now: &DateTime<Tz>) -> TaskListView
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let state = self.state.read().await;
        let snapshot = &state.snapshot;
        let categories: HashMap<CategoryId, &Category> =
            snapshot.categories.iter().map(|c| (c.id, c)).collect();

        let tasks: Vec<TaskCard> = filter
            .apply(&snapshot.tasks, now)
            .into_iter()
            .map(|task| TaskCard {
                category: task
                    .category_id
                    .and_then(|id| categories.get(&id))
                    .map(|c| (*c).clone()),
                due_status: classify(task, now),
                due_label: task.due_date.as_ref().map(|due| due_label(due, now)),
                priority_label: task.priority.label(),
                task: task.clone(),
            })
            .collect();

        let empty = match (tasks.is_empty(), snapshot.tasks.is_empty()) {
            (false, _) => None,
            (true, true) => Some(EmptyState::NO_TASKS),
            (true, false) => Some(EmptyState::NO_MATCHES),
        };

        TaskListView {
            total: snapshot.tasks.len(),
            has_active_filters: filter.has_active_filters(),
            status_label: filter.status.label(),
            filter: filter.clone(),
            error: snapshot.load_error,
            empty,
            tasks,
        }
    }

    /// Fetch a single task straight from the store.
    pub async fn task(&self, id: TaskId) -> Result<Option<Task>, BoardError> {
        self.store.get_task(id).await.map_err(|source| {
            error!("Error fetching task {}: {}", id, source);
            BoardError::Load {
                message: "Failed to load task",
                source,
            }
        })
    }

    pub async fn create_task(&self, draft: &TaskDraft) -> Result<Applied<Task>, BoardError> {
        let new_task = draft.validate_new().map_err(BoardError::Validation)?;
        let task = self
            .store
            .create_task(new_task)
            .await
            .map_err(|source| mutation_failed("Failed to create task", source))?;
        info!("Task created: {}", task.id);
        self.refresh().await;
        Ok(Applied::new(task, "Task created successfully!"))
    }

    pub async fn update_task(
        &self,
        id: TaskId,
        draft: &TaskDraft,
    ) -> Result<Applied<Task>, BoardError> {
        let update = draft.validate_edit().map_err(BoardError::Validation)?;
        let task = self
            .store
            .update_task(id, update)
            .await
            .map_err(|source| mutation_failed("Failed to update task", source))?;
        info!("Task updated: {}", task.id);
        self.refresh().await;
        Ok(Applied::new(task, "Task updated successfully!"))
    }

    pub async fn toggle_complete(&self, id: TaskId) -> Result<Applied<Task>, BoardError> {
        let task = self
            .store
            .toggle_complete(id)
            .await
            .map_err(|source| mutation_failed("Failed to update task", source))?;
        self.refresh().await;
        let notice = if task.completed {
            "Task completed! 🎉"
        } else {
            "Task reopened"
        };
        Ok(Applied::new(task, notice))
    }

    pub async fn delete_task(&self, id: TaskId) -> Result<Applied<TaskId>, BoardError> {
        self.store
            .delete_task(id)
            .await
            .map_err(|source| mutation_failed("Failed to delete task", source))?;
        info!("Task deleted: {}", id);
        self.refresh().await;
        Ok(Applied::new(id, "Task deleted successfully"))
    }

    pub async fn create_category(
        &self,
        draft: &CategoryDraft,
    ) -> Result<Applied<Category>, BoardError> {
        let new_category = draft.validate_new().map_err(BoardError::Validation)?;
        let category = self
            .store
            .create_category(new_category)
            .await
            .map_err(|source| mutation_failed("Failed to create category", source))?;
        info!("Category created: {}", category.id);
        self.refresh().await;
        Ok(Applied::new(category, "Category created successfully!"))
    }

    pub async fn update_category(
        &self,
        id: CategoryId,
        draft: &CategoryDraft,
    ) -> Result<Applied<Category>, BoardError> {
        let update = draft.validate_edit().map_err(BoardError::Validation)?;
        let category = self
            .store
            .update_category(id, update)
            .await
            .map_err(|source| mutation_failed("Failed to update category", source))?;
        self.refresh().await;
        Ok(Applied::new(category, "Category updated successfully!"))
    }

    pub async fn delete_category(&self, id: CategoryId) -> Result<Applied<CategoryId>, BoardError> {
        self.store
            .delete_category(id)
            .await
            .map_err(|source| mutation_failed("Failed to delete category", source))?;
        info!("Category deleted: {}", id);
        self.refresh().await;
        Ok(Applied::new(id, "Category deleted successfully"))
    }
}

fn mutation_failed(message: &'static str, source: StoreError) -> BoardError {
    error!("{}: {}", message, source);
    BoardError::Mutation { message, source }
}

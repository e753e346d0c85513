// src/store/mock.rs
//
// In-process record store for offline use and tests. Same contract as the
// hosted API, including asynchronous replies and per-record batch results.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use rand::Rng;
use tokio::sync::Mutex;

use super::{BatchOutcome, RecordFailure, RecordStore};
use crate::errors::StoreError;
use crate::models::{
    Category, CategoryId, CategoryUpdate, NewCategory, NewTask, Task, TaskId, TaskUpdate,
};

const SEED_TASKS: &str = include_str!("seed/tasks.json");
const SEED_CATEGORIES: &str = include_str!("seed/categories.json");

/// Artificial reply delay, drawn uniformly from `min..=max` on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
    min: Duration,
    max: Duration,
}

impl Latency {
    pub fn none() -> Self {
        Latency {
            min: Duration::ZERO,
            max: Duration::ZERO,
        }
    }

    pub fn between_ms(min_ms: u64, max_ms: u64) -> Self {
        let (min_ms, max_ms) = if min_ms <= max_ms {
            (min_ms, max_ms)
        } else {
            (max_ms, min_ms)
        };
        Latency {
            min: Duration::from_millis(min_ms),
            max: Duration::from_millis(max_ms),
        }
    }

    async fn wait(&self) {
        if self.max.is_zero() {
            return;
        }
        let (min, max) = (self.min.as_millis() as u64, self.max.as_millis() as u64);
        let millis = rand::rng().random_range(min..=max);
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }
}

impl Default for Latency {
    fn default() -> Self {
        Latency::between_ms(100, 400)
    }
}

struct MockState {
    tasks: Vec<Task>,
    categories: Vec<Category>,
    next_task_id: TaskId,
    next_category_id: CategoryId,
}

fn next_id(ids: impl Iterator<Item = i64>) -> i64 {
    ids.max().unwrap_or(0).max(0) + 1
}

pub struct MockStore {
    state: Mutex<MockState>,
    latency: Latency,
}

impl MockStore {
    /// A store holding exactly `tasks` and `categories`. Ids continue from the
    /// highest one present and are never reused.
    pub fn new(tasks: Vec<Task>, categories: Vec<Category>) -> Self {
        let next_task_id = next_id(tasks.iter().map(|t| t.id));
        let next_category_id = next_id(categories.iter().map(|c| c.id));
        MockStore {
            state: Mutex::new(MockState {
                tasks,
                categories,
                next_task_id,
                next_category_id,
            }),
            latency: Latency::default(),
        }
    }

    pub fn empty() -> Self {
        MockStore::new(Vec::new(), Vec::new())
    }

    /// The bundled demo dataset.
    pub fn seeded() -> Result<Self, StoreError> {
        let tasks: Vec<Task> = serde_json::from_str(SEED_TASKS).map_err(|e| StoreError::Decode {
            message: format!("seed tasks: {}", e),
        })?;
        let categories: Vec<Category> =
            serde_json::from_str(SEED_CATEGORIES).map_err(|e| StoreError::Decode {
                message: format!("seed categories: {}", e),
            })?;
        debug!(
            "Seeded mock store with {} tasks and {} categories",
            tasks.len(),
            categories.len()
        );
        Ok(MockStore::new(tasks, categories))
    }

    pub fn with_latency(mut self, latency: Latency) -> Self {
        self.latency = latency;
        self
    }

    pub async fn task_count(&self) -> usize {
        self.state.lock().await.tasks.len()
    }
}

fn rejected(index: usize, message: &str) -> RecordFailure {
    RecordFailure {
        index,
        message: message.to_string(),
        missing_id: None,
    }
}

fn missing(index: usize, id: i64) -> RecordFailure {
    RecordFailure {
        index,
        message: format!("Record {} does not exist", id),
        missing_id: Some(id),
    }
}

#[async_trait]
impl RecordStore for MockStore {
    async fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        self.latency.wait().await;
        let state = self.state.lock().await;
        let mut tasks = state.tasks.clone();
        tasks.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(tasks)
    }

    async fn get_task(&self, id: TaskId) -> Result<Option<Task>, StoreError> {
        self.latency.wait().await;
        let state = self.state.lock().await;
        Ok(state.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn create_tasks(&self, tasks: Vec<NewTask>) -> Result<BatchOutcome<Task>, StoreError> {
        self.latency.wait().await;
        let now = Utc::now();
        let mut state = self.state.lock().await;
        let mut outcome = BatchOutcome::default();

        for (index, new_task) in tasks.into_iter().enumerate() {
            if new_task.title.trim().is_empty() {
                outcome.failed.push(rejected(index, "Title is required"));
                continue;
            }
            let id = state.next_task_id;
            state.next_task_id += 1;
            let task = Task {
                id,
                completed_at: new_task.completed_at(now),
                title: new_task.title,
                description: new_task.description,
                priority: new_task.priority,
                due_date: new_task.due_date,
                completed: new_task.completed,
                created_at: now,
                category_id: new_task.category_id,
            };
            state.tasks.push(task.clone());
            outcome.succeeded.push(task);
        }
        Ok(outcome)
    }

    async fn update_tasks(
        &self,
        updates: Vec<(TaskId, TaskUpdate)>,
    ) -> Result<BatchOutcome<Task>, StoreError> {
        self.latency.wait().await;
        let now = Utc::now();
        let mut state = self.state.lock().await;
        let mut outcome = BatchOutcome::default();

        for (index, (id, update)) in updates.into_iter().enumerate() {
            if update.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
                outcome.failed.push(rejected(index, "Title is required"));
                continue;
            }
            match state.tasks.iter_mut().find(|t| t.id == id) {
                Some(task) => {
                    update.apply_to(task, now);
                    outcome.succeeded.push(task.clone());
                }
                None => outcome.failed.push(missing(index, id)),
            }
        }
        Ok(outcome)
    }

    async fn delete_tasks(&self, ids: Vec<TaskId>) -> Result<BatchOutcome<TaskId>, StoreError> {
        self.latency.wait().await;
        let mut state = self.state.lock().await;
        let mut outcome = BatchOutcome::default();

        for (index, id) in ids.into_iter().enumerate() {
            let before = state.tasks.len();
            state.tasks.retain(|t| t.id != id);
            if state.tasks.len() < before {
                outcome.succeeded.push(id);
            } else {
                outcome.failed.push(missing(index, id));
            }
        }
        Ok(outcome)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        self.latency.wait().await;
        let state = self.state.lock().await;
        let mut categories = state.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, StoreError> {
        self.latency.wait().await;
        let state = self.state.lock().await;
        Ok(state.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn create_categories(
        &self,
        categories: Vec<NewCategory>,
    ) -> Result<BatchOutcome<Category>, StoreError> {
        self.latency.wait().await;
        let mut state = self.state.lock().await;
        let mut outcome = BatchOutcome::default();

        for (index, new_category) in categories.into_iter().enumerate() {
            if new_category.name.trim().is_empty() {
                outcome.failed.push(rejected(index, "Name is required"));
                continue;
            }
            let id = state.next_category_id;
            state.next_category_id += 1;
            let category = Category {
                id,
                name: new_category.name,
                color: new_category.color,
                icon: new_category.icon,
            };
            state.categories.push(category.clone());
            outcome.succeeded.push(category);
        }
        Ok(outcome)
    }

    async fn update_categories(
        &self,
        updates: Vec<(CategoryId, CategoryUpdate)>,
    ) -> Result<BatchOutcome<Category>, StoreError> {
        self.latency.wait().await;
        let mut state = self.state.lock().await;
        let mut outcome = BatchOutcome::default();

        for (index, (id, update)) in updates.into_iter().enumerate() {
            match state.categories.iter_mut().find(|c| c.id == id) {
                Some(category) => {
                    update.apply_to(category);
                    outcome.succeeded.push(category.clone());
                }
                None => outcome.failed.push(missing(index, id)),
            }
        }
        Ok(outcome)
    }

    async fn delete_categories(
        &self,
        ids: Vec<CategoryId>,
    ) -> Result<BatchOutcome<CategoryId>, StoreError> {
        self.latency.wait().await;
        let mut state = self.state.lock().await;
        let mut outcome = BatchOutcome::default();

        // referencing tasks keep their category id
        for (index, id) in ids.into_iter().enumerate() {
            let before = state.categories.len();
            state.categories.retain(|c| c.id != id);
            if state.categories.len() < before {
                outcome.succeeded.push(id);
            } else {
                outcome.failed.push(missing(index, id));
            }
        }
        Ok(outcome)
    }
}

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::category::CategoryId;

pub type TaskId = i64;

/// Task urgency. Stored lowercase by the record store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Display label used on task cards.
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority: {}", other)),
        }
    }
}

/// A task as the rest of the crate sees it, independent of the store schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub category_id: Option<CategoryId>,
}

/// Fields for a task that does not exist yet. The store assigns `id` and
/// `created_at`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

impl NewTask {
    /// `completedAt` for a freshly created record.
    pub fn completed_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.completed.then_some(now)
    }
}

/// Partial update. `None` leaves a field untouched; for the nullable fields
/// `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub category_id: Option<Option<CategoryId>>,
}

impl TaskUpdate {
    pub fn completion(completed: bool) -> Self {
        TaskUpdate {
            completed: Some(completed),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == TaskUpdate::default()
    }

    /// The `completedAt` value to write alongside this update, if any.
    /// Setting `completed` always rewrites it: `now` when completing, null when
    /// reopening.
    pub fn completed_at(&self, now: DateTime<Utc>) -> Option<Option<DateTime<Utc>>> {
        self.completed.map(|done| done.then_some(now))
    }

    /// Apply the update to an in-memory task, keeping `completed_at` in step
    /// with `completed`.
    pub fn apply_to(&self, task: &mut Task, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(category_id) = self.category_id {
            task.category_id = category_id;
        }
        if let Some(completed) = self.completed {
            if completed != task.completed {
                task.completed_at = completed.then_some(now);
            }
            task.completed = completed;
        }
    }
}

/// Distinguishes an explicit `null` (clear) from a missing key (keep).
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_task() -> Task {
        Task {
            id: 7,
            title: "Weekly Report".to_string(),
            description: String::new(),
            priority: Priority::High,
            due_date: None,
            completed: false,
            created_at: Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0).unwrap(),
            completed_at: None,
            category_id: Some(1),
        }
    }

    #[test]
    fn priority_parses_case_insensitively() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!(" low ".parse::<Priority>().unwrap(), Priority::Low);
        assert!("urgent".parse::<Priority>().is_err());
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn toggling_twice_restores_state_and_clears_completed_at() {
        let mut task = sample_task();
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();

        TaskUpdate::completion(true).apply_to(&mut task, now);
        assert!(task.completed);
        assert_eq!(task.completed_at, Some(now));

        TaskUpdate::completion(false).apply_to(&mut task, now);
        assert!(!task.completed);
        assert_eq!(task.completed_at, None);
    }

    #[test]
    fn completing_an_already_completed_task_keeps_its_timestamp() {
        let mut task = sample_task();
        let first = Utc.with_ymd_and_hms(2026, 10, 2, 9, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2026, 10, 3, 9, 0, 0).unwrap();
        TaskUpdate::completion(true).apply_to(&mut task, first);
        TaskUpdate::completion(true).apply_to(&mut task, later);
        assert_eq!(task.completed_at, Some(first));
    }

    #[test]
    fn update_distinguishes_null_from_missing() {
        let clear: TaskUpdate = serde_json::from_str(r#"{"dueDate": null}"#).unwrap();
        assert_eq!(clear.due_date, Some(None));
        assert_eq!(clear.category_id, None);

        let keep: TaskUpdate = serde_json::from_str(r#"{"title": "x"}"#).unwrap();
        assert_eq!(keep.due_date, None);
        assert!(!keep.is_empty());
        assert!(TaskUpdate::default().is_empty());
    }
}

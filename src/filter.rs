// src/filter.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::due_date::{classify, DueStatus};
use crate::models::{CategoryId, Priority, Task};

const ALL: &str = "all";

/// Category criterion; `All` is the "All Categories" entry of the filter panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(CategoryId),
}

impl CategoryFilter {
    pub fn matches(&self, category_id: Option<CategoryId>) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(id) => category_id == Some(*id),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
    Today,
    Overdue,
}

impl StatusFilter {
    pub fn matches<Tz: TimeZone>(&self, task: &Task, now: &DateTime<Tz>) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => !task.completed,
            StatusFilter::Completed => task.completed,
            StatusFilter::Today => classify(task, now) == DueStatus::Today,
            StatusFilter::Overdue => classify(task, now) == DueStatus::Overdue,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusFilter::All => "All Tasks",
            StatusFilter::Active => "Active",
            StatusFilter::Completed => "Completed",
            StatusFilter::Today => "Due Today",
            StatusFilter::Overdue => "Overdue",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PriorityFilter {
    #[default]
    All,
    Only(Priority),
}

impl PriorityFilter {
    pub fn matches(&self, priority: Priority) -> bool {
        match self {
            PriorityFilter::All => true,
            PriorityFilter::Only(wanted) => *wanted == priority,
        }
    }
}

/// The criteria from the filter panel. Every field defaults to "match all";
/// a task is visible only when it passes every criterion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskFilter {
    #[serde(alias = "searchQuery")]
    pub search: String,
    #[serde(alias = "categoryId")]
    pub category: CategoryFilter,
    pub status: StatusFilter,
    pub priority: PriorityFilter,
}

impl TaskFilter {
    pub fn matches<Tz: TimeZone>(&self, task: &Task, now: &DateTime<Tz>) -> bool {
        self.matches_search(task)
            && self.category.matches(task.category_id)
            && self.status.matches(task, now)
            && self.priority.matches(task.priority)
    }

    fn matches_search(&self, task: &Task) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let query = self.search.to_lowercase();
        task.title.to_lowercase().contains(&query)
            || task.description.to_lowercase().contains(&query)
    }

    /// Visible subset of `tasks`, in their original order.
    pub fn apply<'a, Tz: TimeZone>(&self, tasks: &'a [Task], now: &DateTime<Tz>) -> Vec<&'a Task> {
        tasks.iter().filter(|task| self.matches(task, now)).collect()
    }

    pub fn has_active_filters(&self) -> bool {
        *self != TaskFilter::default()
    }

    pub fn clear(&mut self) {
        *self = TaskFilter::default();
    }
}

/// Owned form of [`TaskFilter::apply`].
pub fn filter_tasks<Tz: TimeZone>(tasks: &[Task], filter: &TaskFilter, now: &DateTime<Tz>) -> Vec<Task> {
    filter.apply(tasks, now).into_iter().cloned().collect()
}

/* -------------------------------------------------------------------------- */
/* "all"-or-value criteria: parsed from query strings and JSON alike          */
/* -------------------------------------------------------------------------- */

impl FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case(ALL) {
            return Ok(CategoryFilter::All);
        }
        s.parse::<CategoryId>()
            .map(CategoryFilter::Only)
            .map_err(|_| format!("invalid category filter: {}", s))
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str(ALL),
            CategoryFilter::Only(id) => write!(f, "{}", id),
        }
    }
}

impl FromStr for PriorityFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case(ALL) {
            return Ok(PriorityFilter::All);
        }
        s.parse::<Priority>().map(PriorityFilter::Only)
    }
}

impl fmt::Display for PriorityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriorityFilter::All => f.write_str(ALL),
            PriorityFilter::Only(priority) => write!(f, "{}", priority),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCriterion {
    Id(i64),
    Text(String),
}

impl<'de> Deserialize<'de> for CategoryFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawCriterion::deserialize(deserializer)? {
            RawCriterion::Id(id) => Ok(CategoryFilter::Only(id)),
            RawCriterion::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

impl<'de> Deserialize<'de> for PriorityFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

impl Serialize for CategoryFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl Serialize for PriorityFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::due_date::classify;
    use chrono::{Duration, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    fn task(id: i64, title: &str, description: &str) -> Task {
        Task {
            id,
            title: title.to_string(),
            description: description.to_string(),
            priority: Priority::Medium,
            due_date: None,
            completed: false,
            created_at: now() - Duration::days(10),
            completed_at: None,
            category_id: None,
        }
    }

    fn fixture() -> Vec<Task> {
        let mut report = task(1, "Weekly Report", "");
        report.category_id = Some(1);
        report.priority = Priority::High;
        report.due_date = Some(now() - Duration::hours(3));

        let mut review = task(2, "Review budget", "The report due Friday");
        review.category_id = Some(1);
        review.due_date = Some(now() - Duration::days(2));

        let mut groceries = task(3, "Buy groceries", "Milk and eggs");
        groceries.category_id = Some(2);
        groceries.priority = Priority::Low;
        groceries.due_date = Some(now() + Duration::days(1));

        let mut gym = task(4, "Gym", "");
        gym.completed = true;
        gym.completed_at = Some(now() - Duration::days(1));
        gym.due_date = Some(now() - Duration::days(1));

        let undated = task(5, "Someday", "");

        vec![report, review, groceries, gym, undated]
    }

    fn ids(tasks: &[&Task]) -> Vec<i64> {
        tasks.iter().map(|t| t.id).collect()
    }

    #[test]
    fn default_filter_matches_everything() {
        let tasks = fixture();
        let filter = TaskFilter::default();
        assert_eq!(ids(&filter.apply(&tasks, &now())), vec![1, 2, 3, 4, 5]);
        assert!(!filter.has_active_filters());
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_description() {
        let tasks = fixture();
        let filter = TaskFilter {
            search: "Report".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&tasks, &now())), vec![1, 2]);
    }

    #[test]
    fn category_and_priority_are_exact_matches() {
        let tasks = fixture();
        let filter = TaskFilter {
            category: CategoryFilter::Only(1),
            priority: PriorityFilter::Only(Priority::High),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&tasks, &now())), vec![1]);
    }

    #[test]
    fn status_filters() {
        let tasks = fixture();
        let with_status = |status| TaskFilter {
            status,
            ..Default::default()
        };
        assert_eq!(ids(&with_status(StatusFilter::Active).apply(&tasks, &now())), vec![1, 2, 3, 5]);
        assert_eq!(ids(&with_status(StatusFilter::Completed).apply(&tasks, &now())), vec![4]);
        assert_eq!(ids(&with_status(StatusFilter::Today).apply(&tasks, &now())), vec![1]);
        assert_eq!(ids(&with_status(StatusFilter::Overdue).apply(&tasks, &now())), vec![2]);
    }

    #[test]
    fn today_status_agrees_with_the_classifier() {
        let tasks = fixture();
        let filter = TaskFilter {
            status: StatusFilter::Today,
            ..Default::default()
        };
        let expected: Vec<i64> = tasks
            .iter()
            .filter(|t| classify(*t, &now()) == DueStatus::Today)
            .map(|t| t.id)
            .collect();
        assert_eq!(ids(&filter.apply(&tasks, &now())), expected);
    }

    #[test]
    fn undated_tasks_never_match_date_statuses() {
        let tasks = vec![task(9, "No deadline", "")];
        for status in [StatusFilter::Today, StatusFilter::Overdue] {
            let filter = TaskFilter {
                status,
                ..Default::default()
            };
            assert!(filter.apply(&tasks, &now()).is_empty());
        }
    }

    #[test]
    fn filtering_is_idempotent() {
        let tasks = fixture();
        let filter = TaskFilter {
            search: "e".to_string(),
            status: StatusFilter::Active,
            ..Default::default()
        };
        let once = filter_tasks(&tasks, &filter, &now());
        let twice = filter_tasks(&once, &filter, &now());
        assert_eq!(once, twice);
    }

    #[test]
    fn clear_resets_every_criterion() {
        let mut filter = TaskFilter {
            search: "x".to_string(),
            category: CategoryFilter::Only(3),
            status: StatusFilter::Overdue,
            priority: PriorityFilter::Only(Priority::Low),
        };
        assert!(filter.has_active_filters());
        filter.clear();
        assert_eq!(filter, TaskFilter::default());
    }

    #[test]
    fn criteria_parse_from_json_with_all_sentinels() {
        let filter: TaskFilter = serde_json::from_str(
            r#"{"searchQuery": "rent", "categoryId": 2, "status": "overdue", "priority": "all"}"#,
        )
        .unwrap();
        assert_eq!(filter.search, "rent");
        assert_eq!(filter.category, CategoryFilter::Only(2));
        assert_eq!(filter.status, StatusFilter::Overdue);
        assert_eq!(filter.priority, PriorityFilter::All);

        let filter: TaskFilter =
            serde_json::from_str(r#"{"category": "all", "priority": "high"}"#).unwrap();
        assert_eq!(filter.category, CategoryFilter::All);
        assert_eq!(filter.priority, PriorityFilter::Only(Priority::High));
        assert!("abc".parse::<CategoryFilter>().is_err());
    }
}

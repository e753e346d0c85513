// src/validation.rs

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::{
    CategoryId, CategoryUpdate, NewCategory, NewTask, Priority, TaskUpdate,
    DEFAULT_CATEGORY_COLOR, DEFAULT_CATEGORY_ICON,
};
use crate::timestamp::parse_in;

/// Per-field messages, keyed by the form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    errors: BTreeMap<&'static str, &'static str>,
}

impl ValidationErrors {
    pub fn add(&mut self, field: &'static str, message: &'static str) {
        self.errors.insert(field, message);
    }

    pub fn get(&self, field: &str) -> Option<&'static str> {
        self.errors.get(field).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

/// What the task form submits, for both create and edit.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, deserialize_with = "form_due_date")]
    pub due_date: Option<DateTime<Utc>>,
}

/// Accepts RFC 3339 or the zone-less `yyyy-MM-ddTHH:mm` of a `datetime-local`
/// input, read as local wall time. Empty means no deadline.
fn form_due_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => parse_in(text, &Local)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid due date: {}", text))),
    }
}

impl TaskDraft {
    fn check(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::default();
        if self.title.trim().is_empty() {
            errors.add("title", "Title is required");
        }
        if self.category_id.is_none() {
            errors.add("categoryId", "Category is required");
        }
        errors
    }

    /// Fields for a new, not yet completed task.
    pub fn validate_new(&self) -> Result<NewTask, ValidationErrors> {
        let task = NewTask {
            title: self.title.trim().to_string(),
            description: self.description.clone(),
            priority: self.priority,
            due_date: self.due_date,
            completed: false,
            category_id: self.category_id,
        };
        self.check().into_result(task)
    }

    /// Every form field as an update. Completion is left alone: the form never
    /// edits it.
    pub fn validate_edit(&self) -> Result<TaskUpdate, ValidationErrors> {
        let update = TaskUpdate {
            title: Some(self.title.trim().to_string()),
            description: Some(self.description.clone()),
            priority: Some(self.priority),
            due_date: Some(self.due_date),
            completed: None,
            category_id: Some(self.category_id),
        };
        self.check().into_result(update)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

impl CategoryDraft {
    fn check(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::default();
        if self.name.trim().is_empty() {
            errors.add("name", "Name is required");
        }
        errors
    }

    pub fn validate_new(&self) -> Result<NewCategory, ValidationErrors> {
        let category = NewCategory {
            name: self.name.trim().to_string(),
            color: self
                .color
                .clone()
                .unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string()),
            icon: self
                .icon
                .clone()
                .unwrap_or_else(|| DEFAULT_CATEGORY_ICON.to_string()),
        };
        self.check().into_result(category)
    }

    pub fn validate_edit(&self) -> Result<CategoryUpdate, ValidationErrors> {
        let update = CategoryUpdate {
            name: Some(self.name.trim().to_string()),
            color: self.color.clone(),
            icon: self.icon.clone(),
        };
        self.check().into_result(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn missing_title_and_category_are_reported_per_field() {
        let draft = TaskDraft {
            title: "   ".to_string(),
            ..Default::default()
        };
        let errors = draft.validate_new().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("title"), Some("Title is required"));
        assert_eq!(errors.get("categoryId"), Some("Category is required"));
    }

    #[test]
    fn valid_draft_becomes_an_incomplete_new_task() {
        let draft = TaskDraft {
            title: "  Write tests ".to_string(),
            category_id: Some(2),
            priority: Priority::High,
            ..Default::default()
        };
        let task = draft.validate_new().unwrap();
        assert_eq!(task.title, "Write tests");
        assert_eq!(task.category_id, Some(2));
        assert!(!task.completed);
    }

    #[test]
    fn edit_writes_every_form_field_but_not_completion() {
        let draft = TaskDraft {
            title: "Renamed".to_string(),
            category_id: Some(1),
            ..Default::default()
        };
        let update = draft.validate_edit().unwrap();
        assert_eq!(update.due_date, Some(None));
        assert_eq!(update.category_id, Some(Some(1)));
        assert_eq!(update.completed, None);
    }

    #[test]
    fn category_defaults_fill_color_and_icon() {
        let draft = CategoryDraft {
            name: "Errands".to_string(),
            ..Default::default()
        };
        let category = draft.validate_new().unwrap();
        assert_eq!(category.color, DEFAULT_CATEGORY_COLOR);
        assert_eq!(category.icon, DEFAULT_CATEGORY_ICON);

        let errors = CategoryDraft::default().validate_new().unwrap_err();
        assert_eq!(errors.to_string(), "name: Name is required");
    }

    #[test]
    fn draft_accepts_form_json() {
        let draft: TaskDraft = serde_json::from_str(
            r#"{"title": "Ship", "categoryId": 3, "priority": "low", "dueDate": "2026-10-20T17:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(draft.priority, Priority::Low);
        assert!(draft.due_date.is_some());
    }

    #[test]
    fn draft_accepts_datetime_local_due_dates() {
        let draft: TaskDraft = serde_json::from_str(
            r#"{"title": "Ship", "categoryId": 3, "dueDate": "2026-10-20T17:00"}"#,
        )
        .unwrap();
        let expected = Local
            .with_ymd_and_hms(2026, 10, 20, 17, 0, 0)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc));
        assert_eq!(draft.due_date, expected);
        assert!(draft.validate_new().unwrap().due_date.is_some());

        let draft: TaskDraft =
            serde_json::from_str(r#"{"title": "Ship", "categoryId": 3, "dueDate": ""}"#).unwrap();
        assert_eq!(draft.due_date, None);

        assert!(serde_json::from_str::<TaskDraft>(r#"{"title": "Ship", "dueDate": "soon"}"#).is_err());
    }
}

// src/store/records.rs
//
// The hosted record API's schema and its translation to and from the crate's
// own task/category types. Nothing outside `store` sees these names.

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

use crate::models::{
    Category, CategoryId, CategoryUpdate, NewCategory, NewTask, Priority, Task, TaskId,
    TaskUpdate,
};
use crate::timestamp::parse_in;

pub const TASK_TABLE: &str = "task_c";
pub const CATEGORY_TABLE: &str = "category_c";

const TASK_FIELDS: &[&str] = &[
    "Id",
    "Name",
    "title_c",
    "description_c",
    "priority_c",
    "dueDate_c",
    "completed_c",
    "createdAt_c",
    "completedAt_c",
    "categoryId_c",
];

const CATEGORY_FIELDS: &[&str] = &["Id", "Name", "color_c", "icon_c"];

/* -------------------------------------------------------------------------- */
/* Query parameters                                                           */
/* -------------------------------------------------------------------------- */

fn field_list(fields: &[&str]) -> Vec<Value> {
    fields
        .iter()
        .map(|name| json!({ "field": { "Name": name } }))
        .collect()
}

/// All tasks, newest first.
pub fn task_list_query() -> Value {
    json!({
        "fields": field_list(TASK_FIELDS),
        "orderBy": [{ "fieldName": "Id", "sorttype": "DESC" }],
    })
}

pub fn task_get_query() -> Value {
    json!({ "fields": field_list(TASK_FIELDS) })
}

/// All categories, by name.
pub fn category_list_query() -> Value {
    json!({
        "fields": field_list(CATEGORY_FIELDS),
        "orderBy": [{ "fieldName": "Name", "sorttype": "ASC" }],
    })
}

pub fn category_get_query() -> Value {
    json!({ "fields": field_list(CATEGORY_FIELDS) })
}

/* -------------------------------------------------------------------------- */
/* Task records                                                               */
/* -------------------------------------------------------------------------- */

/// A lookup column: some responses inline the referenced record, others only
/// its id.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Lookup {
    Id(i64),
    Record {
        #[serde(rename = "Id")]
        id: i64,
    },
    Text(String),
}

impl Lookup {
    pub fn id(&self) -> Option<i64> {
        match self {
            Lookup::Id(id) | Lookup::Record { id } => Some(*id),
            Lookup::Text(text) => text.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskRecord {
    #[serde(rename = "Id")]
    pub id: TaskId,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title_c: Option<String>,
    #[serde(default)]
    pub description_c: Option<String>,
    #[serde(default)]
    pub priority_c: Option<String>,
    #[serde(rename = "dueDate_c", default, deserialize_with = "timestamp")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_c: Option<bool>,
    #[serde(rename = "createdAt_c", default, deserialize_with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "completedAt_c", default, deserialize_with = "timestamp")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(rename = "categoryId_c", default)]
    pub category: Option<Lookup>,
}

impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        let completed = record.completed_c.unwrap_or(false);
        Task {
            id: record.id,
            title: record.title_c.or(record.name).unwrap_or_default(),
            description: record.description_c.unwrap_or_default(),
            priority: record
                .priority_c
                .and_then(|p| p.parse::<Priority>().ok())
                .unwrap_or_default(),
            due_date: record.due_date,
            completed,
            created_at: record.created_at.unwrap_or_default(),
            completed_at: if completed { record.completed_at } else { None },
            category_id: record.category.as_ref().and_then(Lookup::id),
        }
    }
}

/// Writable task columns. `None` omits a column; `Some(None)` writes null.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskFields {
    #[serde(rename = "Id", skip_serializing_if = "Option::is_none")]
    pub id: Option<TaskId>,
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_c: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_c: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_c: Option<Priority>,
    #[serde(rename = "dueDate_c", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_c: Option<bool>,
    #[serde(rename = "createdAt_c", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "completedAt_c", skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Option<DateTime<Utc>>>,
    #[serde(rename = "categoryId_c", skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Option<CategoryId>>,
}

impl TaskFields {
    pub fn for_create(task: &NewTask, now: DateTime<Utc>) -> Self {
        TaskFields {
            id: None,
            name: Some(task.title.clone()),
            title_c: Some(task.title.clone()),
            description_c: Some(task.description.clone()),
            priority_c: Some(task.priority),
            due_date: Some(task.due_date),
            completed_c: Some(task.completed),
            created_at: Some(now),
            completed_at: Some(task.completed_at(now)),
            // the lookup column is left out entirely when there is no category
            category_id: task.category_id.map(Some),
        }
    }

    pub fn for_update(id: TaskId, update: &TaskUpdate, now: DateTime<Utc>) -> Self {
        TaskFields {
            id: Some(id),
            name: update.title.clone(),
            title_c: update.title.clone(),
            description_c: update.description.clone(),
            priority_c: update.priority,
            due_date: update.due_date,
            completed_c: update.completed,
            created_at: None,
            completed_at: update.completed_at(now),
            category_id: update.category_id,
        }
    }
}

/* -------------------------------------------------------------------------- */
/* Category records                                                           */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRecord {
    #[serde(rename = "Id")]
    pub id: CategoryId,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color_c: Option<String>,
    #[serde(default)]
    pub icon_c: Option<String>,
}

impl From<CategoryRecord> for Category {
    fn from(record: CategoryRecord) -> Self {
        Category {
            id: record.id,
            name: record.name.unwrap_or_default(),
            color: record.color_c.unwrap_or_default(),
            icon: record.icon_c.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryFields {
    #[serde(rename = "Id", skip_serializing_if = "Option::is_none")]
    pub id: Option<CategoryId>,
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_c: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_c: Option<String>,
}

impl From<&NewCategory> for CategoryFields {
    fn from(category: &NewCategory) -> Self {
        CategoryFields {
            id: None,
            name: Some(category.name.clone()),
            color_c: Some(category.color.clone()),
            icon_c: Some(category.icon.clone()),
        }
    }
}

impl CategoryFields {
    pub fn for_update(id: CategoryId, update: &CategoryUpdate) -> Self {
        CategoryFields {
            id: Some(id),
            name: update.name.clone(),
            color_c: update.color.clone(),
            icon_c: update.icon.clone(),
        }
    }
}

/* -------------------------------------------------------------------------- */
/* Timestamps                                                                 */
/* -------------------------------------------------------------------------- */

/// Null, empty, RFC 3339, or a zone-less ISO timestamp (taken as UTC). A value
/// that cannot be read is logged and treated as absent, so one bad row never
/// fails a whole listing.
fn timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Value> = Option::deserialize(deserializer)?;
    let parsed = match raw {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) if text.trim().is_empty() => None,
        Some(Value::String(text)) => {
            let parsed = parse_in(&text, &Utc);
            if parsed.is_none() {
                warn!("Ignoring unreadable timestamp: {}", text);
            }
            parsed
        }
        Some(other) => {
            warn!("Ignoring non-text timestamp: {}", other);
            None
        }
    };
    Ok(parsed)
}

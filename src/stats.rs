// src/stats.rs

use chrono::{DateTime, TimeZone};
use serde::Serialize;

use crate::due_date::{classify, DueStatus};
use crate::models::Task;

/// Dashboard header numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub due_today: usize,
    pub overdue: usize,
    pub completion_percentage: f64,
}

pub fn aggregate<Tz: TimeZone>(tasks: &[Task], now: &DateTime<Tz>) -> TaskStats {
    let mut stats = TaskStats {
        total: tasks.len(),
        ..Default::default()
    };

    for task in tasks {
        if task.completed {
            stats.completed += 1;
        }
        match classify(task, now) {
            DueStatus::Today => stats.due_today += 1,
            DueStatus::Overdue => stats.overdue += 1,
            _ => {}
        }
    }

    stats.completion_percentage = if stats.total > 0 {
        stats.completed as f64 / stats.total as f64 * 100.0
    } else {
        0.0
    };
    stats
}

// src/due_date.rs

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Serialize;

use crate::models::Task;

/// Where a task stands relative to its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DueStatus {
    None,
    Overdue,
    Today,
    Upcoming,
    Completed,
}

/// Classify a task's due date against `now`.
///
/// Days are compared in `now`'s time zone, so a task due at 23:59 is still
/// `Today` at 00:01 of the same day, and anything due earlier today is `Today`
/// rather than `Overdue`. Completion wins over every date comparison.
pub fn classify<Tz: TimeZone>(task: &Task, now: &DateTime<Tz>) -> DueStatus {
    let Some(due) = task.due_date else {
        return DueStatus::None;
    };
    if task.completed {
        return DueStatus::Completed;
    }

    let due_day = due.with_timezone(&now.timezone()).date_naive();
    let today = now.date_naive();
    if due_day == today {
        DueStatus::Today
    } else if due_day < today {
        DueStatus::Overdue
    } else {
        DueStatus::Upcoming
    }
}

/// `classify` against the current local time.
pub fn classify_now(task: &Task) -> DueStatus {
    classify(task, &Local::now())
}

/// Short due-date text for a task card: "Today", or e.g. "Oct 16, 2026".
pub fn due_label<Tz: TimeZone>(due: &DateTime<Utc>, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let local = due.with_timezone(&now.timezone());
    if local.date_naive() == now.date_naive() {
        "Today".to_string()
    } else {
        local.format("%b %-d, %Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use chrono::{Duration, FixedOffset};

    fn task(due: Option<DateTime<Utc>>, completed: bool) -> Task {
        Task {
            id: 1,
            title: "Pay rent".to_string(),
            description: String::new(),
            priority: Priority::Medium,
            due_date: due,
            completed,
            created_at: Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap(),
            completed_at: completed.then(|| Utc.with_ymd_and_hms(2026, 10, 2, 0, 0, 0).unwrap()),
            category_id: None,
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn no_due_date_is_none_regardless_of_completion() {
        let now = at(2026, 10, 16, 12, 0);
        assert_eq!(classify(&task(None, false), &now), DueStatus::None);
        assert_eq!(classify(&task(None, true), &now), DueStatus::None);
    }

    #[test]
    fn completed_overrides_the_date() {
        let now = at(2026, 10, 16, 12, 0);
        for due in [now - Duration::days(3), now, now + Duration::days(3)] {
            assert_eq!(classify(&task(Some(due), true), &now), DueStatus::Completed);
        }
    }

    #[test]
    fn earlier_today_is_today_not_overdue() {
        let now = at(2026, 10, 16, 18, 0);
        let due = at(2026, 10, 16, 9, 0);
        assert_eq!(classify(&task(Some(due), false), &now), DueStatus::Today);
    }

    #[test]
    fn late_deadline_is_not_overdue_just_after_midnight() {
        let now = at(2026, 10, 16, 0, 1);
        let due = at(2026, 10, 16, 23, 59);
        assert_eq!(classify(&task(Some(due), false), &now), DueStatus::Today);
    }

    #[test]
    fn yesterday_is_overdue_and_tomorrow_is_upcoming() {
        let now = at(2026, 10, 16, 0, 1);
        assert_eq!(
            classify(&task(Some(at(2026, 10, 15, 23, 59)), false), &now),
            DueStatus::Overdue
        );
        assert_eq!(
            classify(&task(Some(at(2026, 10, 17, 0, 0)), false), &now),
            DueStatus::Upcoming
        );
    }

    #[test]
    fn calendar_day_follows_the_reference_time_zone() {
        // 02:00 UTC on the 17th is still the evening of the 16th in UTC-5.
        let due = at(2026, 10, 17, 2, 0);
        let eastern = FixedOffset::west_opt(5 * 3600).unwrap();
        let now = eastern.with_ymd_and_hms(2026, 10, 16, 20, 0, 0).unwrap();
        assert_eq!(classify(&task(Some(due), false), &now), DueStatus::Today);

        let now_utc = at(2026, 10, 16, 20, 0);
        assert_eq!(classify(&task(Some(due), false), &now_utc), DueStatus::Upcoming);
    }

    #[test]
    fn classify_now_uses_the_current_local_day() {
        let now = Utc::now();
        assert_eq!(classify_now(&task(None, false)), DueStatus::None);
        assert_eq!(
            classify_now(&task(Some(now + Duration::days(5)), false)),
            DueStatus::Upcoming
        );
        assert_eq!(
            classify_now(&task(Some(now - Duration::days(5)), false)),
            DueStatus::Overdue
        );
        assert_eq!(
            classify_now(&task(Some(now - Duration::days(5)), true)),
            DueStatus::Completed
        );
    }

    #[test]
    fn due_label_says_today_or_formats_the_date() {
        let now = at(2026, 10, 16, 10, 0);
        assert_eq!(due_label(&at(2026, 10, 16, 22, 0), &now), "Today");
        assert_eq!(due_label(&at(2026, 11, 3, 9, 0), &now), "Nov 3, 2026");
    }
}

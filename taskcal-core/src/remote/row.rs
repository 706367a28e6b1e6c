//! Wire types for the hosted `tasks` table.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::date_key::DateKey;
use crate::task::{Priority, Task, TaskCollection, TaskId};

/// A row as returned by the table.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskRow {
    pub id: TaskId,
    #[serde(default)]
    pub user_email: Option<String>,
    pub date: String,
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: Priority,
    #[serde(default, deserialize_with = "null_as_default")]
    pub completed: bool,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// A row to insert. `created_at` is the task's own creation time so the
/// stored row keeps the `(text, created_at)` identity of the local task.
#[derive(Debug, Clone, Serialize)]
pub struct NewTaskRow<'a> {
    pub user_email: &'a str,
    pub date: DateKey,
    pub text: &'a str,
    pub priority: Priority,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl<'a> NewTaskRow<'a> {
    pub fn new(user_email: &'a str, date: &DateKey, task: &'a Task) -> Self {
        NewTaskRow {
            user_email,
            date: *date,
            text: &task.text,
            priority: task.priority,
            completed: task.completed,
            created_at: task.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpdatedAtRow {
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TaskRow {
    /// Split into the day key and the task. None if the date column is not a
    /// valid `YYYY-MM-DD` day.
    pub fn into_task(self) -> Option<(DateKey, Task)> {
        let key = self.date.parse().ok()?;

        Some((
            key,
            Task {
                id: self.id,
                text: self.text,
                priority: self.priority,
                completed: self.completed,
                created_at: self.created_at,
            },
        ))
    }
}

/// Group rows by day, keeping row order within each day.
pub(crate) fn group_rows(rows: Vec<TaskRow>) -> TaskCollection {
    let mut tasks = TaskCollection::new();

    for row in rows {
        let id = row.id.clone();
        match row.into_task() {
            Some((key, task)) => tasks.push(key, task),
            None => tracing::warn!(%id, "skipping task row with invalid date"),
        }
    }

    tasks
}

/// Accept RFC 3339 timestamps as well as zone-less ones (read as UTC), which
/// is what a `timestamp without time zone` column returns.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// Nullable columns read as their default, the same as a missing key.
fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(d).map(Option::unwrap_or_default)
}

fn deserialize_timestamp<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
    let s = String::deserialize(d)?;
    parse_timestamp(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{s}'")))
}

fn deserialize_optional_timestamp<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    match Option::<String>::deserialize(d)? {
        Some(s) => parse_timestamp(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{s}'"))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_rows_group_by_day_in_order() {
        let json = r#"[
            {"id": 7, "user_email": "a@b.io", "date": "2024-03-15", "text": "first",
             "priority": "high", "completed": false, "created_at": "2024-03-15T09:00:00.123+00:00",
             "updated_at": "2024-03-15T09:00:00.123+00:00"},
            {"id": 8, "user_email": "a@b.io", "date": "2024-03-16", "text": "other day",
             "priority": "low", "completed": true, "created_at": "2024-03-15T10:00:00+00:00"},
            {"id": 9, "user_email": "a@b.io", "date": "2024-03-15", "text": "second",
             "priority": "medium", "completed": false, "created_at": "2024-03-15T11:00:00"},
            {"id": 10, "user_email": "a@b.io", "date": "someday", "text": "broken",
             "priority": "medium", "completed": false, "created_at": "2024-03-15T11:00:00Z"}
        ]"#;

        let rows: Vec<TaskRow> = serde_json::from_str(json).unwrap();
        let tasks = group_rows(rows);
        let day: DateKey = "2024-03-15".parse().unwrap();

        assert_eq!(tasks.len(), 3);
        let texts: Vec<_> = tasks.tasks_for(&day).iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["first", "second"]);

        let first = &tasks.tasks_for(&day)[0];
        assert_eq!(first.id.as_str(), "7");
        assert_eq!(
            first.created_at,
            Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap() + chrono::TimeDelta::milliseconds(123)
        );
    }

    #[test]
    fn test_new_row_keeps_task_creation_time() {
        let created_at = Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap();
        let task = Task {
            id: TaskId::provisional(&created_at),
            text: "Buy milk".into(),
            priority: Priority::High,
            completed: false,
            created_at,
        };
        let date: DateKey = "2024-03-15".parse().unwrap();

        let value = serde_json::to_value(NewTaskRow::new("a@b.io", &date, &task)).unwrap();

        assert_eq!(value["date"], "2024-03-15");
        assert_eq!(value["priority"], "high");
        assert_eq!(value["created_at"], "2024-03-15T09:00:00Z");
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_null_priority_and_completed_read_as_defaults() {
        let json = r#"[
            {"id": 1, "date": "2024-03-15", "text": "set", "priority": "high",
             "completed": true, "created_at": "2024-03-15T09:00:00Z"},
            {"id": 2, "date": "2024-03-15", "text": "nulls", "priority": null,
             "completed": null, "created_at": "2024-03-15T10:00:00Z"}
        ]"#;

        let rows: Vec<TaskRow> = serde_json::from_str(json).unwrap();
        let tasks = group_rows(rows);
        let day: DateKey = "2024-03-15".parse().unwrap();

        let nulls = &tasks.tasks_for(&day)[1];
        assert_eq!(nulls.text, "nulls");
        assert_eq!(nulls.priority, Priority::Medium);
        assert!(!nulls.completed);
        assert_eq!(tasks.tasks_for(&day)[0].priority, Priority::High);
    }

    #[test]
    fn test_updated_at_may_be_null() {
        let row: UpdatedAtRow = serde_json::from_str(r#"{"updated_at": null}"#).unwrap();
        assert!(row.updated_at.is_none());
    }
}

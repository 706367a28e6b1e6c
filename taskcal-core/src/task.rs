//! Tasks and the per-day task collection.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::date_key::DateKey;
use crate::error::{TaskCalError, TaskCalResult};

/// Maximum task text length, in characters.
pub const MAX_TASK_TEXT_LEN: usize = 100;

/// How many task texts a calendar cell previews before showing "+N".
pub const PREVIEW_LIMIT: usize = 2;

/// Opaque task identifier.
///
/// Server rows may carry numeric or string ids; tasks created locally get the
/// creation time in epoch milliseconds until the server has seen them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        TaskId(id.into())
    }

    pub fn provisional(created_at: &DateTime<Utc>) -> Self {
        TaskId(created_at.timestamp_millis().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Int(n) => TaskId(n.to_string()),
            RawId::Text(s) => TaskId(s),
        })
    }
}

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
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = TaskCalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(TaskCalError::Validation(format!(
                "Unknown priority '{}'. Expected low, medium or high",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// The identity used to match a local task against remote rows. Local
    /// tasks may not have a server id yet, so `id` is not usable for this.
    pub fn natural_key(&self) -> (&str, &DateTime<Utc>) {
        (&self.text, &self.created_at)
    }

    pub fn same_task(&self, other: &Task) -> bool {
        self.natural_key() == other.natural_key()
    }
}

/// Validated input for a new task.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    text: String,
    priority: Priority,
}

impl NewTask {
    pub fn new(text: &str, priority: Priority) -> TaskCalResult<Self> {
        let text = text.trim();

        if text.is_empty() {
            return Err(TaskCalError::Validation("Task text cannot be empty".into()));
        }

        if text.chars().count() > MAX_TASK_TEXT_LEN {
            return Err(TaskCalError::Validation(format!(
                "Task text is longer than {} characters",
                MAX_TASK_TEXT_LEN
            )));
        }

        Ok(NewTask {
            text: text.to_string(),
            priority,
        })
    }

    pub fn into_task(self, now: DateTime<Utc>) -> Task {
        // Millisecond precision survives the remote timestamp column unchanged.
        let created_at = now.trunc_subsecs(3);

        Task {
            id: TaskId::provisional(&created_at),
            text: self.text,
            priority: self.priority,
            completed: false,
            created_at,
        }
    }
}

/// Tasks grouped by day. Days without tasks are never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TaskCollection(BTreeMap<DateKey, Vec<Task>>);

impl<'de> Deserialize<'de> for TaskCollection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let days = BTreeMap::<DateKey, Vec<Task>>::deserialize(deserializer)?;
        Ok(days.into_iter().collect())
    }
}

impl FromIterator<(DateKey, Vec<Task>)> for TaskCollection {
    fn from_iter<I: IntoIterator<Item = (DateKey, Vec<Task>)>>(iter: I) -> Self {
        let mut days = BTreeMap::new();
        for (key, tasks) in iter {
            if !tasks.is_empty() {
                days.insert(key, tasks);
            }
        }
        TaskCollection(days)
    }
}

impl TaskCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of tasks across all days.
    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn tasks_for(&self, key: &DateKey) -> &[Task] {
        self.0.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn days(&self) -> impl Iterator<Item = (&DateKey, &[Task])> {
        self.0.iter().map(|(key, tasks)| (key, tasks.as_slice()))
    }

    /// Append a task to a day. Used when grouping rows; mutations from the
    /// application go through the copying methods below.
    pub fn push(&mut self, key: DateKey, task: Task) {
        self.0.entry(key).or_default().push(task);
    }

    /// Copy of the collection with `task` appended to `key`.
    pub fn with_added(&self, key: DateKey, task: Task) -> Self {
        let mut next = self.clone();
        next.push(key, task);
        next
    }

    /// Copy of the collection without the task at `index` under `key`.
    /// Returns the removed task alongside.
    pub fn with_removed(&self, key: &DateKey, index: usize) -> TaskCalResult<(Self, Task)> {
        let mut next = self.clone();
        let tasks = next
            .0
            .get_mut(key)
            .filter(|tasks| index < tasks.len())
            .ok_or_else(|| index_error(key, index))?;

        let removed = tasks.remove(index);
        if tasks.is_empty() {
            next.0.remove(key);
        }

        Ok((next, removed))
    }

    /// Copy of the collection with the task at `index` under `key` flipped
    /// between completed and open.
    pub fn with_toggled(&self, key: &DateKey, index: usize) -> TaskCalResult<Self> {
        let mut next = self.clone();
        let task = next
            .0
            .get_mut(key)
            .and_then(|tasks| tasks.get_mut(index))
            .ok_or_else(|| index_error(key, index))?;

        task.completed = !task.completed;
        Ok(next)
    }

    /// Texts of the first few tasks of a day, plus how many were left out.
    pub fn preview(&self, key: &DateKey) -> (Vec<&str>, usize) {
        let tasks = self.tasks_for(key);
        let shown = tasks
            .iter()
            .take(PREVIEW_LIMIT)
            .map(|t| t.text.as_str())
            .collect();
        (shown, tasks.len().saturating_sub(PREVIEW_LIMIT))
    }
}

fn index_error(key: &DateKey, index: usize) -> TaskCalError {
    TaskCalError::Validation(format!("No task #{} on {}", index + 1, key))
}

//! In-memory task table for tests.

use std::collections::HashSet;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::date_key::DateKey;
use crate::error::{RemoteError, RemoteErrorKind, RemoteResult};
use crate::remote::TaskRemote;
use crate::task::{Task, TaskCollection, TaskId};

struct StoredRow {
    user_email: String,
    date: DateKey,
    task: Task,
    updated_at: DateTime<Utc>,
}

#[derive(Default)]
struct State {
    rows: Vec<StoredRow>,
    next_id: u64,
    offline: bool,
    missing_table: bool,
    failing_texts: HashSet<String>,
    inserts: usize,
    updates: usize,
    deletes: usize,
}

/// Counts of successful mutations since creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Mutations {
    pub inserts: usize,
    pub updates: usize,
    pub deletes: usize,
}

#[derive(Default)]
pub(crate) struct MemoryRemote {
    state: Mutex<State>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed rows without counting them as mutations.
    pub fn with_tasks(self, user_email: &str, tasks: &TaskCollection) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            for (date, day) in tasks.days() {
                for task in day {
                    state.next_id += 1;
                    let mut task = task.clone();
                    task.id = TaskId::new(format!("srv-{}", state.next_id));
                    state.rows.push(StoredRow {
                        user_email: user_email.to_string(),
                        date: *date,
                        updated_at: task.created_at,
                        task,
                    });
                }
            }
        }
        self
    }

    /// Every call fails with a transient error while offline.
    pub fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    /// Every call fails with `NotFound`, as if the table did not exist.
    pub fn set_missing_table(&self, missing: bool) {
        self.state.lock().unwrap().missing_table = missing;
    }

    /// Inserts of tasks with this text are rejected.
    pub fn reject_text(&self, text: &str) {
        self.state.lock().unwrap().failing_texts.insert(text.to_string());
    }

    pub fn mutations(&self) -> Mutations {
        let state = self.state.lock().unwrap();
        Mutations {
            inserts: state.inserts,
            updates: state.updates,
            deletes: state.deletes,
        }
    }

    pub fn tasks_of(&self, user_email: &str) -> TaskCollection {
        let state = self.state.lock().unwrap();
        collect(&state, user_email)
    }

    fn check(state: &State) -> RemoteResult<()> {
        if state.missing_table {
            return Err(RemoteError::new(RemoteErrorKind::NotFound, "no such table"));
        }
        if state.offline {
            return Err(RemoteError::new(RemoteErrorKind::Transient, "offline"));
        }
        Ok(())
    }
}

fn collect(state: &State, user_email: &str) -> TaskCollection {
    let mut rows: Vec<&StoredRow> = state
        .rows
        .iter()
        .filter(|row| row.user_email == user_email)
        .collect();
    rows.sort_by_key(|row| row.task.created_at);

    let mut tasks = TaskCollection::new();
    for row in rows {
        tasks.push(row.date, row.task.clone());
    }
    tasks
}

impl TaskRemote for MemoryRemote {
    async fn fetch_tasks(&self, user_email: &str) -> RemoteResult<TaskCollection> {
        let state = self.state.lock().unwrap();
        Self::check(&state)?;
        Ok(collect(&state, user_email))
    }

    async fn insert_task(&self, user_email: &str, date: &DateKey, task: &Task) -> RemoteResult<Task> {
        let mut state = self.state.lock().unwrap();
        Self::check(&state)?;

        if state.failing_texts.contains(&task.text) {
            return Err(RemoteError::new(RemoteErrorKind::Validation, "rejected"));
        }

        state.next_id += 1;
        let mut stored = task.clone();
        stored.id = TaskId::new(format!("srv-{}", state.next_id));

        state.rows.push(StoredRow {
            user_email: user_email.to_string(),
            date: *date,
            task: stored.clone(),
            updated_at: Utc::now(),
        });
        state.inserts += 1;
        Ok(stored)
    }

    async fn set_completed(&self, id: &TaskId, completed: bool) -> RemoteResult<Task> {
        let mut state = self.state.lock().unwrap();
        Self::check(&state)?;

        let row = state
            .rows
            .iter_mut()
            .find(|row| &row.task.id == id)
            .ok_or_else(|| RemoteError::new(RemoteErrorKind::NotFound, "no row"))?;

        row.task.completed = completed;
        row.updated_at = Utc::now();
        let task = row.task.clone();
        state.updates += 1;
        Ok(task)
    }

    async fn delete_task(&self, id: &TaskId) -> RemoteResult<()> {
        let mut state = self.state.lock().unwrap();
        Self::check(&state)?;

        let before = state.rows.len();
        state.rows.retain(|row| &row.task.id != id);
        if state.rows.len() < before {
            state.deletes += 1;
        }
        Ok(())
    }

    async fn last_updated_at(&self, user_email: &str) -> RemoteResult<Option<DateTime<Utc>>> {
        let state = self.state.lock().unwrap();
        Self::check(&state)?;

        Ok(state
            .rows
            .iter()
            .filter(|row| row.user_email == user_email)
            .map(|row| row.updated_at)
            .max())
    }

    async fn check_connection(&self) -> RemoteResult<()> {
        let state = self.state.lock().unwrap();
        Self::check(&state)
    }
}

//! Planning which local tasks must be pushed to the remote store.

use std::fmt;

use crate::date_key::DateKey;
use crate::task::{Task, TaskCollection, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushKind {
    Insert,
    Update,
}

impl fmt::Display for PushKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushKind::Insert => write!(f, "+"),
            PushKind::Update => write!(f, "~"),
        }
    }
}

/// One remote mutation needed to bring the remote store up to date with a
/// local task.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskPush {
    /// The task has no remote counterpart yet.
    Insert { date: DateKey, task: Task },
    /// The remote counterpart `id` has a different `completed` flag.
    Update {
        date: DateKey,
        id: TaskId,
        task: Task,
    },
}

impl TaskPush {
    pub fn kind(&self) -> PushKind {
        match self {
            TaskPush::Insert { .. } => PushKind::Insert,
            TaskPush::Update { .. } => PushKind::Update,
        }
    }

    pub fn date(&self) -> &DateKey {
        match self {
            TaskPush::Insert { date, .. } | TaskPush::Update { date, .. } => date,
        }
    }

    /// The local task being pushed.
    pub fn task(&self) -> &Task {
        match self {
            TaskPush::Insert { task, .. } | TaskPush::Update { task, .. } => task,
        }
    }
}

impl fmt::Display for TaskPush {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.kind(), self.date(), self.task().text)
    }
}

/// Local → remote plan. Tasks are matched by `(text, created_at)` under the
/// same day; remote-only tasks are left alone.
pub fn plan_push(local: &TaskCollection, remote: &TaskCollection) -> Vec<TaskPush> {
    let mut pushes = Vec::new();

    for (date, tasks) in local.days() {
        let remote_day = remote.tasks_for(date);

        for task in tasks {
            match remote_day.iter().find(|r| r.same_task(task)) {
                None => pushes.push(TaskPush::Insert {
                    date: *date,
                    task: task.clone(),
                }),
                Some(existing) if existing.completed != task.completed => {
                    pushes.push(TaskPush::Update {
                        date: *date,
                        id: existing.id.clone(),
                        task: task.clone(),
                    })
                }
                Some(_) => {}
            }
        }
    }

    pushes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::tests::{key, task};

    #[test]
    fn test_changed_completion_is_one_update() {
        let day = key("2024-03-15");
        let local = TaskCollection::new().with_added(day, task("Buy milk", 1, true));
        let mut remote_task = task("Buy milk", 1, false);
        remote_task.id = TaskId::new("42");
        let remote = TaskCollection::new().with_added(day, remote_task);

        let plan = plan_push(&local, &remote);

        assert_eq!(plan.len(), 1);
        match &plan[0] {
            TaskPush::Update { id, task, .. } => {
                assert_eq!(id.as_str(), "42");
                assert!(task.completed);
            }
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_remote_counterpart_is_one_insert() {
        let day = key("2024-03-15");
        let local = TaskCollection::new().with_added(day, task("Buy milk", 1, true));

        let plan = plan_push(&local, &TaskCollection::new());

        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].kind(), PushKind::Insert);
        assert_eq!(plan[0].to_string(), "+ 2024-03-15 Buy milk");
    }

    #[test]
    fn test_identical_tasks_need_nothing() {
        let day = key("2024-03-15");
        let local = TaskCollection::new().with_added(day, task("Buy milk", 1, false));

        assert!(plan_push(&local, &local.clone()).is_empty());
    }

    #[test]
    fn test_match_requires_same_day_text_and_creation_time() {
        let local = TaskCollection::new().with_added(key("2024-03-15"), task("Buy milk", 1, false));

        let other_day = TaskCollection::new().with_added(key("2024-03-16"), task("Buy milk", 1, false));
        let other_time = TaskCollection::new().with_added(key("2024-03-15"), task("Buy milk", 2, false));
        let other_text = TaskCollection::new().with_added(key("2024-03-15"), task("Buy oat milk", 1, false));

        for remote in [other_day, other_time, other_text] {
            let plan = plan_push(&local, &remote);
            assert_eq!(plan.len(), 1);
            assert_eq!(plan[0].kind(), PushKind::Insert);
        }
    }

    #[test]
    fn test_remote_only_tasks_are_ignored() {
        let remote = TaskCollection::new().with_added(key("2024-03-15"), task("theirs", 1, false));
        assert!(plan_push(&TaskCollection::new(), &remote).is_empty());
    }
}

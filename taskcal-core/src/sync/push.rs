//! Applying push plans to the remote store.

use crate::date_key::DateKey;
use crate::error::RemoteResult;
use crate::remote::TaskRemote;
use crate::sync::plan::{TaskPush, plan_push};
use crate::task::{Task, TaskCollection};

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushReport {
    pub inserted: usize,
    pub updated: usize,
    pub failed: usize,
}

impl PushReport {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }

    pub fn is_noop(&self) -> bool {
        self.inserted == 0 && self.updated == 0 && self.failed == 0
    }
}

/// Apply each push on its own. A failed push is logged and counted; it does
/// not stop the ones after it.
pub async fn apply_push<R: TaskRemote>(
    remote: &R,
    user_email: &str,
    pushes: &[TaskPush],
) -> PushReport {
    let mut report = PushReport::default();

    for push in pushes {
        let result = match push {
            TaskPush::Insert { date, task } => remote.insert_task(user_email, date, task).await,
            TaskPush::Update { id, task, .. } => remote.set_completed(id, task.completed).await,
        };

        match (result, push) {
            (Ok(_), TaskPush::Insert { .. }) => report.inserted += 1,
            (Ok(_), TaskPush::Update { .. }) => report.updated += 1,
            (Err(e), push) => {
                tracing::warn!(user = user_email, %push, "push failed: {e}");
                report.failed += 1;
            }
        }
    }

    report
}

/// Fetch the remote snapshot and push whatever the local collection has
/// that the snapshot lacks. Only the fetch can fail the whole pass.
pub async fn reconcile<R: TaskRemote>(
    remote: &R,
    user_email: &str,
    local: &TaskCollection,
) -> RemoteResult<PushReport> {
    let snapshot = fetch_or_empty(remote, user_email).await?;
    let pushes = plan_push(local, &snapshot);

    tracing::debug!(user = user_email, pushes = pushes.len(), "reconciling");
    Ok(apply_push(remote, user_email, &pushes).await)
}

/// Delete the remote row matching `task` on `date`, found by the task's
/// natural key in a fresh snapshot. Returns whether a row was deleted.
pub async fn remove_matching<R: TaskRemote>(
    remote: &R,
    user_email: &str,
    date: &DateKey,
    task: &Task,
) -> RemoteResult<bool> {
    let snapshot = fetch_or_empty(remote, user_email).await?;

    match snapshot.tasks_for(date).iter().find(|r| r.same_task(task)) {
        Some(existing) => {
            remote.delete_task(&existing.id).await?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// A missing table reads as an empty one.
pub(crate) async fn fetch_or_empty<R: TaskRemote>(
    remote: &R,
    user_email: &str,
) -> RemoteResult<TaskCollection> {
    match remote.fetch_tasks(user_email).await {
        Err(e) if e.is_not_found() => {
            tracing::debug!("remote task table not found, treating as empty");
            Ok(TaskCollection::new())
        }
        result => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::memory::{MemoryRemote, Mutations};
    use crate::task::tests::{key, task};

    const USER: &str = "jane@example.com";

    #[tokio::test]
    async fn test_second_pass_is_a_noop() {
        let remote = MemoryRemote::new();
        let local = TaskCollection::new()
            .with_added(key("2024-03-15"), task("a", 1, false))
            .with_added(key("2024-03-16"), task("b", 2, true));

        let first = reconcile(&remote, USER, &local).await.unwrap();
        assert_eq!(first.inserted, 2);

        let after_first = remote.mutations();
        let second = reconcile(&remote, USER, &local).await.unwrap();

        assert!(second.is_noop());
        assert_eq!(remote.mutations(), after_first);
    }

    #[tokio::test]
    async fn test_completion_change_is_pushed_as_update() {
        let day = key("2024-03-15");
        let remote = MemoryRemote::new()
            .with_tasks(USER, &TaskCollection::new().with_added(day, task("Buy milk", 1, false)));
        let local = TaskCollection::new().with_added(day, task("Buy milk", 1, true));

        let report = reconcile(&remote, USER, &local).await.unwrap();

        assert_eq!(report, PushReport { inserted: 0, updated: 1, failed: 0 });
        assert_eq!(remote.mutations(), Mutations { inserts: 0, updates: 1, deletes: 0 });
        assert!(remote.tasks_of(USER).tasks_for(&day)[0].completed);
    }

    #[tokio::test]
    async fn test_one_failed_push_does_not_stop_the_rest() {
        let day = key("2024-03-15");
        let remote = MemoryRemote::new();
        remote.reject_text("bad");

        let local = TaskCollection::new()
            .with_added(day, task("good 1", 1, false))
            .with_added(day, task("bad", 2, false))
            .with_added(day, task("good 2", 3, false));

        let report = reconcile(&remote, USER, &local).await.unwrap();

        assert_eq!(report, PushReport { inserted: 2, updated: 0, failed: 1 });
        assert!(!report.is_clean());
        assert_eq!(remote.tasks_of(USER).len(), 2);
    }

    #[tokio::test]
    async fn test_offline_fetch_fails_the_pass() {
        let remote = MemoryRemote::new();
        remote.set_offline(true);

        let local = TaskCollection::new().with_added(key("2024-03-15"), task("a", 1, false));
        assert!(reconcile(&remote, USER, &local).await.is_err());
    }

    #[tokio::test]
    async fn test_remove_matching_deletes_by_natural_key() {
        let day = key("2024-03-15");
        let remote = MemoryRemote::new().with_tasks(
            USER,
            &TaskCollection::new()
                .with_added(day, task("keep", 1, false))
                .with_added(day, task("drop", 2, false)),
        );

        assert!(remove_matching(&remote, USER, &day, &task("drop", 2, false)).await.unwrap());
        assert!(!remove_matching(&remote, USER, &day, &task("never", 3, false)).await.unwrap());

        let left = remote.tasks_of(USER);
        assert_eq!(left.len(), 1);
        assert_eq!(left.tasks_for(&day)[0].text, "keep");
    }
}

//! Remote task store.
//!
//! The hosted table keeps one row per task. [`TaskRemote`] is the seam the
//! sync code talks to; [`PostgrestRemote`] implements it over HTTP.

#[cfg(test)]
pub(crate) mod memory;
mod postgrest;
mod row;

pub use postgrest::PostgrestRemote;
pub use row::{NewTaskRow, TaskRow};

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::date_key::DateKey;
use crate::error::RemoteResult;
use crate::task::{Task, TaskCollection, TaskId};

/// Operations the sync code needs from a remote task table.
///
/// Implementations classify their own failures into
/// [`RemoteErrorKind`](crate::error::RemoteErrorKind); a missing table is
/// reported as `NotFound` and callers treat it as "no rows".
pub trait TaskRemote: Send + Sync + 'static {
    /// All tasks of a user grouped by day, each day ordered by creation time.
    fn fetch_tasks(
        &self,
        user_email: &str,
    ) -> impl Future<Output = RemoteResult<TaskCollection>> + Send;

    /// Insert a task and return it as stored, with its server id.
    fn insert_task(
        &self,
        user_email: &str,
        date: &DateKey,
        task: &Task,
    ) -> impl Future<Output = RemoteResult<Task>> + Send;

    fn set_completed(
        &self,
        id: &TaskId,
        completed: bool,
    ) -> impl Future<Output = RemoteResult<Task>> + Send;

    fn delete_task(&self, id: &TaskId) -> impl Future<Output = RemoteResult<()>> + Send;

    /// Most recent `updated_at` among the user's rows, None if there are none.
    fn last_updated_at(
        &self,
        user_email: &str,
    ) -> impl Future<Output = RemoteResult<Option<DateTime<Utc>>>> + Send;

    fn check_connection(&self) -> impl Future<Output = RemoteResult<()>> + Send;
}

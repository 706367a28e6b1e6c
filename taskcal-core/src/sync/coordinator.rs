//! Coordinates the task cache, the remote store and the published state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::date_key::DateKey;
use crate::local::TaskCache;
use crate::remote::TaskRemote;
use crate::sync::push::{fetch_or_empty, reconcile, remove_matching};
use crate::sync::{SyncState, SyncStatus};
use crate::task::{Task, TaskCollection};

/// Handle background work uses to report into the shared [`SyncState`].
/// Reports from an older epoch (before a teardown) are dropped.
#[derive(Clone)]
struct StatusReporter {
    state: Arc<watch::Sender<SyncState>>,
    epoch: u64,
}

impl StatusReporter {
    fn update(&self, f: impl FnOnce(&mut SyncState)) {
        self.state.send_modify(|state| {
            if state.epoch == self.epoch {
                f(state);
            }
        });
    }

    fn begin(&self) {
        self.update(|state| state.in_flight += 1);
    }

    fn finish(&self, status: SyncStatus) {
        self.update(|state| {
            state.in_flight = state.in_flight.saturating_sub(1);
            state.status = status;
        });
    }

    fn set_last_sync_time(&self, time: Option<DateTime<Utc>>) {
        self.update(|state| state.last_sync_time = time);
    }
}

/// Owns the published task collection and runs the load and save protocols.
///
/// Mutations never wait on the network: the cache is written before
/// returning, and remote pushes run as background tasks tracked in a
/// [`JoinSet`] so callers can [`settle`](Self::settle) them.
pub struct SyncCoordinator<R: TaskRemote> {
    cache: TaskCache,
    remote: Option<Arc<R>>,
    tasks: watch::Sender<TaskCollection>,
    state: Arc<watch::Sender<SyncState>>,
    background: JoinSet<()>,
}

impl<R: TaskRemote> SyncCoordinator<R> {
    /// Without a remote the coordinator only ever touches the cache and the
    /// status stays [`SyncStatus::Local`].
    pub fn new(cache: TaskCache, remote: Option<R>) -> Self {
        SyncCoordinator {
            cache,
            remote: remote.map(Arc::new),
            tasks: watch::Sender::new(TaskCollection::new()),
            state: Arc::new(watch::Sender::new(SyncState::default())),
            background: JoinSet::new(),
        }
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    pub fn remote(&self) -> Option<&R> {
        self.remote.as_deref()
    }

    pub fn tasks(&self) -> TaskCollection {
        self.tasks.borrow().clone()
    }

    pub fn sync_state(&self) -> SyncState {
        self.state.borrow().clone()
    }

    pub fn subscribe_tasks(&self) -> watch::Receiver<TaskCollection> {
        self.tasks.subscribe()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SyncState> {
        self.state.subscribe()
    }

    fn reporter(&self) -> StatusReporter {
        StatusReporter {
            state: self.state.clone(),
            epoch: self.state.borrow().epoch,
        }
    }

    /// Load protocol: publish the cached collection right away, then let a
    /// non-empty remote collection replace it (and the cache). A failed fetch
    /// keeps the cached collection and sets the status to `Error`.
    pub async fn load(&mut self, user_email: &str) -> SyncStatus {
        let cached = self.cache.load(user_email);
        if !cached.is_empty() {
            self.tasks.send_replace(cached);
        }

        let Some(remote) = self.remote.clone() else {
            return self.sync_state().status;
        };

        let reporter = self.reporter();
        reporter.begin();

        let status = match fetch_or_empty(remote.as_ref(), user_email).await {
            Ok(remote_tasks) => {
                if remote_tasks.is_empty() {
                    tracing::debug!(user = user_email, "remote has no tasks, keeping cache");
                } else {
                    if let Err(e) = self.cache.save(user_email, &remote_tasks) {
                        tracing::warn!(user = user_email, "could not cache remote tasks: {e}");
                    }
                    self.tasks.send_replace(remote_tasks);
                }

                refresh_last_sync_time(remote.as_ref(), user_email, &reporter).await;
                SyncStatus::Cloud
            }
            Err(e) => {
                tracing::warn!(user = user_email, "could not load remote tasks: {e}");
                SyncStatus::Error
            }
        };

        reporter.finish(status);
        status
    }

    /// Save protocol: publish and cache `tasks`, then reconcile with the
    /// remote store in the background. Never fails; a cache write error is
    /// logged and remote failures only show up in the sync status.
    pub fn commit(&mut self, user_email: &str, tasks: TaskCollection) {
        if let Err(e) = self.cache.save(user_email, &tasks) {
            tracing::warn!(user = user_email, "could not write task cache: {e}");
        }
        self.tasks.send_replace(tasks.clone());

        let Some(remote) = self.remote.clone() else {
            return;
        };

        let reporter = self.reporter();
        reporter.begin();

        let user_email = user_email.to_string();
        self.spawn_background(async move {
            let status = match reconcile(remote.as_ref(), &user_email, &tasks).await {
                Ok(report) if report.is_clean() => {
                    tracing::debug!(user = %user_email, ?report, "pushed local changes");
                    if !report.is_noop() {
                        refresh_last_sync_time(remote.as_ref(), &user_email, &reporter).await;
                    }
                    SyncStatus::Cloud
                }
                Ok(report) => {
                    tracing::warn!(user = %user_email, ?report, "some tasks failed to push");
                    SyncStatus::Error
                }
                Err(e) => {
                    tracing::warn!(user = %user_email, "could not reconcile with remote: {e}");
                    SyncStatus::Error
                }
            };

            reporter.finish(status);
        });
    }

    /// Delete the remote row of a task removed locally, in the background.
    pub fn forget_remote(&mut self, user_email: &str, date: DateKey, task: Task) {
        let Some(remote) = self.remote.clone() else {
            return;
        };

        let reporter = self.reporter();
        reporter.begin();

        let user_email = user_email.to_string();
        self.spawn_background(async move {
            let status = match remove_matching(remote.as_ref(), &user_email, &date, &task).await {
                Ok(deleted) => {
                    tracing::debug!(user = %user_email, %date, deleted, "removed remote task");
                    SyncStatus::Cloud
                }
                Err(e) => {
                    tracing::warn!(user = %user_email, %date, "could not delete remote task: {e}");
                    SyncStatus::Error
                }
            };

            reporter.finish(status);
        });
    }

    /// Track `work` in the background set, dropping entries that already
    /// finished so the set stays small when nobody settles it.
    fn spawn_background(&mut self, work: impl Future<Output = ()> + Send + 'static) {
        while let Some(result) = self.background.try_join_next() {
            if let Err(e) = result {
                tracing::warn!("background sync task did not finish: {e}");
            }
        }
        self.background.spawn(work);
    }

    /// Wait for all background work started so far.
    pub async fn settle(&mut self) {
        while let Some(result) = self.background.join_next().await {
            if let Err(e) = result {
                tracing::warn!("background sync task did not finish: {e}");
            }
        }
    }

    /// Forget the session: clear the published collection and status. Work
    /// already in flight keeps running but can no longer report back.
    pub fn teardown(&mut self) {
        self.background.detach_all();
        self.tasks.send_replace(TaskCollection::new());
        self.state.send_modify(|state| {
            *state = SyncState {
                epoch: state.epoch + 1,
                ..SyncState::default()
            };
        });
    }
}

async fn refresh_last_sync_time<R: TaskRemote>(
    remote: &R,
    user_email: &str,
    reporter: &StatusReporter,
) {
    match remote.last_updated_at(user_email).await {
        Ok(time) => reporter.set_last_sync_time(time),
        Err(e) if e.is_not_found() => reporter.set_last_sync_time(None),
        Err(e) => tracing::warn!(user = user_email, "could not read last sync time: {e}"),
    }
}

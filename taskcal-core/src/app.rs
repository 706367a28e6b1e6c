//! Application state: the signed-in user, their tasks and the sync status.

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::date_key::DateKey;
use crate::error::{TaskCalError, TaskCalResult};
use crate::local::{LocalStore, TaskCache};
use crate::remote::TaskRemote;
use crate::session::{Session, User};
use crate::sync::{SyncCoordinator, SyncState, SyncStatus};
use crate::task::{NewTask, Task, TaskCollection};

/// Everything a front end reads and drives.
///
/// Created logged out. [`initialize`](Self::initialize) (or
/// [`resume`](Self::resume) for a remembered user) signs in and runs the load
/// protocol; [`teardown`](Self::teardown) signs out and clears all session
/// state. Task actions return only validation errors: remote failures are
/// visible through [`sync_status`](Self::sync_status) alone.
pub struct AppState<R: TaskRemote> {
    session: Session,
    sync: SyncCoordinator<R>,
    user: Option<User>,
}

impl<R: TaskRemote> AppState<R> {
    pub fn new(store: LocalStore, remote: Option<R>) -> Self {
        AppState {
            session: Session::new(store.clone()),
            sync: SyncCoordinator::new(TaskCache::new(store), remote),
            user: None,
        }
    }

    /// Log in as `email` and load their tasks.
    pub async fn initialize(&mut self, email: &str) -> TaskCalResult<User> {
        let user = self.session.login(email)?;

        if self.user.is_some() {
            self.sync.teardown();
        }

        self.sync.load(&user.email).await;
        self.user = Some(user.clone());
        Ok(user)
    }

    /// Pick up the user remembered on this device, if any, and load their tasks.
    pub async fn resume(&mut self) -> Option<User> {
        let user = self.session.current_user()?;

        self.sync.load(&user.email).await;
        self.user = Some(user.clone());
        Some(user)
    }

    /// Log out: forget the remembered user and clear tasks and status.
    pub fn teardown(&mut self) -> TaskCalResult<()> {
        self.sync.teardown();
        self.user = None;
        self.session.logout()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// The user remembered on this device, without loading anything.
    pub fn remembered_user(&self) -> Option<User> {
        self.session.current_user()
    }

    pub fn has_remote(&self) -> bool {
        self.sync.has_remote()
    }

    pub fn remote(&self) -> Option<&R> {
        self.sync.remote()
    }

    fn user_email(&self) -> TaskCalResult<String> {
        self.user
            .as_ref()
            .map(|user| user.email.clone())
            .ok_or(TaskCalError::NotLoggedIn)
    }

    pub fn tasks(&self) -> TaskCollection {
        self.sync.tasks()
    }

    pub fn tasks_for(&self, date: &DateKey) -> Vec<Task> {
        self.sync.tasks().tasks_for(date).to_vec()
    }

    pub fn sync_state(&self) -> SyncState {
        self.sync.sync_state()
    }

    pub fn sync_status(&self) -> SyncStatus {
        self.sync.sync_state().status
    }

    pub fn is_syncing(&self) -> bool {
        self.sync.sync_state().is_syncing()
    }

    pub fn last_sync_time(&self) -> Option<DateTime<Utc>> {
        self.sync.sync_state().last_sync_time
    }

    pub fn subscribe_tasks(&self) -> watch::Receiver<TaskCollection> {
        self.sync.subscribe_tasks()
    }

    pub fn subscribe_sync_state(&self) -> watch::Receiver<SyncState> {
        self.sync.subscribe_state()
    }

    pub fn add_task(&mut self, date: DateKey, task: NewTask) -> TaskCalResult<Task> {
        let email = self.user_email()?;
        let task = task.into_task(Utc::now());

        let next = self.sync.tasks().with_added(date, task.clone());
        self.sync.commit(&email, next);
        Ok(task)
    }

    /// Remove the task at `index` (0-based) under `date` and return it.
    pub fn delete_task(&mut self, date: DateKey, index: usize) -> TaskCalResult<Task> {
        let email = self.user_email()?;

        let (next, removed) = self.sync.tasks().with_removed(&date, index)?;
        self.sync.commit(&email, next);
        self.sync.forget_remote(&email, date, removed.clone());
        Ok(removed)
    }

    /// Flip the task at `index` (0-based) under `date` between done and open.
    pub fn toggle_task(&mut self, date: DateKey, index: usize) -> TaskCalResult<Task> {
        let email = self.user_email()?;

        let next = self.sync.tasks().with_toggled(&date, index)?;
        let toggled = next.tasks_for(&date)[index].clone();
        self.sync.commit(&email, next);
        Ok(toggled)
    }

    /// Re-run the load protocol.
    pub async fn manual_sync(&mut self) -> TaskCalResult<SyncStatus> {
        let email = self.user_email()?;
        Ok(self.sync.load(&email).await)
    }

    /// Wait for background pushes started so far.
    pub async fn settle(&mut self) {
        self.sync.settle().await;
    }
}

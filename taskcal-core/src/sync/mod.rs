//! Local/remote task synchronization.
//!
//! Loading prefers the remote copy when it has any tasks. Saving always
//! writes the local cache first and then pushes local changes to the remote
//! store in the background, one task at a time.

mod coordinator;
mod plan;
mod push;

pub use coordinator::SyncCoordinator;
pub use plan::{PushKind, TaskPush, plan_push};
pub use push::{PushReport, apply_push, reconcile, remove_matching};

use std::fmt;

use chrono::{DateTime, Utc};

/// Whether the last remote interaction succeeded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncStatus {
    /// Nothing has reached the remote store this session (or none is configured).
    #[default]
    Local,
    Cloud,
    Error,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStatus::Local => write!(f, "local"),
            SyncStatus::Cloud => write!(f, "cloud"),
            SyncStatus::Error => write!(f, "error"),
        }
    }
}

/// Sync indicator state published to the UI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncState {
    pub status: SyncStatus,
    /// Remote operations currently running (load or background push).
    pub in_flight: usize,
    /// Most recent `updated_at` the remote store reported for the user.
    pub last_sync_time: Option<DateTime<Utc>>,
    // Bumped on teardown so work from a previous session cannot write here.
    epoch: u64,
}

impl SyncState {
    pub fn is_syncing(&self) -> bool {
        self.in_flight > 0
    }
}

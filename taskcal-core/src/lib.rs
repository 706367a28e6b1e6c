//! Core library for taskcal: per-day to-do tasks on a month calendar.
//!
//! - `date_key` / `task`: the day-keyed task model and month grid helpers
//! - `local`: the on-disk key-value store and per-user task cache
//! - `remote`: the hosted task table and the [`TaskRemote`] seam
//! - `sync`: load and save protocols between the two
//! - `app`: [`AppState`], the state a front end reads and drives

pub mod app;
pub mod config;
pub mod date_key;
pub mod error;
pub mod local;
pub mod remote;
pub mod session;
pub mod sync;
pub mod task;

pub use app::AppState;
pub use config::{RemoteConfig, TaskCalConfig};
pub use date_key::{DateKey, YearMonth};
pub use error::{RemoteError, RemoteErrorKind, TaskCalError, TaskCalResult};
pub use local::{LocalStore, TaskCache};
pub use remote::{PostgrestRemote, TaskRemote};
pub use session::{Session, User};
pub use sync::{SyncState, SyncStatus};
pub use task::{NewTask, Priority, Task, TaskCollection, TaskId};

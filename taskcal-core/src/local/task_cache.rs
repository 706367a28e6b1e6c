//! Per-user cache of the whole task collection.

use crate::error::{TaskCalError, TaskCalResult};
use crate::local::LocalStore;
use crate::task::TaskCollection;

/// Last-write-wins cache of each user's full task collection. It never
/// merges: `save` replaces whatever was stored.
#[derive(Debug, Clone)]
pub struct TaskCache {
    store: LocalStore,
}

impl TaskCache {
    pub fn new(store: LocalStore) -> Self {
        TaskCache { store }
    }

    fn key_for(user_email: &str) -> String {
        format!("tasks_{}", user_email)
    }

    /// Cached collection for the user. Missing, unreadable or malformed data
    /// all come back as an empty collection.
    pub fn load(&self, user_email: &str) -> TaskCollection {
        let key = Self::key_for(user_email);

        let content = match self.store.get(&key) {
            Ok(Some(content)) => content,
            Ok(None) => return TaskCollection::new(),
            Err(e) => {
                tracing::warn!(user = user_email, "could not read task cache: {e}");
                return TaskCollection::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(tasks) => tasks,
            Err(e) => {
                tracing::warn!(user = user_email, "discarding malformed task cache: {e}");
                TaskCollection::new()
            }
        }
    }

    pub fn save(&self, user_email: &str, tasks: &TaskCollection) -> TaskCalResult<()> {
        let content =
            serde_json::to_string(tasks).map_err(|e| TaskCalError::Serialization(e.to_string()))?;
        self.store.set(&Self::key_for(user_email), &content)
    }
}

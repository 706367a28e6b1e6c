//! Local durable storage.
//!
//! A directory of JSON text blobs addressed by exact string key, one file per
//! key. Writes go through a temp file and a rename so readers never observe a
//! partially written blob.

mod task_cache;

pub use task_cache::TaskCache;

use std::path::{Path, PathBuf};

use crate::error::TaskCalResult;

#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        LocalStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", escape_key(key)))
    }

    /// Read the blob stored under `key`, if any.
    pub fn get(&self, key: &str) -> TaskCalResult<Option<String>> {
        let path = self.path_for(key);

        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the blob stored under `key`.
    pub fn set(&self, key: &str, value: &str) -> TaskCalResult<()> {
        std::fs::create_dir_all(&self.dir)?;

        let path = self.path_for(key);
        let temp = path.with_extension("json.tmp");

        std::fs::write(&temp, value)?;
        std::fs::rename(&temp, &path)?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> TaskCalResult<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Turn a storage key into a file name. Every byte outside a small safe set
/// (including `%` itself) becomes `%XX`, so distinct keys map to distinct names.
fn escape_key(key: &str) -> String {
    let mut escaped = String::with_capacity(key.len());

    for byte in key.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'.' | b'_' | b'@' | b'-' => {
                escaped.push(byte as char)
            }
            _ => escaped.push_str(&format!("%{:02X}", byte)),
        }
    }

    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_get_set_remove() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("data"));

        assert_eq!(store.get("currentUser").unwrap(), None);

        store.set("currentUser", "{\"a\":1}").unwrap();
        assert_eq!(store.get("currentUser").unwrap().as_deref(), Some("{\"a\":1}"));

        store.set("currentUser", "{}").unwrap();
        assert_eq!(store.get("currentUser").unwrap().as_deref(), Some("{}"));

        store.remove("currentUser").unwrap();
        assert_eq!(store.get("currentUser").unwrap(), None);
        store.remove("currentUser").unwrap();
    }

    #[test]
    fn test_escaped_keys_do_not_collide() {
        let keys = [
            "tasks_a/b@x.io",
            "tasks_a%2Fb@x.io",
            "tasks_a\\b@x.io",
            "tasks_a:b@x.io",
            "tasks_a b@x.io",
            "tasks_ab@x.io",
        ];

        let names: std::collections::HashSet<_> = keys.iter().map(|k| escape_key(k)).collect();
        assert_eq!(names.len(), keys.len());
        assert!(names.iter().all(|n| !n.contains('/') && !n.contains('\\')));
    }

    #[test]
    fn test_plain_email_keys_stay_readable() {
        assert_eq!(escape_key("tasks_jane.doe@example.com"), "tasks_jane.doe@example.com");
        assert_eq!(escape_key("tasks_a+b@x.io"), "tasks_a%2Bb@x.io");
    }
}

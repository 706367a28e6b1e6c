//! Error types for taskcal.

use std::fmt;

use thiserror::Error;

/// Errors that can occur in taskcal operations.
#[derive(Error, Debug)]
pub enum TaskCalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Validation(String),

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Result type alias for taskcal operations.
pub type TaskCalResult<T> = Result<T, TaskCalError>;

/// Backend-neutral classification of a remote store failure.
///
/// The remote adapter decides the kind; nothing above it looks at
/// backend-specific status or error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// The table or resource does not exist. Reads treat this as "empty".
    NotFound,
    /// Network failure, timeout, rate limit or server-side error.
    Transient,
    /// The backend rejected the request payload.
    Validation,
    Unknown,
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteErrorKind::NotFound => write!(f, "not found"),
            RemoteErrorKind::Transient => write!(f, "unavailable"),
            RemoteErrorKind::Validation => write!(f, "rejected"),
            RemoteErrorKind::Unknown => write!(f, "failed"),
        }
    }
}

#[derive(Error, Debug, Clone)]
#[error("Remote store {kind}: {message}")]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    pub message: String,
}

impl RemoteError {
    pub fn new(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        RemoteError {
            kind,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == RemoteErrorKind::NotFound
    }
}

pub type RemoteResult<T> = Result<T, RemoteError>;

//! Device-local identity.
//!
//! A user is nothing more than a normalized email remembered on this device.
//! There is no password and no server-side verification, and the token is
//! derived from the email and the login time. It is a session label, **not**
//! a credential.

use std::sync::LazyLock;

use chrono::{DateTime, SubsecRound, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{TaskCalError, TaskCalResult};
use crate::local::LocalStore;

const CURRENT_USER_KEY: &str = "currentUser";

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub email: String,
    pub token: String,
    pub created_at: DateTime<Utc>,
}

/// Check an email as typed by the user and return its normalized form.
pub fn normalize_email(input: &str) -> TaskCalResult<String> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(TaskCalError::Validation("Enter an email".into()));
    }

    if !EMAIL_PATTERN.is_match(trimmed) {
        return Err(TaskCalError::Validation("Enter a valid email".into()));
    }

    Ok(trimmed.to_lowercase())
}

fn generate_token(email: &str, now: &DateTime<Utc>) -> String {
    let email_hex: String = email.bytes().map(|b| format!("{:02x}", b)).collect();
    format!("{}_{}", email_hex, now.timestamp_millis())
}

pub struct Session {
    store: LocalStore,
}

impl Session {
    pub fn new(store: LocalStore) -> Self {
        Session { store }
    }

    /// Validate and remember `email` as the current user.
    pub fn login(&self, email: &str) -> TaskCalResult<User> {
        let email = normalize_email(email)?;
        let now = Utc::now().trunc_subsecs(3);

        let user = User {
            token: generate_token(&email, &now),
            email,
            created_at: now,
        };

        let content = serde_json::to_string(&user)
            .map_err(|e| TaskCalError::Serialization(e.to_string()))?;
        self.store.set(CURRENT_USER_KEY, &content)?;

        tracing::debug!(user = %user.email, "logged in");
        Ok(user)
    }

    /// The remembered user, if any. A malformed record counts as logged out.
    pub fn current_user(&self) -> Option<User> {
        let content = match self.store.get(CURRENT_USER_KEY) {
            Ok(content) => content?,
            Err(e) => {
                tracing::warn!("could not read current user: {e}");
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!("ignoring malformed current user record: {e}");
                None
            }
        }
    }

    pub fn require_user(&self) -> TaskCalResult<User> {
        self.current_user().ok_or(TaskCalError::NotLoggedIn)
    }

    pub fn logout(&self) -> TaskCalResult<()> {
        self.store.remove(CURRENT_USER_KEY)
    }
}

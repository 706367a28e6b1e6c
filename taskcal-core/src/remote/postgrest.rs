//! PostgREST client for the hosted task table (Supabase and friends).

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::config::RemoteConfig;
use crate::date_key::DateKey;
use crate::error::{RemoteError, RemoteErrorKind, RemoteResult, TaskCalError, TaskCalResult};
use crate::remote::TaskRemote;
use crate::remote::row::{NewTaskRow, TaskRow, UpdatedAtRow, group_rows};
use crate::task::{Task, TaskCollection, TaskId};

/// Error body PostgREST sends with non-2xx responses.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Clone)]
pub struct PostgrestRemote {
    client: reqwest::Client,
    endpoint: String,
    anon_key: String,
}

impl PostgrestRemote {
    pub fn new(config: &RemoteConfig) -> TaskCalResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TaskCalError::Config(format!("Could not build HTTP client: {e}")))?;

        let endpoint = format!(
            "{}/rest/v1/{}",
            config.url.trim_end_matches('/'),
            config.table
        );

        Ok(PostgrestRemote {
            client,
            endpoint,
            anon_key: config.anon_key.clone(),
        })
    }

    fn request(&self, method: Method) -> RequestBuilder {
        self.client
            .request(method, &self.endpoint)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    fn fetch_request(&self, user_email: &str) -> RequestBuilder {
        let user_filter = format!("eq.{user_email}");
        self.request(Method::GET).query(&[
            ("select", "*"),
            ("user_email", user_filter.as_str()),
            ("order", "created_at.asc"),
        ])
    }

    fn insert_request(&self, user_email: &str, date: &DateKey, task: &Task) -> RequestBuilder {
        self.request(Method::POST)
            .header("Prefer", "return=representation")
            .json(&[NewTaskRow::new(user_email, date, task)])
    }

    fn set_completed_request(&self, id: &TaskId, completed: bool) -> RequestBuilder {
        self.request(Method::PATCH)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(&serde_json::json!({ "completed": completed }))
    }

    fn delete_request(&self, id: &TaskId) -> RequestBuilder {
        self.request(Method::DELETE)
            .query(&[("id", format!("eq.{id}"))])
    }

    fn last_updated_request(&self, user_email: &str) -> RequestBuilder {
        let user_filter = format!("eq.{user_email}");
        self.request(Method::GET).query(&[
            ("select", "updated_at"),
            ("user_email", user_filter.as_str()),
            ("order", "updated_at.desc"),
            ("limit", "1"),
        ])
    }

    async fn send(&self, request: RequestBuilder) -> RemoteResult<reqwest::Response> {
        let response = request.send().await.map_err(classify_transport)?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_response(status, &body))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> RemoteResult<T> {
        self.send(request)
            .await?
            .json()
            .await
            .map_err(|e| RemoteError::new(RemoteErrorKind::Unknown, format!("bad response: {e}")))
    }
}

impl TaskRemote for PostgrestRemote {
    async fn fetch_tasks(&self, user_email: &str) -> RemoteResult<TaskCollection> {
        let rows: Vec<TaskRow> = self.send_json(self.fetch_request(user_email)).await?;
        Ok(group_rows(rows))
    }

    async fn insert_task(&self, user_email: &str, date: &DateKey, task: &Task) -> RemoteResult<Task> {
        let rows: Vec<TaskRow> = self
            .send_json(self.insert_request(user_email, date, task))
            .await?;

        first_task(rows, "insert returned no row")
    }

    async fn set_completed(&self, id: &TaskId, completed: bool) -> RemoteResult<Task> {
        let rows: Vec<TaskRow> = self
            .send_json(self.set_completed_request(id, completed))
            .await?;

        first_task(rows, "no row with that id")
    }

    async fn delete_task(&self, id: &TaskId) -> RemoteResult<()> {
        self.send(self.delete_request(id)).await?;
        Ok(())
    }

    async fn last_updated_at(&self, user_email: &str) -> RemoteResult<Option<DateTime<Utc>>> {
        let rows: Vec<UpdatedAtRow> = self.send_json(self.last_updated_request(user_email)).await?;
        Ok(rows.into_iter().next().and_then(|row| row.updated_at))
    }

    async fn check_connection(&self) -> RemoteResult<()> {
        let _: Vec<serde_json::Value> = self
            .send_json(self.request(Method::GET).query(&[("select", "id"), ("limit", "1")]))
            .await?;
        Ok(())
    }
}

fn first_task(rows: Vec<TaskRow>, missing: &str) -> RemoteResult<Task> {
    let row = rows
        .into_iter()
        .next()
        .ok_or_else(|| RemoteError::new(RemoteErrorKind::NotFound, missing))?;

    row.into_task()
        .map(|(_, task)| task)
        .ok_or_else(|| RemoteError::new(RemoteErrorKind::Unknown, "row has an invalid date"))
}

fn classify_transport(e: reqwest::Error) -> RemoteError {
    let kind = if e.is_timeout() || e.is_connect() || e.is_request() {
        RemoteErrorKind::Transient
    } else {
        RemoteErrorKind::Unknown
    };
    RemoteError::new(kind, e.to_string())
}

/// Map an HTTP failure to a [`RemoteErrorKind`]. PostgREST error codes are
/// Postgres SQLSTATEs (`42P01` undefined table) or its own `PGRSTxxx` codes.
fn classify_response(status: StatusCode, body: &str) -> RemoteError {
    let error: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let code = error.code.as_deref().unwrap_or("");

    let kind = if code == "42P01" || code == "PGRST205" || status == StatusCode::NOT_FOUND {
        RemoteErrorKind::NotFound
    } else if status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
    {
        RemoteErrorKind::Transient
    } else if code.starts_with("22")
        || code.starts_with("23")
        || matches!(
            status,
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY
        )
    {
        RemoteErrorKind::Validation
    } else {
        RemoteErrorKind::Unknown
    };

    let message = match (error.message, code) {
        (Some(message), "") => message,
        (Some(message), code) => format!("{message} ({code})"),
        (None, _) if body.is_empty() => status.to_string(),
        (None, _) => body.to_string(),
    };

    RemoteError::new(kind, message)
}

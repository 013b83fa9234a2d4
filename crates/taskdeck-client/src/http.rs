//! JSON-over-HTTP backend.
//!
//! Every action is a `POST` of a [`Request`] body to a single endpoint. The
//! response is a [`ResponseEnvelope`]; `success: false` becomes
//! [`BackendError::Rejected`]. Requests are never retried.

use std::fmt;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use taskdeck_core::{Tag, Task, TaskId};
use time::OffsetDateTime;
use tracing::{debug, warn};
use url::Url;

use crate::TaskBackend;
use crate::error::BackendError;
use crate::wire::{Request, ResponseEnvelope, TaskPayload};

/// Default timeout applied to each request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Backend reached through a single HTTP endpoint.
#[derive(Clone)]
pub struct HttpBackend {
    endpoint: Url,
    http: Client,
    token: Option<String>,
}

impl fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpBackend")
            .field("endpoint", &self.endpoint.as_str())
            .field("has_token", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

impl HttpBackend {
    /// Create a backend for `endpoint` with the given request timeout.
    ///
    /// # Errors
    /// Returns [`BackendError::InvalidEndpoint`] when the URL does not parse or
    /// is not `http`/`https`, and [`BackendError::Network`] when the HTTP client
    /// cannot be built.
    pub fn new(endpoint: impl AsRef<str>, timeout: Duration) -> Result<Self, BackendError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(format!("taskdeck/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| BackendError::Network(format!("Failed to create HTTP client: {err}")))?;
        Self::with_http_client(endpoint, http)
    }

    /// Create a backend around a preconfigured client.
    ///
    /// # Errors
    /// Returns [`BackendError::InvalidEndpoint`] when the URL is unusable.
    pub fn with_http_client(endpoint: impl AsRef<str>, http: Client) -> Result<Self, BackendError> {
        let endpoint = parse_endpoint(endpoint.as_ref())?;
        Ok(Self {
            endpoint,
            http,
            token: None,
        })
    }

    /// Send `Authorization: Bearer <token>` with every request.
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Endpoint URL.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn call(&self, request: &Request<'_>) -> Result<ResponseEnvelope, BackendError> {
        let action = request.action();
        debug!(action, endpoint = %self.endpoint, "Sending backend request");

        let mut builder = self.http.post(self.endpoint.clone()).json(request);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|err| {
            warn!(action, error = %err, "Backend request failed");
            BackendError::from(err)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(action, status = status.as_u16(), "Backend answered with error status");
            return Err(BackendError::Status(status.as_u16()));
        }

        let body: Value = response.json().await.map_err(|err| {
            warn!(action, error = %err, "Backend response is not JSON");
            BackendError::Decode(err.to_string())
        })?;

        let envelope = ResponseEnvelope::from_value(body)?.into_result();
        if let Err(err) = &envelope {
            warn!(action, error = %err, "Backend rejected request");
        }
        envelope
    }
}

impl TaskBackend for HttpBackend {
    async fn get_tasks(&self) -> Result<Vec<Task>, BackendError> {
        let envelope = self.call(&Request::GetTasks).await?;
        let tasks = envelope.tasks(OffsetDateTime::now_utc());
        debug!(count = tasks.len(), "Fetched tasks");
        Ok(tasks)
    }

    async fn get_tags(&self) -> Result<Vec<Tag>, BackendError> {
        let envelope = self.call(&Request::GetTags).await?;
        let tags = envelope.tags();
        debug!(count = tags.len(), "Fetched tags");
        Ok(tags)
    }

    async fn add_task(&self, task: &Task) -> Result<(), BackendError> {
        self.call(&Request::AddTask(TaskPayload::insert(task)))
            .await
            .map(drop)
    }

    async fn update_task(&self, task: &Task) -> Result<(), BackendError> {
        self.call(&Request::UpdateTask(TaskPayload::replace(task)))
            .await
            .map(drop)
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), BackendError> {
        self.call(&Request::DeleteTask { id }).await.map(drop)
    }

    async fn add_tag(&self, tag: &Tag) -> Result<(), BackendError> {
        self.call(&Request::AddTag {
            name: &tag.name,
            color: tag.color,
        })
        .await
        .map(drop)
    }

    async fn delete_tag(&self, name: &str) -> Result<(), BackendError> {
        self.call(&Request::DeleteTag { name }).await.map(drop)
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, BackendError> {
    let url = Url::parse(raw.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(BackendError::InvalidEndpoint(format!(
            "unsupported scheme '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unusable_endpoints() {
        assert!(matches!(
            HttpBackend::new("not a url", DEFAULT_TIMEOUT),
            Err(BackendError::InvalidEndpoint(_))
        ));
        assert!(matches!(
            HttpBackend::new("ftp://example.com/api", DEFAULT_TIMEOUT),
            Err(BackendError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn debug_output_hides_token() {
        let backend = HttpBackend::new("https://tasks.example.com/api.php", DEFAULT_TIMEOUT)
            .unwrap_or_else(|err| panic!("backend must build: {err}"))
            .with_bearer_token("secret-token");
        let rendered = format!("{backend:?}");
        assert!(rendered.contains("tasks.example.com"));
        assert!(!rendered.contains("secret-token"));
        assert_eq!(backend.endpoint().path(), "/api.php");
    }
}

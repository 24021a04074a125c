//! REST task store client.
//!
//! Talks to the task store over HTTP with `reqwest`, using the route table
//! from [`taskdeck_proto::routes`]. Any transport failure, non-2xx status, or
//! undecodable body becomes a [`StoreError`].

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use taskdeck_proto::codec;
use taskdeck_proto::routes::{Method, Route};
use taskdeck_proto::task::{Task, TaskFields, TaskId};
use url::Url;

use super::{StoreError, TaskStore};

/// HTTP-backed [`TaskStore`].
#[derive(Debug, Clone)]
pub struct HttpTaskStore {
    client: reqwest::Client,
    /// Base URL without a trailing slash; route paths are appended to it.
    base_url: String,
}

impl HttpTaskStore {
    /// Creates a client for the store at `base_url` (e.g.
    /// `http://localhost:5000`). Every request is bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidUrl`] if `base_url` does not parse, or
    /// [`StoreError::Client`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let parsed = Url::parse(base_url)?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(StoreError::Client)?;
        Ok(Self {
            client,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// Full URL for a route.
    #[must_use]
    pub fn url_for(&self, route: Route) -> String {
        format!("{}{}", self.base_url, route.path())
    }

    /// Sends one request and returns the response body on 2xx.
    async fn send(&self, route: Route, body: Option<Vec<u8>>) -> Result<Vec<u8>, StoreError> {
        let method = match route.method() {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut request = self.client.request(method, self.url_for(route));
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        tracing::debug!(route = %route, "task store request");
        let response = request
            .send()
            .await
            .map_err(|source| StoreError::Transport { route, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Status {
                route,
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| StoreError::Transport { route, source })?;
        Ok(bytes.to_vec())
    }
}

impl TaskStore for HttpTaskStore {
    async fn list(&self) -> Result<Vec<Task>, StoreError> {
        let route = Route::List;
        let body = self.send(route, None).await?;
        codec::decode_task_list(&body).map_err(|source| StoreError::Codec { route, source })
    }

    async fn get(&self, id: TaskId) -> Result<Task, StoreError> {
        let route = Route::Get(id);
        let body = self.send(route, None).await?;
        codec::decode_task(&body).map_err(|source| StoreError::Codec { route, source })
    }

    async fn create(&self, fields: &TaskFields) -> Result<(), StoreError> {
        let route = Route::Create;
        let body = codec::encode(fields).map_err(|source| StoreError::Codec { route, source })?;
        self.send(route, Some(body)).await.map(drop)
    }

    async fn update(&self, id: TaskId, task: &Task) -> Result<(), StoreError> {
        let route = Route::Update(id);
        let body = codec::encode(task).map_err(|source| StoreError::Codec { route, source })?;
        self.send(route, Some(body)).await.map(drop)
    }

    async fn delete(&self, id: TaskId) -> Result<(), StoreError> {
        self.send(Route::Delete(id), None).await.map(drop)
    }

    fn endpoint(&self) -> String {
        self.base_url.clone()
    }
}

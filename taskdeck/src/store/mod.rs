//! Task store port for Taskdeck.
//!
//! Defines the [`TaskStore`] trait the synchronizer talks to.
//! Concrete implementations:
//! - [`http::HttpTaskStore`]: the remote REST task store
//! - [`memory::MemoryTaskStore`]: in-process store for offline demo mode and tests

pub mod http;
pub mod memory;

use taskdeck_proto::codec::CodecError;
use taskdeck_proto::routes::Route;
use taskdeck_proto::task::{Task, TaskFields, TaskId};

/// Errors that can occur while talking to a task store.
///
/// Callers never branch on the variant: every one of them means the request
/// failed. The variants only carry detail for logs.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The request never produced a response (connect, timeout, I/O).
    #[error("{route} failed: {source}")]
    Transport {
        /// Route that was attempted.
        route: Route,
        /// Underlying client error.
        source: reqwest::Error,
    },

    /// The store answered with a non-2xx status.
    #[error("{route} returned status {status}")]
    Status {
        /// Route that was attempted.
        route: Route,
        /// HTTP status code.
        status: u16,
    },

    /// The request or response body could not be (de)serialized.
    #[error("{route} body error: {source}")]
    Codec {
        /// Route that was attempted.
        route: Route,
        /// Underlying codec error.
        source: CodecError,
    },

    /// The configured base URL is not a valid absolute URL.
    #[error("invalid task store url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be constructed.
    #[error("failed to build http client: {0}")]
    Client(reqwest::Error),

    /// A failure injected into the in-memory store.
    #[error("{0} failed (injected)")]
    Injected(Route),
}

impl StoreError {
    /// The route that failed, if the error is tied to one.
    #[must_use]
    pub const fn route(&self) -> Option<Route> {
        match self {
            Self::Transport { route, .. }
            | Self::Status { route, .. }
            | Self::Codec { route, .. }
            | Self::Injected(route) => Some(*route),
            Self::InvalidUrl(_) | Self::Client(_) => None,
        }
    }
}

/// Async CRUD access to the task store, keyed by [`TaskId`].
///
/// Responses to create, update and delete are not interpreted beyond
/// success; the synchronizer re-fetches the full list afterwards.
pub trait TaskStore: Send + Sync {
    /// Fetch every task.
    fn list(&self) -> impl std::future::Future<Output = Result<Vec<Task>, StoreError>> + Send;

    /// Fetch a single task.
    fn get(
        &self,
        id: TaskId,
    ) -> impl std::future::Future<Output = Result<Task, StoreError>> + Send;

    /// Create a task. The store assigns the identifier.
    fn create(
        &self,
        fields: &TaskFields,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Replace the task stored under `id` with `task`.
    fn update(
        &self,
        id: TaskId,
        task: &Task,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Delete the task stored under `id`.
    fn delete(&self, id: TaskId)
    -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Human-readable location of the store, shown in the status bar.
    fn endpoint(&self) -> String;
}

//! In-process task store.
//!
//! Backs the offline demo mode and the test suites. Clones share the same
//! underlying state, so a test can hand one handle to the synchronizer and
//! keep another to inject failures and inspect the calls that were made.
//! The demo store keeps no call log.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use taskdeck_proto::routes::Route;
use taskdeck_proto::task::{Priority, Status, Task, TaskFields, TaskId};

use super::{StoreError, TaskStore};

/// Store operation kinds, used to select which calls fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// [`TaskStore::list`]
    List,
    /// [`TaskStore::get`]
    Get,
    /// [`TaskStore::create`]
    Create,
    /// [`TaskStore::update`]
    Update,
    /// [`TaskStore::delete`]
    Delete,
}

/// A call received by the store, with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    /// `list()`
    List,
    /// `get(id)`
    Get(TaskId),
    /// `create(fields)`
    Create(TaskFields),
    /// `update(id, task)`
    Update(TaskId, Task),
    /// `delete(id)`
    Delete(TaskId),
}

#[derive(Debug, Default)]
struct Inner {
    tasks: Vec<Task>,
    next_id: i64,
    failing: HashSet<Operation>,
    recording: bool,
    calls: Vec<StoreCall>,
}

/// [`TaskStore`] holding tasks in memory.
///
/// Unknown identifiers answer like a REST store would: status 404.
#[derive(Debug, Clone, Default)]
pub struct MemoryTaskStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryTaskStore {
    /// Creates an empty store. The first created task gets id 1.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tasks(Vec::new())
    }

    /// Creates a store pre-populated with `tasks`, recording every call.
    /// New identifiers continue after the largest one present.
    #[must_use]
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let next_id = tasks
            .iter()
            .map(|t| t.id.get())
            .max()
            .map_or(1, |max| max.saturating_add(1));
        Self {
            inner: Arc::new(Mutex::new(Inner {
                tasks,
                next_id,
                recording: true,
                ..Inner::default()
            })),
        }
    }

    /// A store seeded with a handful of sample tasks for offline mode.
    #[must_use]
    pub fn demo() -> Self {
        let samples = [
            (
                "Set up project board",
                "Columns for backlog and review",
                Priority::Medium,
                Status::Completed,
            ),
            (
                "Fix login redirect",
                "Users land on a blank page after SSO",
                Priority::High,
                Status::Pending,
            ),
            ("Write release notes", "", Priority::Low, Status::Pending),
            (
                "Review pull requests",
                "Two open on the API repo",
                Priority::High,
                Status::Completed,
            ),
            (
                "Update dependencies",
                "Bump the HTTP client",
                Priority::Medium,
                Status::Pending,
            ),
        ];
        let tasks = samples
            .into_iter()
            .zip(1_i64..)
            .map(|((title, description, priority, status), id)| Task {
                id: TaskId::new(id),
                title: title.to_string(),
                description: description.to_string(),
                priority,
                status,
            })
            .collect();
        let store = Self::with_tasks(tasks);
        store.record_calls(false);
        store
    }

    /// Turns the call log on or off. Turning it off also clears it.
    pub fn record_calls(&self, on: bool) {
        let mut inner = self.inner.lock();
        inner.recording = on;
        if !on {
            inner.calls.clear();
        }
    }

    /// Makes every subsequent call of the given kind fail (or succeed again).
    pub fn set_failing(&self, op: Operation, failing: bool) {
        let mut inner = self.inner.lock();
        if failing {
            inner.failing.insert(op);
        } else {
            inner.failing.remove(&op);
        }
    }

    /// Every call received while recording, oldest first. Failed calls are
    /// included.
    #[must_use]
    pub fn calls(&self) -> Vec<StoreCall> {
        self.inner.lock().calls.clone()
    }

    /// Forgets the recorded calls.
    pub fn clear_calls(&self) {
        self.inner.lock().calls.clear();
    }

    /// Current contents of the store.
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        self.inner.lock().tasks.clone()
    }

    /// Records `call` and returns an error if `op` is set to fail.
    fn admit(
        inner: &mut Inner,
        op: Operation,
        route: Route,
        call: impl FnOnce() -> StoreCall,
    ) -> Result<(), StoreError> {
        if inner.recording {
            inner.calls.push(call());
        }
        if inner.failing.contains(&op) {
            return Err(StoreError::Injected(route));
        }
        Ok(())
    }

    fn position(inner: &Inner, route: Route, id: TaskId) -> Result<usize, StoreError> {
        inner
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::Status { route, status: 404 })
    }
}

impl TaskStore for MemoryTaskStore {
    async fn list(&self) -> Result<Vec<Task>, StoreError> {
        let mut inner = self.inner.lock();
        Self::admit(&mut inner, Operation::List, Route::List, || StoreCall::List)?;
        Ok(inner.tasks.clone())
    }

    async fn get(&self, id: TaskId) -> Result<Task, StoreError> {
        let route = Route::Get(id);
        let mut inner = self.inner.lock();
        Self::admit(&mut inner, Operation::Get, route, || StoreCall::Get(id))?;
        let idx = Self::position(&inner, route, id)?;
        Ok(inner.tasks[idx].clone())
    }

    async fn create(&self, fields: &TaskFields) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        Self::admit(
            &mut inner,
            Operation::Create,
            Route::Create,
            || StoreCall::Create(fields.clone()),
        )?;
        let id = TaskId::new(inner.next_id);
        inner.next_id = inner.next_id.saturating_add(1);
        inner.tasks.push(fields.clone().with_id(id));
        Ok(())
    }

    async fn update(&self, id: TaskId, task: &Task) -> Result<(), StoreError> {
        let route = Route::Update(id);
        let mut inner = self.inner.lock();
        Self::admit(
            &mut inner,
            Operation::Update,
            route,
            || StoreCall::Update(id, task.clone()),
        )?;
        let idx = Self::position(&inner, route, id)?;
        inner.tasks[idx] = task.fields().with_id(id);
        Ok(())
    }

    async fn delete(&self, id: TaskId) -> Result<(), StoreError> {
        let route = Route::Delete(id);
        let mut inner = self.inner.lock();
        Self::admit(&mut inner, Operation::Delete, route, || StoreCall::Delete(id))?;
        let idx = Self::position(&inner, route, id)?;
        inner.tasks.remove(idx);
        Ok(())
    }

    fn endpoint(&self) -> String {
        "in-memory (offline)".to_string()
    }
}

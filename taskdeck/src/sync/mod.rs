//! View-state synchronizer.
//!
//! [`Synchronizer`] owns the canonical task list, the view selection, the
//! editor draft, and the error/loading flags. Every write goes through the
//! [`TaskStore`]; after a successful mutation the whole list is re-fetched,
//! so the canonical list is only ever replaced wholesale.
//!
//! Store failures never escape an operation. Each one is logged and turned
//! into a single user-facing message that replaces whatever was shown before.

pub mod view;

pub use view::{Filter, SelectionParseError, SortKey, ViewSelection, derive_view};

use chrono::{DateTime, Local};
use taskdeck_proto::task::{Task, TaskFields, TaskId};
use tokio::sync::watch;

use crate::store::TaskStore;

/// Shown when the task list cannot be fetched.
pub const FETCH_TASKS_FAILED: &str = "Failed to fetch tasks. Please try again later.";

/// Shown when a single task cannot be fetched for editing.
pub const FETCH_TASK_FAILED: &str = "Failed to fetch task details. Please try again.";

/// Shown when a create or update from the editor fails.
pub const SAVE_TASK_FAILED: &str = "Failed to save task. Please try again.";

/// Shown when a delete fails.
pub const DELETE_TASK_FAILED: &str = "Failed to delete task. Please try again.";

/// Shown when a status toggle fails.
pub const TOGGLE_STATUS_FAILED: &str = "Failed to update task status. Please try again.";

/// The task being edited: either a new one or a copy of a stored one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Draft {
    /// Not yet in the store; submitting creates it.
    New(TaskFields),
    /// Copy of the stored task with this identifier; submitting updates it.
    Editing(TaskId, TaskFields),
}

impl Draft {
    /// The editable fields.
    #[must_use]
    pub const fn fields(&self) -> &TaskFields {
        match self {
            Self::New(fields) | Self::Editing(_, fields) => fields,
        }
    }

    /// Mutable access to the editable fields.
    pub fn fields_mut(&mut self) -> &mut TaskFields {
        match self {
            Self::New(fields) | Self::Editing(_, fields) => fields,
        }
    }

    /// Identifier of the task being edited, `None` for a new task.
    #[must_use]
    pub const fn id(&self) -> Option<TaskId> {
        match self {
            Self::New(_) => None,
            Self::Editing(id, _) => Some(*id),
        }
    }
}

impl Default for Draft {
    /// The new-task template.
    fn default() -> Self {
        Self::New(TaskFields::default())
    }
}

/// Visibility of the create/edit form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorState {
    /// Form hidden.
    #[default]
    Closed,
    /// Form shown, editing the current draft.
    Open,
}

/// Owned copy of the synchronizer's observable state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SyncSnapshot {
    /// Canonical task list, in store order.
    pub tasks: Vec<Task>,
    /// Active filter and sort key.
    pub selection: ViewSelection,
    /// Current draft.
    pub draft: Draft,
    /// Whether the form is shown.
    pub editor: EditorState,
    /// Bumped every time the editor opens. Tells a reader that only sees the
    /// latest snapshot that the form was reopened in between.
    pub editor_generation: u64,
    /// Message for the error banner.
    pub error: Option<String>,
    /// A refresh is in flight.
    pub loading: bool,
    /// When the list was last fetched successfully.
    pub refreshed_at: Option<DateTime<Local>>,
}

impl SyncSnapshot {
    /// The displayed list under the snapshot's own selection.
    #[must_use]
    pub fn view(&self) -> Vec<&Task> {
        derive_view(&self.tasks, self.selection)
    }
}

/// Keeps the local task list consistent with a [`TaskStore`].
///
/// Operations take `&mut self`, so at most one runs at a time. After every
/// state change a [`SyncSnapshot`] is published to subscribers.
pub struct Synchronizer<S> {
    store: S,
    tasks: Vec<Task>,
    selection: ViewSelection,
    draft: Draft,
    editor: EditorState,
    editor_generation: u64,
    error: Option<String>,
    loading: bool,
    refreshed_at: Option<DateTime<Local>>,
    publisher: watch::Sender<SyncSnapshot>,
}

impl<S: TaskStore> Synchronizer<S> {
    /// Creates a synchronizer with an empty list and default selection.
    /// Nothing is fetched until [`refresh`](Self::refresh) is called.
    pub fn new(store: S) -> Self {
        let (publisher, _) = watch::channel(SyncSnapshot::default());
        Self {
            store,
            tasks: Vec::new(),
            selection: ViewSelection::default(),
            draft: Draft::default(),
            editor: EditorState::Closed,
            editor_generation: 0,
            error: None,
            loading: false,
            refreshed_at: None,
            publisher,
        }
    }

    /// Starts from `selection` instead of the default.
    #[must_use]
    pub fn with_selection(mut self, selection: ViewSelection) -> Self {
        self.selection = selection;
        self.publish();
        self
    }

    /// Receiver that sees a fresh [`SyncSnapshot`] after every change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SyncSnapshot> {
        self.publisher.subscribe()
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    // ---------------------------------------------------------------------
    // Operations
    // ---------------------------------------------------------------------

    /// Replaces the canonical list with the store's current list.
    ///
    /// On failure the previous list is kept and the fetch error is shown.
    pub async fn refresh(&mut self) {
        self.loading = true;
        self.publish();

        match self.store.list().await {
            Ok(tasks) => {
                tracing::debug!(count = tasks.len(), "task list refreshed");
                self.tasks = tasks;
                self.error = None;
                self.refreshed_at = Some(Local::now());
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch tasks");
                self.error = Some(FETCH_TASKS_FAILED.to_string());
            }
        }

        self.loading = false;
        self.publish();
    }

    /// Resets the draft to the new-task template and opens the editor.
    pub fn begin_create(&mut self) {
        self.draft = Draft::default();
        self.open_editor();
        self.publish();
    }

    /// Loads task `id` from the store into the draft and opens the editor.
    ///
    /// On failure the editor stays closed and the draft is untouched.
    pub async fn begin_edit(&mut self, id: TaskId) {
        match self.store.get(id).await {
            Ok(task) => {
                self.draft = Draft::Editing(task.id, task.fields());
                self.open_editor();
                self.error = None;
            }
            Err(e) => {
                tracing::warn!(task_id = %id, error = %e, "failed to fetch task details");
                self.error = Some(FETCH_TASK_FAILED.to_string());
            }
        }
        self.publish();
    }

    /// Saves `draft`: a create for [`Draft::New`], an update for
    /// [`Draft::Editing`].
    ///
    /// A draft whose title is empty or whitespace-only is ignored without
    /// contacting the store. On success the editor closes, the draft resets,
    /// and the list is re-fetched. On failure the editor stays open holding
    /// `draft`.
    pub async fn submit(&mut self, draft: Draft) {
        if !draft.fields().has_title() {
            tracing::debug!("ignoring submit with blank title");
            return;
        }

        let result = match &draft {
            Draft::New(fields) => self.store.create(fields).await,
            Draft::Editing(id, fields) => {
                let task = fields.clone().with_id(*id);
                self.store.update(*id, &task).await
            }
        };

        match result {
            Ok(()) => {
                tracing::info!(task_id = ?draft.id(), "task saved");
                self.editor = EditorState::Closed;
                self.draft = Draft::default();
                self.error = None;
                self.publish();
                self.refresh().await;
            }
            Err(e) => {
                tracing::warn!(task_id = ?draft.id(), error = %e, "failed to save task");
                self.draft = draft;
                self.error = Some(SAVE_TASK_FAILED.to_string());
                self.publish();
            }
        }
    }

    /// Closes the editor without saving and discards the draft.
    pub fn cancel(&mut self) {
        self.editor = EditorState::Closed;
        self.draft = Draft::default();
        self.publish();
    }

    /// Deletes task `id`, then re-fetches the list.
    ///
    /// On failure nothing is re-fetched and the list is unchanged.
    pub async fn remove(&mut self, id: TaskId) {
        match self.store.delete(id).await {
            Ok(()) => {
                tracing::info!(task_id = %id, "task deleted");
                self.error = None;
                self.publish();
                self.refresh().await;
            }
            Err(e) => {
                tracing::warn!(task_id = %id, error = %e, "failed to delete task");
                self.error = Some(DELETE_TASK_FAILED.to_string());
                self.publish();
            }
        }
    }

    /// Flips the status of task `id` (`Pending ↔ Completed`) in the store,
    /// sending every other field unchanged, then re-fetches the list.
    ///
    /// Does nothing if `id` is not in the canonical list.
    pub async fn toggle_status(&mut self, id: TaskId) {
        let Some(task) = self.tasks.iter().find(|t| t.id == id) else {
            tracing::debug!(task_id = %id, "toggle for unknown task ignored");
            return;
        };
        let updated = task.with_status(task.status.toggled());

        match self.store.update(id, &updated).await {
            Ok(()) => {
                tracing::info!(task_id = %id, status = %updated.status, "task status updated");
                self.error = None;
                self.publish();
                self.refresh().await;
            }
            Err(e) => {
                tracing::warn!(task_id = %id, error = %e, "failed to update task status");
                self.error = Some(TOGGLE_STATUS_FAILED.to_string());
                self.publish();
            }
        }
    }

    /// Replaces the filter half of the selection.
    pub fn set_filter(&mut self, filter: Filter) {
        self.selection.filter = filter;
        self.publish();
    }

    /// Replaces the sort half of the selection.
    pub fn set_sort_key(&mut self, sort_key: SortKey) {
        self.selection.sort_key = sort_key;
        self.publish();
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// The canonical list under `selection`. Pure: repeated calls return the
    /// same sequence.
    #[must_use]
    pub fn derived_view(&self, selection: ViewSelection) -> Vec<&Task> {
        derive_view(&self.tasks, selection)
    }

    /// Canonical task list, in store order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Active selection.
    #[must_use]
    pub const fn selection(&self) -> ViewSelection {
        self.selection
    }

    /// Current draft.
    #[must_use]
    pub const fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Editor visibility.
    #[must_use]
    pub const fn editor(&self) -> EditorState {
        self.editor
    }

    /// Message for the error banner, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether a refresh is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Owned copy of the observable state.
    #[must_use]
    pub fn snapshot(&self) -> SyncSnapshot {
        SyncSnapshot {
            tasks: self.tasks.clone(),
            selection: self.selection,
            draft: self.draft.clone(),
            editor: self.editor,
            editor_generation: self.editor_generation,
            error: self.error.clone(),
            loading: self.loading,
            refreshed_at: self.refreshed_at,
        }
    }

    fn open_editor(&mut self) {
        self.editor = EditorState::Open;
        self.editor_generation = self.editor_generation.wrapping_add(1);
    }

    fn publish(&self) {
        self.publisher.send_replace(self.snapshot());
    }
}

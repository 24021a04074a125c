//! Integration tests for the view-state synchronizer.
//!
//! Drives `Synchronizer` through its public operations against an
//! in-memory store, and against a store whose deletes go to a closed port
//! to get a genuine transport failure.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::similar_names,
    clippy::redundant_clone
)]

use std::time::Duration;

use taskdeck::store::http::HttpTaskStore;
use taskdeck::store::memory::{MemoryTaskStore, Operation, StoreCall};
use taskdeck::store::{StoreError, TaskStore};
use taskdeck::sync::{
    DELETE_TASK_FAILED, Draft, EditorState, FETCH_TASK_FAILED, FETCH_TASKS_FAILED, Filter,
    SAVE_TASK_FAILED, SortKey, Synchronizer, TOGGLE_STATUS_FAILED, ViewSelection,
};
use taskdeck_proto::task::{Priority, Status, Task, TaskFields, TaskId};

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

fn make_task(id: i64, title: &str, priority: Priority, status: Status) -> Task {
    Task {
        id: TaskId::new(id),
        title: title.to_string(),
        description: String::new(),
        priority,
        status,
    }
}

/// Store holding `[{1, A, High, Pending}, {2, B, Low, Pending}]`.
fn two_task_store() -> MemoryTaskStore {
    MemoryTaskStore::with_tasks(vec![
        make_task(1, "A", Priority::High, Status::Pending),
        make_task(2, "B", Priority::Low, Status::Pending),
    ])
}

/// Synchronizer over `store` that has completed its first refresh, with the
/// call log cleared.
async fn loaded(store: &MemoryTaskStore) -> Synchronizer<MemoryTaskStore> {
    let mut sync = Synchronizer::new(store.clone());
    sync.refresh().await;
    store.clear_calls();
    sync
}

fn ids(view: &[&Task]) -> Vec<i64> {
    view.iter().map(|t| t.id.get()).collect()
}

/// A base URL nothing is listening on.
fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Reads go to memory, deletes go to a closed port.
struct UnreachableDeletes {
    memory: MemoryTaskStore,
    dead: HttpTaskStore,
}

impl TaskStore for UnreachableDeletes {
    async fn list(&self) -> Result<Vec<Task>, StoreError> {
        self.memory.list().await
    }

    async fn get(&self, id: TaskId) -> Result<Task, StoreError> {
        self.memory.get(id).await
    }

    async fn create(&self, fields: &TaskFields) -> Result<(), StoreError> {
        self.memory.create(fields).await
    }

    async fn update(&self, id: TaskId, task: &Task) -> Result<(), StoreError> {
        self.memory.update(id, task).await
    }

    async fn delete(&self, id: TaskId) -> Result<(), StoreError> {
        self.dead.delete(id).await
    }

    fn endpoint(&self) -> String {
        self.dead.endpoint()
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn toggle_status_sends_full_task_then_refreshes() {
    let store = two_task_store();
    let mut sync = loaded(&store).await;

    sync.toggle_status(TaskId::new(1)).await;

    let expected = make_task(1, "A", Priority::High, Status::Completed);
    assert_eq!(
        store.calls(),
        vec![StoreCall::Update(TaskId::new(1), expected), StoreCall::List]
    );
    assert_eq!(sync.tasks()[0].status, Status::Completed);
    assert_eq!(sync.tasks()[1].status, Status::Pending);
    assert_eq!(sync.error(), None);
}

#[tokio::test]
async fn toggle_twice_restores_pending() {
    let store = two_task_store();
    let mut sync = loaded(&store).await;

    sync.toggle_status(TaskId::new(2)).await;
    sync.toggle_status(TaskId::new(2)).await;
    assert_eq!(sync.tasks()[1].status, Status::Pending);
}

#[tokio::test]
async fn begin_edit_missing_task_sets_error_and_keeps_draft() {
    let store = two_task_store();
    let mut sync = loaded(&store).await;
    let before = sync.draft().clone();

    sync.begin_edit(TaskId::new(5)).await;

    assert_eq!(sync.error(), Some(FETCH_TASK_FAILED));
    assert_eq!(sync.editor(), EditorState::Closed);
    assert_eq!(sync.draft(), &before);
    assert_eq!(store.calls(), vec![StoreCall::Get(TaskId::new(5))]);
}

#[tokio::test]
async fn submit_new_task_creates_without_identifier() {
    let store = MemoryTaskStore::new();
    let mut sync = loaded(&store).await;

    sync.begin_create();
    let fields = TaskFields {
        title: "X".to_string(),
        description: String::new(),
        priority: Priority::Medium,
        status: Status::Pending,
    };
    sync.submit(Draft::New(fields.clone())).await;

    assert_eq!(
        store.calls(),
        vec![StoreCall::Create(fields), StoreCall::List]
    );
    assert_eq!(sync.editor(), EditorState::Closed);
    assert_eq!(sync.draft(), &Draft::default());
    assert_eq!(sync.tasks().len(), 1);
    assert_eq!(sync.tasks()[0].title, "X");
}

#[tokio::test]
async fn remove_transport_failure_keeps_list_and_skips_refresh() {
    let memory = MemoryTaskStore::with_tasks(vec![
        make_task(3, "C", Priority::Medium, Status::Pending),
        make_task(4, "D", Priority::Low, Status::Completed),
    ]);
    let store = UnreachableDeletes {
        memory: memory.clone(),
        dead: HttpTaskStore::new(&closed_port_url(), Duration::from_secs(2)).unwrap(),
    };
    let mut sync = Synchronizer::new(store);
    sync.refresh().await;
    memory.clear_calls();
    let before = sync.tasks().to_vec();

    sync.remove(TaskId::new(3)).await;

    assert_eq!(sync.tasks(), before.as_slice());
    assert_eq!(sync.error(), Some(DELETE_TASK_FAILED));
    // no list call reached the store after the failed delete
    assert!(memory.calls().is_empty());
}

#[tokio::test]
async fn blank_titles_never_reach_the_store() {
    let store = two_task_store();
    let mut sync = loaded(&store).await;
    sync.begin_create();

    for title in ["", "   ", "\t\n"] {
        sync.submit(Draft::New(TaskFields::titled(title))).await;
        assert_eq!(sync.editor(), EditorState::Open);
        assert_eq!(sync.draft(), &Draft::default());
    }
    assert!(store.calls().is_empty());
}

// ---------------------------------------------------------------------------
// Error message lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn each_operation_reports_its_own_message() {
    let store = two_task_store();
    let mut sync = loaded(&store).await;

    store.set_failing(Operation::Update, true);
    sync.toggle_status(TaskId::new(1)).await;
    assert_eq!(sync.error(), Some(TOGGLE_STATUS_FAILED));

    sync.begin_edit(TaskId::new(1)).await;
    let draft = sync.draft().clone();
    sync.submit(draft).await;
    assert_eq!(sync.error(), Some(SAVE_TASK_FAILED));
    assert_eq!(sync.editor(), EditorState::Open);

    store.set_failing(Operation::List, true);
    sync.refresh().await;
    assert_eq!(sync.error(), Some(FETCH_TASKS_FAILED));
}

#[tokio::test]
async fn failed_refresh_after_save_leaves_fetch_message() {
    let store = two_task_store();
    let mut sync = loaded(&store).await;
    store.set_failing(Operation::List, true);

    sync.submit(Draft::New(TaskFields::titled("C"))).await;

    // the save landed, the follow-up fetch did not
    assert_eq!(store.tasks().len(), 3);
    assert_eq!(sync.tasks().len(), 2);
    assert_eq!(sync.editor(), EditorState::Closed);
    assert_eq!(sync.error(), Some(FETCH_TASKS_FAILED));
}

#[tokio::test]
async fn retry_after_failure_clears_message() {
    let store = two_task_store();
    let mut sync = loaded(&store).await;

    store.set_failing(Operation::Delete, true);
    sync.remove(TaskId::new(2)).await;
    assert_eq!(sync.error(), Some(DELETE_TASK_FAILED));

    store.set_failing(Operation::Delete, false);
    sync.remove(TaskId::new(2)).await;
    assert_eq!(sync.error(), None);
    assert_eq!(sync.tasks().len(), 1);
}

// ---------------------------------------------------------------------------
// Editing round trip
// ---------------------------------------------------------------------------

#[tokio::test]
async fn edit_then_save_updates_in_place() {
    let store = two_task_store();
    let mut sync = loaded(&store).await;

    sync.begin_edit(TaskId::new(2)).await;
    let mut draft = sync.draft().clone();
    assert_eq!(draft.id(), Some(TaskId::new(2)));
    draft.fields_mut().title = "B2".to_string();
    draft.fields_mut().priority = Priority::High;
    sync.submit(draft).await;

    let ids: Vec<i64> = sync.tasks().iter().map(|t| t.id.get()).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(sync.tasks()[1].title, "B2");
    assert_eq!(sync.tasks()[1].priority, Priority::High);
}

#[tokio::test]
async fn cancel_then_create_starts_from_template() {
    let store = two_task_store();
    let mut sync = loaded(&store).await;

    sync.begin_edit(TaskId::new(1)).await;
    sync.cancel();
    assert_eq!(sync.editor(), EditorState::Closed);
    assert_eq!(sync.draft(), &Draft::default());
    assert!(store.calls().iter().all(|c| matches!(c, StoreCall::Get(_))));

    sync.begin_create();
    assert_eq!(sync.draft(), &Draft::default());
    assert_eq!(sync.editor(), EditorState::Open);
}

// ---------------------------------------------------------------------------
// Selection and snapshots
// ---------------------------------------------------------------------------

#[tokio::test]
async fn selection_changes_reorder_the_snapshot_view() {
    let store = MemoryTaskStore::with_tasks(vec![
        make_task(1, "low", Priority::Low, Status::Pending),
        make_task(2, "high done", Priority::High, Status::Completed),
        make_task(3, "medium", Priority::Medium, Status::Pending),
    ]);
    let mut sync = loaded(&store).await;
    let rx = sync.subscribe();

    assert_eq!(ids(&rx.borrow().view()), vec![2, 3, 1]);

    sync.set_sort_key(SortKey::Status);
    assert_eq!(ids(&rx.borrow().view()), vec![1, 2, 3]);

    sync.set_filter(Filter::Pending);
    assert_eq!(ids(&rx.borrow().view()), vec![1, 3]);

    // queries with an explicit selection ignore the stored one
    let all_by_priority = sync.derived_view(ViewSelection::default());
    assert_eq!(ids(&all_by_priority), vec![2, 3, 1]);
}

#[tokio::test]
async fn initial_selection_is_respected() {
    let store = two_task_store();
    let selection = ViewSelection::new(Filter::Completed, SortKey::Status);
    let mut sync = Synchronizer::new(store).with_selection(selection);
    sync.refresh().await;

    assert_eq!(sync.selection(), selection);
    assert!(sync.snapshot().view().is_empty());
}

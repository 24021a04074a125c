//! Integration tests for the sync worker.
//!
//! Tests that `spawn_sync` wires a `Synchronizer` to the command and
//! snapshot channels the TUI uses:
//! - the worker performs the startup refresh on its own
//! - commands are applied in order, one at a time
//! - snapshots report loading while a fetch is in flight
//! - `Shutdown` and dropped senders both stop the worker

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use taskdeck::store::memory::{MemoryTaskStore, Operation, StoreCall};
use taskdeck::store::{StoreError, TaskStore};
use taskdeck::sync::{
    Draft, EditorState, FETCH_TASKS_FAILED, Filter, SyncSnapshot, Synchronizer, ViewSelection,
};
use taskdeck::worker::{SyncCommand, spawn_sync};
use taskdeck_proto::task::{Status, Task, TaskFields, TaskId};
use tokio::sync::{Semaphore, mpsc, watch};

/// Wait until a published snapshot satisfies `pred`, and return it.
async fn wait_for(
    rx: &mut watch::Receiver<SyncSnapshot>,
    pred: impl Fn(&SyncSnapshot) -> bool,
) -> SyncSnapshot {
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(pred))
        .await
        .expect("timeout waiting for snapshot")
        .expect("worker dropped the snapshot channel")
        .clone()
}

/// Store that announces every call and then blocks until the test lets it
/// through, so snapshots can be inspected while a request is in flight.
struct SteppedStore {
    memory: MemoryTaskStore,
    entered: mpsc::UnboundedSender<Operation>,
    release: Arc<Semaphore>,
}

impl SteppedStore {
    async fn enter(&self, op: Operation) {
        self.entered.send(op).unwrap();
        self.release.acquire().await.unwrap().forget();
    }
}

impl TaskStore for SteppedStore {
    async fn list(&self) -> Result<Vec<Task>, StoreError> {
        self.enter(Operation::List).await;
        self.memory.list().await
    }

    async fn get(&self, id: TaskId) -> Result<Task, StoreError> {
        self.enter(Operation::Get).await;
        self.memory.get(id).await
    }

    async fn create(&self, fields: &TaskFields) -> Result<(), StoreError> {
        self.enter(Operation::Create).await;
        self.memory.create(fields).await
    }

    async fn update(&self, id: TaskId, task: &Task) -> Result<(), StoreError> {
        self.enter(Operation::Update).await;
        self.memory.update(id, task).await
    }

    async fn delete(&self, id: TaskId) -> Result<(), StoreError> {
        self.enter(Operation::Delete).await;
        self.memory.delete(id).await
    }

    fn endpoint(&self) -> String {
        "stepped".to_string()
    }
}

/// Test side of a [`SteppedStore`].
struct Steps {
    entered: mpsc::UnboundedReceiver<Operation>,
    release: Arc<Semaphore>,
}

impl Steps {
    /// Wait until the store is blocked inside `op`.
    async fn expect(&mut self, op: Operation) {
        let got = tokio::time::timeout(Duration::from_secs(5), self.entered.recv())
            .await
            .expect("timeout waiting for store call")
            .expect("store dropped");
        assert_eq!(got, op);
    }

    /// Let the blocked call finish.
    fn release(&self) {
        self.release.add_permits(1);
    }

    fn assert_idle(&mut self) {
        assert!(self.entered.try_recv().is_err(), "unexpected store call");
    }
}

fn stepped(memory: MemoryTaskStore) -> (SteppedStore, Steps) {
    let (entered_tx, entered_rx) = mpsc::unbounded_channel();
    let release = Arc::new(Semaphore::new(0));
    let store = SteppedStore {
        memory,
        entered: entered_tx,
        release: Arc::clone(&release),
    };
    (
        store,
        Steps {
            entered: entered_rx,
            release,
        },
    )
}

fn two_tasks() -> MemoryTaskStore {
    MemoryTaskStore::with_tasks(vec![
        TaskFields::titled("A").with_id(TaskId::new(1)),
        TaskFields::titled("B").with_id(TaskId::new(2)),
    ])
}

#[tokio::test]
async fn startup_refresh_publishes_tasks() {
    let store = MemoryTaskStore::demo();
    let (_tx, mut rx, _handle) = spawn_sync(Synchronizer::new(store.clone()), 8);

    let snapshot = wait_for(&mut rx, |s| !s.tasks.is_empty() && !s.loading).await;
    assert_eq!(snapshot.tasks, store.tasks());
    assert!(snapshot.refreshed_at.is_some());
    assert_eq!(snapshot.error, None);
}

#[tokio::test]
async fn startup_failure_publishes_fetch_error() {
    let store = MemoryTaskStore::demo();
    store.set_failing(Operation::List, true);
    let (_tx, mut rx, _handle) = spawn_sync(Synchronizer::new(store), 8);

    let snapshot = wait_for(&mut rx, |s| s.error.is_some()).await;
    assert_eq!(snapshot.error.as_deref(), Some(FETCH_TASKS_FAILED));
    assert!(snapshot.tasks.is_empty());
    assert!(!snapshot.loading);
}

#[tokio::test]
async fn create_flow_through_commands() {
    let store = MemoryTaskStore::new();
    let (tx, mut rx, _handle) = spawn_sync(Synchronizer::new(store.clone()), 8);
    wait_for(&mut rx, |s| s.refreshed_at.is_some()).await;

    tx.send(SyncCommand::BeginCreate).await.unwrap();
    let opened = wait_for(&mut rx, |s| s.editor == EditorState::Open).await;
    assert_eq!(opened.draft, Draft::default());

    let mut draft = opened.draft;
    draft.fields_mut().title = "Buy milk".to_string();
    tx.send(SyncCommand::Submit(draft)).await.unwrap();

    let saved = wait_for(&mut rx, |s| s.tasks.len() == 1 && !s.loading).await;
    assert_eq!(saved.editor, EditorState::Closed);
    assert_eq!(saved.tasks[0].title, "Buy milk");
}

#[tokio::test]
async fn commands_are_applied_in_order() {
    let store = MemoryTaskStore::with_tasks(vec![
        TaskFields::titled("A").with_id(TaskId::new(1)),
        TaskFields::titled("B").with_id(TaskId::new(2)),
    ]);
    let (tx, mut rx, _handle) = spawn_sync(Synchronizer::new(store.clone()), 8);
    wait_for(&mut rx, |s| s.tasks.len() == 2).await;
    store.clear_calls();

    // Queue everything before the worker has a chance to run any of it.
    tx.send(SyncCommand::ToggleStatus(TaskId::new(1))).await.unwrap();
    tx.send(SyncCommand::Remove(TaskId::new(2))).await.unwrap();
    tx.send(SyncCommand::SetFilter(Filter::Completed)).await.unwrap();

    let done = wait_for(&mut rx, |s| {
        s.selection.filter == Filter::Completed && !s.loading
    })
    .await;

    let calls = store.calls();
    assert!(matches!(calls[0], StoreCall::Update(id, _) if id == TaskId::new(1)));
    assert_eq!(
        &calls[1..],
        &[
            StoreCall::List,
            StoreCall::Delete(TaskId::new(2)),
            StoreCall::List
        ]
    );
    let view = done.view();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].status, Status::Completed);
}

#[tokio::test]
async fn initial_selection_reaches_first_snapshot() {
    let selection = ViewSelection::new(Filter::Pending, taskdeck::sync::SortKey::Status);
    let sync = Synchronizer::new(MemoryTaskStore::demo()).with_selection(selection);
    let (_tx, rx, _handle) = spawn_sync(sync, 8);
    assert_eq!(rx.borrow().selection, selection);
}

#[tokio::test]
async fn shutdown_stops_worker() {
    let (tx, _rx, handle) = spawn_sync(Synchronizer::new(MemoryTaskStore::new()), 8);
    tx.send(SyncCommand::Shutdown).await.unwrap();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("worker did not stop")
        .unwrap();
    assert!(tx.is_closed());
}

#[tokio::test]
async fn zero_capacity_is_raised_to_one() {
    let (tx, mut rx, _handle) = spawn_sync(Synchronizer::new(MemoryTaskStore::new()), 0);
    tx.send(SyncCommand::BeginCreate).await.unwrap();
    wait_for(&mut rx, |s| s.editor == EditorState::Open).await;
}

#[tokio::test]
async fn loading_is_set_only_while_the_list_is_in_flight() {
    let (store, mut steps) = stepped(two_tasks());
    let (tx, mut rx, _handle) = spawn_sync(Synchronizer::new(store), 8);

    steps.expect(Operation::List).await;
    {
        let during = rx.borrow();
        assert!(during.loading);
        assert!(during.tasks.is_empty());
    }
    steps.release();
    let after = wait_for(&mut rx, |s| s.tasks.len() == 2).await;
    assert!(!after.loading);

    // a manual refresh goes through the same cycle
    tx.send(SyncCommand::Refresh).await.unwrap();
    steps.expect(Operation::List).await;
    assert!(rx.borrow().loading);
    steps.release();
    wait_for(&mut rx, |s| !s.loading).await;
    steps.assert_idle();
}

#[tokio::test]
async fn mutations_load_only_during_their_trailing_refresh() {
    let (store, mut steps) = stepped(two_tasks());
    let (tx, mut rx, _handle) = spawn_sync(Synchronizer::new(store), 8);
    steps.expect(Operation::List).await;
    steps.release();
    wait_for(&mut rx, |s| s.tasks.len() == 2 && !s.loading).await;

    // begin_edit never refreshes
    tx.send(SyncCommand::BeginEdit(TaskId::new(1))).await.unwrap();
    steps.expect(Operation::Get).await;
    assert!(!rx.borrow().loading);
    steps.release();
    let opened = wait_for(&mut rx, |s| s.editor == EditorState::Open).await;
    assert!(!opened.loading);
    steps.assert_idle();

    // submit: idle during the save, loading during the refresh after it
    let mut draft = opened.draft;
    draft.fields_mut().title = "A2".to_string();
    tx.send(SyncCommand::Submit(draft)).await.unwrap();
    steps.expect(Operation::Update).await;
    assert!(!rx.borrow().loading);
    steps.release();
    steps.expect(Operation::List).await;
    {
        let refreshing = rx.borrow();
        assert!(refreshing.loading);
        assert_eq!(refreshing.editor, EditorState::Closed);
    }
    steps.release();
    wait_for(&mut rx, |s| {
        !s.loading && s.tasks.first().is_some_and(|t| t.title == "A2")
    })
    .await;

    // remove: same shape
    tx.send(SyncCommand::Remove(TaskId::new(2))).await.unwrap();
    steps.expect(Operation::Delete).await;
    assert!(!rx.borrow().loading);
    steps.release();
    steps.expect(Operation::List).await;
    assert!(rx.borrow().loading);
    steps.release();
    let done = wait_for(&mut rx, |s| s.tasks.len() == 1 && !s.loading).await;
    assert_eq!(done.tasks[0].id, TaskId::new(1));
    steps.assert_idle();
}

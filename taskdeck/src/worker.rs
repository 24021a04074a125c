//! Background worker wiring the TUI to the synchronizer.
//!
//! The TUI event loop is synchronous (crossterm poll-based) while every
//! synchronizer operation awaits the task store. [`spawn_sync`] moves the
//! [`Synchronizer`] onto a tokio task and talks to it over two channels:
//!
//! ```text
//! TUI (main thread)  ←── SyncSnapshot (watch) ───  worker task
//!                     ─── SyncCommand (mpsc)   →
//! ```
//!
//! Commands are applied strictly one after another. A mutation and the
//! refresh that follows it finish before the next command is read, so two
//! quick keypresses never produce overlapping store requests.

use taskdeck_proto::task::TaskId;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::store::TaskStore;
use crate::sync::{Draft, Filter, SortKey, SyncSnapshot, Synchronizer};

/// Commands sent from the TUI main loop to the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncCommand {
    /// Re-fetch the task list.
    Refresh,
    /// Open the editor on a blank draft.
    BeginCreate,
    /// Load a task and open the editor on it.
    BeginEdit(TaskId),
    /// Save the given draft.
    Submit(Draft),
    /// Close the editor without saving.
    Cancel,
    /// Delete a task.
    Remove(TaskId),
    /// Flip a task between pending and completed.
    ToggleStatus(TaskId),
    /// Change the filter.
    SetFilter(Filter),
    /// Change the sort key.
    SetSortKey(SortKey),
    /// Stop the worker.
    Shutdown,
}

/// Default capacity of the command channel.
pub const DEFAULT_COMMAND_CAPACITY: usize = 64;

/// Applies one command. Returns `false` when the worker should stop.
pub async fn dispatch<S: TaskStore>(sync: &mut Synchronizer<S>, command: SyncCommand) -> bool {
    tracing::debug!(?command, "applying command");
    match command {
        SyncCommand::Refresh => sync.refresh().await,
        SyncCommand::BeginCreate => sync.begin_create(),
        SyncCommand::BeginEdit(id) => sync.begin_edit(id).await,
        SyncCommand::Submit(draft) => sync.submit(draft).await,
        SyncCommand::Cancel => sync.cancel(),
        SyncCommand::Remove(id) => sync.remove(id).await,
        SyncCommand::ToggleStatus(id) => sync.toggle_status(id).await,
        SyncCommand::SetFilter(filter) => sync.set_filter(filter),
        SyncCommand::SetSortKey(key) => sync.set_sort_key(key),
        SyncCommand::Shutdown => return false,
    }
    true
}

/// Spawn the worker task and return its channel handles.
///
/// The worker performs the startup refresh itself, then applies commands
/// until it receives [`SyncCommand::Shutdown`] or every sender is dropped.
///
/// Must be called from within a tokio runtime.
pub fn spawn_sync<S>(
    mut sync: Synchronizer<S>,
    capacity: usize,
) -> (
    mpsc::Sender<SyncCommand>,
    watch::Receiver<SyncSnapshot>,
    JoinHandle<()>,
)
where
    S: TaskStore + 'static,
{
    let (cmd_tx, mut cmd_rx) = mpsc::channel(capacity.max(1));
    let snapshots = sync.subscribe();

    let handle = tokio::spawn(async move {
        tracing::info!(store = %sync.store().endpoint(), "sync worker started");
        sync.refresh().await;

        while let Some(command) = cmd_rx.recv().await {
            if !dispatch(&mut sync, command).await {
                break;
            }
        }
        tracing::info!("sync worker stopped");
    });

    (cmd_tx, snapshots, handle)
}

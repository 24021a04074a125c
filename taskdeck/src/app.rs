//! Application state and event handling.
//!
//! [`App`] holds the latest [`SyncSnapshot`] published by the worker plus the
//! purely local bits of UI state: the list cursor and the editor form being
//! typed into. Key events are turned into [`SyncCommand`]s; nothing here
//! talks to the task store directly.

use std::fmt::Write as _;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use taskdeck_proto::task::{Task, TaskFields};

use crate::sync::{Draft, EditorState, SyncSnapshot};
use crate::worker::SyncCommand;

/// Braille spinner shown while a request is in flight.
const SPINNER_FRAMES: [&str; 10] = [
    "\u{280b}", "\u{2819}", "\u{2839}", "\u{2838}", "\u{283c}", "\u{2834}", "\u{2826}", "\u{2827}",
    "\u{2807}", "\u{280f}",
];

/// Fields of the editor form, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    /// Free text, required.
    Title,
    /// Free text, optional.
    Description,
    /// One of the three priorities.
    Priority,
    /// Pending or completed.
    Status,
}

impl FormField {
    /// All fields in display order.
    pub const ALL: [Self; 4] = [Self::Title, Self::Description, Self::Priority, Self::Status];

    /// Field label shown next to the input.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Description => "Description",
            Self::Priority => "Priority",
            Self::Status => "Status",
        }
    }

    /// Whether the field takes typed text (as opposed to a fixed choice).
    #[must_use]
    pub const fn is_text(self) -> bool {
        matches!(self, Self::Title | Self::Description)
    }

    const fn next(self) -> Self {
        match self {
            Self::Title => Self::Description,
            Self::Description => Self::Priority,
            Self::Priority => Self::Status,
            Self::Status => Self::Title,
        }
    }

    const fn prev(self) -> Self {
        match self {
            Self::Title => Self::Status,
            Self::Description => Self::Title,
            Self::Priority => Self::Description,
            Self::Status => Self::Priority,
        }
    }
}

/// The editor form: a local copy of the draft being typed into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorForm {
    /// Draft as edited so far. Sent whole on submit.
    pub draft: Draft,
    /// Focused field.
    pub field: FormField,
    /// Cursor position within the focused text field (character index).
    pub cursor: usize,
    /// A submit has been sent and no answer has come back yet.
    pub submitting: bool,
}

impl EditorForm {
    /// Opens a form on `draft` with the title focused and the cursor at its end.
    #[must_use]
    pub fn new(draft: Draft) -> Self {
        let cursor = draft.fields().title.chars().count();
        Self {
            draft,
            field: FormField::Title,
            cursor,
            submitting: false,
        }
    }

    /// Heading of the modal.
    #[must_use]
    pub const fn heading(&self) -> &'static str {
        match self.draft {
            Draft::New(_) => "Add New Task",
            Draft::Editing(..) => "Edit Task",
        }
    }

    /// Display value of `field`.
    #[must_use]
    pub fn value(&self, field: FormField) -> &str {
        let fields = self.draft.fields();
        match field {
            FormField::Title => &fields.title,
            FormField::Description => &fields.description,
            FormField::Priority => fields.priority.as_str(),
            FormField::Status => fields.status.as_str(),
        }
    }

    fn text_mut(&mut self) -> Option<&mut String> {
        let field = self.field;
        let fields: &mut TaskFields = self.draft.fields_mut();
        match field {
            FormField::Title => Some(&mut fields.title),
            FormField::Description => Some(&mut fields.description),
            FormField::Priority | FormField::Status => None,
        }
    }

    fn text_len(&self) -> usize {
        if self.field.is_text() {
            self.value(self.field).chars().count()
        } else {
            0
        }
    }

    fn focus(&mut self, field: FormField) {
        self.field = field;
        self.cursor = self.text_len();
    }

    fn insert_char(&mut self, c: char) {
        let cursor = self.cursor;
        if let Some(text) = self.text_mut() {
            let at = byte_index(text, cursor);
            text.insert(at, c);
            self.cursor += 1;
        }
    }

    fn delete_char(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let cursor = self.cursor;
        if let Some(text) = self.text_mut() {
            let at = byte_index(text, cursor - 1);
            text.remove(at);
            self.cursor -= 1;
        }
    }

    /// Left/right: moves the cursor in text fields, cycles choice fields.
    fn step(&mut self, forward: bool) {
        let field = self.field;
        let fields = self.draft.fields_mut();
        match field {
            FormField::Priority => {
                fields.priority = if forward {
                    fields.priority.next()
                } else {
                    fields.priority.prev()
                };
            }
            FormField::Status => fields.status = fields.status.toggled(),
            FormField::Title | FormField::Description => {
                if forward {
                    self.cursor = (self.cursor + 1).min(self.text_len());
                } else {
                    self.cursor = self.cursor.saturating_sub(1);
                }
            }
        }
    }
}

/// Byte offset of the `char_idx`-th character of `s` (or `s.len()`).
fn byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

/// Main application state.
#[derive(Debug)]
pub struct App {
    /// Last state published by the worker.
    pub snapshot: SyncSnapshot,
    /// Index of the highlighted row in the displayed list.
    pub selected: usize,
    /// Open editor form, if any.
    pub form: Option<EditorForm>,
    /// Where tasks come from, for the status bar.
    pub store_label: String,
    /// chrono format for the "updated" time.
    pub timestamp_format: String,
    /// Whether the app should quit.
    pub should_quit: bool,
    spinner: usize,
}

impl App {
    /// Create the application state before any snapshot has arrived.
    #[must_use]
    pub fn new(store_label: impl Into<String>, timestamp_format: impl Into<String>) -> Self {
        Self {
            snapshot: SyncSnapshot::default(),
            selected: 0,
            form: None,
            store_label: store_label.into(),
            timestamp_format: timestamp_format.into(),
            should_quit: false,
            spinner: 0,
        }
    }

    /// Take in a newly published snapshot.
    ///
    /// The form is seeded from the snapshot's draft when the editor opens and
    /// dropped when it closes. An open is detected by the editor generation
    /// as well as by the state, since intermediate snapshots may be skipped.
    /// While the same open lasts the local copy wins, so keystrokes are never
    /// overwritten by a late snapshot.
    pub fn apply_snapshot(&mut self, snapshot: SyncSnapshot) {
        let reopened = self.snapshot.editor == EditorState::Closed
            || self.snapshot.editor_generation != snapshot.editor_generation;
        match snapshot.editor {
            EditorState::Open if reopened => {
                self.form = Some(EditorForm::new(snapshot.draft.clone()));
            }
            EditorState::Open => {
                if let Some(form) = self.form.as_mut() {
                    form.submitting = false;
                }
            }
            EditorState::Closed => self.form = None,
        }
        self.snapshot = snapshot;

        let len = self.snapshot.view().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    /// The task under the list cursor.
    #[must_use]
    pub fn selected_task(&self) -> Option<&Task> {
        self.snapshot.view().get(self.selected).copied()
    }

    /// Advance the loading spinner. Called once per frame.
    pub const fn tick(&mut self) {
        if self.snapshot.loading {
            self.spinner = (self.spinner + 1) % SPINNER_FRAMES.len();
        }
    }

    /// Current spinner glyph.
    #[must_use]
    pub fn spinner_frame(&self) -> &'static str {
        SPINNER_FRAMES[self.spinner % SPINNER_FRAMES.len()]
    }

    /// Time of the last successful refresh, in the configured format.
    ///
    /// `None` before the first refresh or if the format string is invalid.
    #[must_use]
    pub fn updated_label(&self) -> Option<String> {
        let at = self.snapshot.refreshed_at?;
        let mut out = String::new();
        write!(out, "{}", at.format(&self.timestamp_format)).ok()?;
        Some(out)
    }

    /// Handle a key event.
    ///
    /// Returns a command when the key asks the synchronizer to do something.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<SyncCommand> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return None;
        }

        if self.form.is_some() {
            self.handle_editor_key(key)
        } else {
            self.handle_list_key(key)
        }
    }

    /// Handle key event while the task list is showing.
    fn handle_list_key(&mut self, key: KeyEvent) -> Option<SyncCommand> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let last = self.snapshot.view().len().saturating_sub(1);
                self.selected = (self.selected + 1).min(last);
                None
            }
            KeyCode::Char('n') => Some(SyncCommand::BeginCreate),
            KeyCode::Char('e') | KeyCode::Enter => {
                self.selected_task().map(|t| SyncCommand::BeginEdit(t.id))
            }
            KeyCode::Char(' ') => self.selected_task().map(|t| SyncCommand::ToggleStatus(t.id)),
            KeyCode::Char('d') | KeyCode::Delete => {
                self.selected_task().map(|t| SyncCommand::Remove(t.id))
            }
            KeyCode::Char('f') => {
                let filter = self.snapshot.selection.filter.next();
                self.snapshot.selection.filter = filter;
                self.selected = 0;
                Some(SyncCommand::SetFilter(filter))
            }
            KeyCode::Char('s') => {
                let sort_key = self.snapshot.selection.sort_key.next();
                self.snapshot.selection.sort_key = sort_key;
                Some(SyncCommand::SetSortKey(sort_key))
            }
            KeyCode::Char('r') => Some(SyncCommand::Refresh),
            _ => None,
        }
    }

    /// Handle key event while the editor form is open.
    fn handle_editor_key(&mut self, key: KeyEvent) -> Option<SyncCommand> {
        let form = self.form.as_mut()?;
        match key.code {
            KeyCode::Esc => {
                self.form = None;
                return Some(SyncCommand::Cancel);
            }
            KeyCode::Enter => {
                if form.submitting || !form.draft.fields().has_title() {
                    return None;
                }
                form.submitting = true;
                return Some(SyncCommand::Submit(form.draft.clone()));
            }
            KeyCode::BackTab => form.focus(form.field.prev()),
            KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => {
                form.focus(form.field.prev());
            }
            KeyCode::Tab | KeyCode::Down => form.focus(form.field.next()),
            KeyCode::Up => form.focus(form.field.prev()),
            KeyCode::Left => form.step(false),
            KeyCode::Right => form.step(true),
            KeyCode::Home if form.field.is_text() => form.cursor = 0,
            KeyCode::End => form.cursor = form.text_len(),
            KeyCode::Backspace => form.delete_char(),
            KeyCode::Char(' ') if !form.field.is_text() => form.step(true),
            KeyCode::Char(c) => form.insert_char(c),
            _ => {}
        }
        None
    }
}

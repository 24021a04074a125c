//! View selection and derivation of the displayed task list.
//!
//! The displayed list is a pure function of the canonical list and the
//! [`ViewSelection`]: filter first, then a stable sort.

use std::fmt;
use std::str::FromStr;

use taskdeck_proto::task::{Status, Task};

/// Error for an unrecognized filter or sort key name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionParseError {
    /// Not one of `all`, `pending`, `completed`.
    #[error("unknown filter `{0}` (expected all, pending or completed)")]
    Filter(String),
    /// Not one of `priority`, `status`.
    #[error("unknown sort key `{0}` (expected priority or status)")]
    SortKey(String),
}

/// Which tasks are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Filter {
    /// Every task.
    #[default]
    All,
    /// Only `Pending` tasks.
    Pending,
    /// Only `Completed` tasks.
    Completed,
}

impl Filter {
    /// Whether `task` passes this filter.
    #[must_use]
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Pending => task.status == Status::Pending,
            Self::Completed => task.status == Status::Completed,
        }
    }

    /// `All → Pending → Completed → All`.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::All => Self::Pending,
            Self::Pending => Self::Completed,
            Self::Completed => Self::All,
        }
    }

    /// Label for the filter selector.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All Tasks",
            Self::Pending => "Pending",
            Self::Completed => "Completed",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::Completed => "completed",
        })
    }
}

impl FromStr for Filter {
    type Err = SelectionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            _ => Err(SelectionParseError::Filter(s.to_string())),
        }
    }
}

/// How the filtered tasks are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    /// `High` before `Medium` before `Low`; ties keep their order.
    #[default]
    Priority,
    /// Keeps the store's order unchanged.
    Status,
}

impl SortKey {
    /// `Priority ↔ Status`.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Priority => Self::Status,
            Self::Status => Self::Priority,
        }
    }

    /// Label for the sort selector.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Priority => "Sort by Priority",
            Self::Status => "Sort by Status",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Priority => "priority",
            Self::Status => "status",
        })
    }
}

impl FromStr for SortKey {
    type Err = SelectionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "priority" => Ok(Self::Priority),
            "status" => Ok(Self::Status),
            _ => Err(SelectionParseError::SortKey(s.to_string())),
        }
    }
}

/// Active filter and sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ViewSelection {
    /// Which tasks are shown.
    pub filter: Filter,
    /// How they are ordered.
    pub sort_key: SortKey,
}

impl ViewSelection {
    /// Creates a selection from its two halves.
    #[must_use]
    pub const fn new(filter: Filter, sort_key: SortKey) -> Self {
        Self { filter, sort_key }
    }
}

/// Filters `tasks` by `selection.filter`, then stable-sorts by
/// `selection.sort_key`.
///
/// Sorting by [`SortKey::Status`] is deliberately a pass-through: the
/// filtered list keeps its original relative order.
#[must_use]
pub fn derive_view(tasks: &[Task], selection: ViewSelection) -> Vec<&Task> {
    let mut view: Vec<&Task> = tasks
        .iter()
        .filter(|t| selection.filter.matches(t))
        .collect();
    match selection.sort_key {
        SortKey::Priority => view.sort_by_key(|t| t.priority.rank()),
        SortKey::Status => {}
    }
    view
}

//! Task entity as exchanged with the task store.
//!
//! A [`Task`] is owned by the store and always carries a store-assigned
//! [`TaskId`]. [`TaskFields`] is the same record without an identifier,
//! which is what a create request sends.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, de};

/// Store-assigned numeric task identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(i64);

impl TaskId {
    /// Wraps a raw identifier value.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw identifier value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for TaskId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Task urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    /// Most urgent.
    High,
    /// The default for new tasks.
    #[default]
    Medium,
    /// Least urgent.
    Low,
}

impl Priority {
    /// All priorities, most urgent first.
    pub const ALL: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    /// Sort rank: `High = 0`, `Medium = 1`, `Low = 2`.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }

    /// The next priority in [`Priority::ALL`] order, wrapping around.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::High => Self::Medium,
            Self::Medium => Self::Low,
            Self::Low => Self::High,
        }
    }

    /// The previous priority in [`Priority::ALL`] order, wrapping around.
    #[must_use]
    pub const fn prev(self) -> Self {
        match self {
            Self::High => Self::Low,
            Self::Medium => Self::High,
            Self::Low => Self::Medium,
        }
    }

    /// Wire and display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Completion state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Status {
    /// Not done yet. The default for new tasks.
    #[default]
    Pending,
    /// Done.
    Completed,
}

impl Status {
    /// Both statuses, in display order.
    pub const ALL: [Self; 2] = [Self::Pending, Self::Completed];

    /// `Pending` becomes `Completed` and vice versa.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Pending => Self::Completed,
            Self::Completed => Self::Pending,
        }
    }

    /// Wire and display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Completed => "Completed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The editable part of a task, without an identifier.
///
/// `TaskFields::default()` is the new-task template: empty title and
/// description, `Medium` priority, `Pending` status.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskFields {
    /// Short summary. Must contain a non-whitespace character to be saved.
    pub title: String,
    /// Free text, possibly empty.
    #[serde(default)]
    pub description: String,
    /// Urgency.
    pub priority: Priority,
    /// Completion state.
    pub status: Status,
}

impl TaskFields {
    /// Creates fields with the given title and template defaults elsewhere.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Whether the title has any non-whitespace content.
    #[must_use]
    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }

    /// Attaches a store identifier, producing a full [`Task`].
    #[must_use]
    pub fn with_id(self, id: TaskId) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            priority: self.priority,
            status: self.status,
        }
    }
}

/// A task as stored by the task store.
///
/// Stores in the wild report the identifier as either `id` or `_id`;
/// both are accepted on decode (`id` wins when a document has both), `id`
/// is written on encode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    /// Store-assigned identifier.
    pub id: TaskId,
    /// Short summary.
    pub title: String,
    /// Free text, possibly empty.
    #[serde(default)]
    pub description: String,
    /// Urgency.
    pub priority: Priority,
    /// Completion state.
    pub status: Status,
}

/// Decoding shape of [`Task`] with both identifier spellings.
#[derive(Deserialize)]
struct TaskDocument {
    id: Option<TaskId>,
    #[serde(rename = "_id")]
    document_id: Option<TaskId>,
    title: String,
    #[serde(default)]
    description: String,
    priority: Priority,
    status: Status,
}

impl<'de> Deserialize<'de> for Task {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let doc = TaskDocument::deserialize(deserializer)?;
        let id = doc
            .id
            .or(doc.document_id)
            .ok_or_else(|| <D::Error as de::Error>::missing_field("id"))?;
        Ok(Self {
            id,
            title: doc.title,
            description: doc.description,
            priority: doc.priority,
            status: doc.status,
        })
    }
}

impl Task {
    /// Copies out the editable fields, dropping the identifier.
    #[must_use]
    pub fn fields(&self) -> TaskFields {
        TaskFields {
            title: self.title.clone(),
            description: self.description.clone(),
            priority: self.priority,
            status: self.status,
        }
    }

    /// Returns a copy with only the status replaced.
    #[must_use]
    pub fn with_status(&self, status: Status) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }
}

//! Route table for the task store HTTP contract.
//!
//! | Operation | Method & Path                  |
//! |-----------|--------------------------------|
//! | List      | `GET /api/tasks/`              |
//! | Get one   | `GET /api/tasks/{id}`          |
//! | Create    | `POST /api/tasks/add`          |
//! | Update    | `PUT /api/tasks/edit/{id}`     |
//! | Delete    | `DELETE /api/tasks/delete/{id}`|

use std::fmt;

use crate::task::TaskId;

/// Path prefix shared by every task store route.
pub const API_PREFIX: &str = "/api/tasks";

/// HTTP method of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        })
    }
}

/// One task store operation, with its target identifier where it has one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Fetch every task.
    List,
    /// Fetch one task.
    Get(TaskId),
    /// Create a task from fields without an identifier.
    Create,
    /// Replace a task.
    Update(TaskId),
    /// Remove a task.
    Delete(TaskId),
}

impl Route {
    /// HTTP method for this route.
    #[must_use]
    pub const fn method(self) -> Method {
        match self {
            Self::List | Self::Get(_) => Method::Get,
            Self::Create => Method::Post,
            Self::Update(_) => Method::Put,
            Self::Delete(_) => Method::Delete,
        }
    }

    /// Absolute path (starting with `/`) for this route.
    #[must_use]
    pub fn path(self) -> String {
        match self {
            Self::List => format!("{API_PREFIX}/"),
            Self::Get(id) => format!("{API_PREFIX}/{id}"),
            Self::Create => format!("{API_PREFIX}/add"),
            Self::Update(id) => format!("{API_PREFIX}/edit/{id}"),
            Self::Delete(id) => format!("{API_PREFIX}/delete/{id}"),
        }
    }

    /// Short operation name used in logs.
    #[must_use]
    pub const fn operation(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Get(_) => "get",
            Self::Create => "create",
            Self::Update(_) => "update",
            Self::Delete(_) => "delete",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method(), self.path())
    }
}

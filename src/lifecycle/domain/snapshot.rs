//! Requirement and assignee records copied from templates to instances.
//!
//! Snapshots are taken at materialization time; later edits to a template
//! never retroactively alter instances that were already created.

use super::{ParseAssigneeStatusError, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered checklist item attached to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    description: String,
    order_index: i32,
}

impl Requirement {
    /// Creates a requirement at the given position.
    #[must_use]
    pub fn new(description: impl Into<String>, order_index: i32) -> Self {
        Self {
            description: description.into(),
            order_index,
        }
    }

    /// Returns the requirement text.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the requirement's position within the task.
    #[must_use]
    pub const fn order_index(&self) -> i32 {
        self.order_index
    }
}

/// Membership status of a task assignee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssigneeStatus {
    /// The assignment is current.
    Active,
    /// The assignment was withdrawn but the row is retained for history.
    Removed,
}

impl AssigneeStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Removed => "removed",
        }
    }
}

impl TryFrom<&str> for AssigneeStatus {
    type Error = ParseAssigneeStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "active" => Ok(Self::Active),
            "removed" => Ok(Self::Removed),
            _ => Err(ParseAssigneeStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for AssigneeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Assignment of a user to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignee {
    user_id: UserId,
    assigned_by: UserId,
    status: AssigneeStatus,
}

impl Assignee {
    /// Creates an active assignment.
    #[must_use]
    pub const fn new(user_id: UserId, assigned_by: UserId) -> Self {
        Self {
            user_id,
            assigned_by,
            status: AssigneeStatus::Active,
        }
    }

    /// Reconstructs an assignment from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        user_id: UserId,
        assigned_by: UserId,
        status: AssigneeStatus,
    ) -> Self {
        Self {
            user_id,
            assigned_by,
            status,
        }
    }

    /// Returns the assigned user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the user who made the assignment.
    #[must_use]
    pub const fn assigned_by(&self) -> UserId {
        self.assigned_by
    }

    /// Returns the assignment status.
    #[must_use]
    pub const fn status(&self) -> AssigneeStatus {
        self.status
    }
}

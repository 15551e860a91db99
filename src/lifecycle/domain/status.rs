//! Task status state machine shared by the sweepers and the CRUD layer.

use super::ParseTaskStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task exists but work has not started.
    Pending,
    /// Task is being worked.
    InProgress,
    /// Task has been handed in and awaits acceptance.
    Submitted,
    /// Task is finished; terminal for the engine.
    Completed,
    /// Task missed its deadline.
    Overdue,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Submitted => "submitted",
            Self::Completed => "completed",
            Self::Overdue => "overdue",
        }
    }

    /// Returns whether the status is terminal for the lifecycle engine.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Returns whether a transition to `to` is permitted.
    ///
    /// Single source of truth for status legality: the overdue sweeper,
    /// the archival sweeper, and ordinary task updates all consult this
    /// table rather than re-deriving the rules.
    #[must_use]
    pub const fn can_transition_to(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Pending, Self::InProgress | Self::Overdue)
                | (Self::InProgress, Self::Submitted | Self::Overdue)
                | (Self::Submitted, Self::Completed | Self::InProgress)
                | (Self::Overdue, Self::InProgress | Self::Submitted)
        )
    }

    /// Statuses from which a task may be swept to [`TaskStatus::Overdue`].
    pub const OVERDUE_SOURCES: [Self; 2] = [Self::Pending, Self::InProgress];
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "submitted" => Ok(Self::Submitted),
            "completed" => Ok(Self::Completed),
            "overdue" => Ok(Self::Overdue),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

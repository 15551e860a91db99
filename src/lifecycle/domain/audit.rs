//! Audit-log entries emitted by the lifecycle engine.

use super::{ArchiveSchedule, TaskId, UserId};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

/// Actor recorded against an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditActor {
    /// System-initiated action with no human user.
    System,
    /// Action performed by a user.
    User {
        /// Acting user.
        user_id: UserId,
    },
}

impl fmt::Display for AuditActor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => f.write_str("system"),
            Self::User { user_id } => write!(f, "user {user_id}"),
        }
    }
}

/// Action names recorded by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// A completed task was archived by the retention sweep.
    AutoArchived,
}

impl AuditAction {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AutoArchived => "auto_archived",
        }
    }
}

/// One write-only audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    task_id: TaskId,
    actor: AuditActor,
    action: AuditAction,
    metadata: Value,
}

impl AuditEntry {
    /// Creates the audit entry recorded for each automatically archived
    /// task, carrying the policy parameters that triggered it.
    #[must_use]
    pub fn auto_archived(task_id: TaskId, retention_days: u32, schedule: ArchiveSchedule) -> Self {
        Self {
            task_id,
            actor: AuditActor::System,
            action: AuditAction::AutoArchived,
            metadata: json!({
                "auto_archive_after_days": retention_days,
                "schedule_type": schedule.as_str(),
            }),
        }
    }

    /// Returns the task the entry refers to.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the recorded actor.
    #[must_use]
    pub const fn actor(&self) -> AuditActor {
        self.actor
    }

    /// Returns the recorded action.
    #[must_use]
    pub const fn action(&self) -> AuditAction {
        self.action
    }

    /// Returns the structured metadata payload.
    #[must_use]
    pub const fn metadata(&self) -> &Value {
        &self.metadata
    }
}

//! Notifications emitted when instances are materialized.

use super::{TaskId, UserId};
use serde::{Deserialize, Serialize};

/// Notification categories emitted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A recurring template spawned a new instance assigned to the user.
    RecurringTaskCreated,
}

impl NotificationKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RecurringTaskCreated => "recurring_task_created",
        }
    }
}

/// One outbound notification addressed to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    user_id: UserId,
    kind: NotificationKind,
    title: String,
    message: String,
    task_id: TaskId,
}

impl Notification {
    /// Builds the "new recurring task" notification for an assignee of a
    /// freshly materialized instance.
    #[must_use]
    pub fn recurring_task_created(user_id: UserId, task_id: TaskId, task_title: &str) -> Self {
        Self {
            user_id,
            kind: NotificationKind::RecurringTaskCreated,
            title: "New recurring task".to_owned(),
            message: format!("You have been assigned a new recurring task: {task_title}"),
            task_id,
        }
    }

    /// Returns the addressee.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the notification category.
    #[must_use]
    pub const fn kind(&self) -> NotificationKind {
        self.kind
    }

    /// Returns the short title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the message body.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the task the notification refers to.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }
}

//! Domain model for the recurring-task lifecycle engine.
//!
//! Pure types and decision logic: identifiers, the task aggregate with its
//! status state machine, the recurrence evaluator, snapshot records, the
//! per-organization archival policy, and the audit/notification payloads
//! the engine emits. No infrastructure concerns cross this boundary.

mod audit;
mod error;
mod ids;
mod lease;
mod notification;
mod policy;
mod schedule;
mod snapshot;
mod status;
mod task;

pub use audit::{AuditAction, AuditActor, AuditEntry};
pub use error::{
    LifecycleDomainError, ParseArchiveScheduleError, ParseAssigneeStatusError, ParseCadenceError,
    ParseTaskStatusError,
};
pub use ids::{OrganizationId, TaskId, UserId};
pub use lease::TickLease;
pub use notification::{Notification, NotificationKind};
pub use policy::{ArchiveSchedule, OrganizationArchivePolicy};
pub use schedule::{Cadence, RecurrenceRule};
pub use snapshot::{Assignee, AssigneeStatus, Requirement};
pub use status::TaskStatus;
pub use task::{PersistedTaskData, Schedule, Task, TemplateDraft};

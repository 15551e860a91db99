//! Error types for lifecycle domain validation and parsing.

use super::{TaskId, TaskStatus};
use chrono::NaiveDate;
use thiserror::Error;

/// Errors returned while constructing or mutating lifecycle domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LifecycleDomainError {
    /// The recurrence frequency is zero.
    #[error("recurrence frequency must be at least 1")]
    ZeroFrequency,

    /// The recurrence window ends before it starts.
    #[error("recurrence window end {end} precedes start {start}")]
    InvertedWindow {
        /// Window start date.
        start: NaiveDate,
        /// Window end date.
        end: NaiveDate,
    },

    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The archive retention window is zero days.
    #[error("archive retention must be at least 1 day")]
    ZeroRetention,

    /// A recurrence operation was attempted on a non-recurring task.
    #[error("task {0} is not a recurring template")]
    NotATemplate(TaskId),

    /// The watermark would move backwards.
    #[error("watermark for template {template_id} cannot rewind from {current} to {requested}")]
    WatermarkRewind {
        /// Template whose watermark was being advanced.
        template_id: TaskId,
        /// Watermark currently recorded.
        current: NaiveDate,
        /// Earlier date the caller attempted to record.
        requested: NaiveDate,
    },

    /// The requested status change is not permitted by the transition table.
    #[error("task {task_id} cannot transition from {from} to {to}")]
    IllegalTransition {
        /// Task being transitioned.
        task_id: TaskId,
        /// Current status.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
    },

    /// The task is archived and must not be mutated by the engine.
    #[error("task {0} is archived")]
    Archived(TaskId),

    /// Archival was requested for a task that is not completed.
    #[error("task {task_id} with status {status} is not eligible for archival")]
    NotArchivable {
        /// Task for which archival was requested.
        task_id: TaskId,
        /// Status that blocked archival.
        status: TaskStatus,
    },

    /// Date arithmetic left the representable calendar range.
    #[error("date arithmetic overflowed computing a deadline from {0}")]
    DeadlineOverflow(NaiveDate),
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing schedule cadences from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown schedule cadence: {0}")]
pub struct ParseCadenceError(pub String);

/// Error returned while parsing archive schedule tags from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown archive schedule: {0}")]
pub struct ParseArchiveScheduleError(pub String);

/// Error returned while parsing assignee statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown assignee status: {0}")]
pub struct ParseAssigneeStatusError(pub String);

//! Repository port for task, requirement, and assignee persistence.

use crate::lifecycle::domain::{Assignee, OrganizationId, Requirement, Task, TaskId};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract used by the lifecycle engine.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task (template or fixture).
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID
    /// already exists.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Stores a freshly materialized instance.
    ///
    /// Instance creation is idempotent on the
    /// `(parent_template_id, generated_for)` pair: a retried materialization
    /// surfaces [`TaskRepositoryError::DuplicateInstance`] instead of
    /// silently creating a second instance for the same date.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateInstance`] when an instance
    /// already exists for the template/date pair and
    /// [`TaskRepositoryError::DuplicateTask`] on an ID collision.
    async fn store_instance(&self, instance: &Task) -> TaskRepositoryResult<()>;

    /// Persists changes to an existing task (status, watermark, archival).
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not
    /// exist.
    async fn update(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns every instance spawned from `template_id`, ordered by the
    /// date each instance was generated for.
    async fn find_instances_of(&self, template_id: TaskId) -> TaskRepositoryResult<Vec<Task>>;

    /// Enumerates templates eligible for generation as of `as_of`:
    /// recurring, not an instance, not archived, and with `as_of` inside
    /// the recurrence window. Due-ness itself is decided by the pure
    /// evaluator, not by this query.
    async fn due_template_candidates(&self, as_of: NaiveDate) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns a task's requirements ordered by `order_index`.
    async fn requirements_for(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<Requirement>>;

    /// Stores requirement rows for a task, preserving order indices.
    async fn store_requirements(
        &self,
        task_id: TaskId,
        requirements: &[Requirement],
    ) -> TaskRepositoryResult<()>;

    /// Returns a task's assignees.
    async fn assignees_for(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<Assignee>>;

    /// Stores assignee rows for a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateAssignee`] when a
    /// `(task, user)` pair is stored twice.
    async fn store_assignees(
        &self,
        task_id: TaskId,
        assignees: &[Assignee],
    ) -> TaskRepositoryResult<()>;

    /// Bulk-transitions every non-archived one-time task that is pending or
    /// in progress with a deadline before `now`'s UTC date to overdue.
    ///
    /// Returns the number of tasks transitioned. Re-running with the same
    /// or a later `now` is a no-op on already-overdue or terminal tasks.
    async fn sweep_overdue(&self, now: DateTime<Utc>) -> TaskRepositoryResult<usize>;

    /// Returns an organization's completed, not-yet-archived tasks last
    /// updated before `cutoff`.
    async fn archive_candidates(
        &self,
        organization_id: OrganizationId,
        cutoff: DateTime<Utc>,
    ) -> TaskRepositoryResult<Vec<Task>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// An instance already exists for the template/date pair.
    #[error("instance already generated for template {template_id} on {generated_for}")]
    DuplicateInstance {
        /// Template whose generation was retried.
        template_id: TaskId,
        /// Date the duplicate instance targeted.
        generated_for: NaiveDate,
    },

    /// An assignee row already exists for the task/user pair.
    #[error("user already assigned to task {0}")]
    DuplicateAssignee(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// A persisted row could not be mapped back into the domain.
    #[error("invalid persisted task {task_id}: {reason}")]
    InvalidRow {
        /// Offending task.
        task_id: TaskId,
        /// Human-readable mapping failure.
        reason: String,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

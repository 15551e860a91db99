//! Task aggregate root: recurring templates and the instances they spawn.

use super::{
    Assignee, LifecycleDomainError, OrganizationId, RecurrenceRule, TaskId, TaskStatus, UserId,
};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Scheduling role of a task.
///
/// A template carries a [`RecurrenceRule`]; the instances it spawns are
/// always one-time tasks whose `end_date` is their own deadline. The two
/// meanings of `end_date` in the flat storage schema are kept apart here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Schedule {
    /// Concrete task with an optional deadline.
    OneTime {
        /// Date the task is due, if any.
        deadline: Option<NaiveDate>,
    },
    /// Recurring template; never worked directly.
    Recurring(RecurrenceRule),
}

/// Parameter object for creating a recurring template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDraft {
    organization_id: OrganizationId,
    created_by: UserId,
    title: String,
    details: Option<String>,
    is_private: bool,
    rule: RecurrenceRule,
    legacy_assignee: Option<UserId>,
}

impl TemplateDraft {
    /// Creates a draft with the required template fields.
    #[must_use]
    pub fn new(
        organization_id: OrganizationId,
        created_by: UserId,
        title: impl Into<String>,
        rule: RecurrenceRule,
    ) -> Self {
        Self {
            organization_id,
            created_by,
            title: title.into(),
            details: None,
            is_private: false,
            rule,
            legacy_assignee: None,
        }
    }

    /// Sets the free-form task description.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Marks the template (and its instances) private.
    #[must_use]
    pub const fn private(mut self) -> Self {
        self.is_private = true;
        self
    }

    /// Sets the legacy single-assignee pointer.
    #[must_use]
    pub const fn with_legacy_assignee(mut self, user_id: UserId) -> Self {
        self.legacy_assignee = Some(user_id);
        self
    }
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    organization_id: OrganizationId,
    created_by: UserId,
    title: String,
    details: Option<String>,
    is_private: bool,
    status: TaskStatus,
    schedule: Schedule,
    parent_template_id: Option<TaskId>,
    generated_for: Option<NaiveDate>,
    legacy_assignee: Option<UserId>,
    archived_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// User who created the task.
    pub created_by: UserId,
    /// Task title.
    pub title: String,
    /// Free-form description, if any.
    pub details: Option<String>,
    /// Visibility flag.
    pub is_private: bool,
    /// Lifecycle status.
    pub status: TaskStatus,
    /// Scheduling role.
    pub schedule: Schedule,
    /// Spawning template, when the task is an instance.
    pub parent_template_id: Option<TaskId>,
    /// Date the instance was generated for, when the task is an instance.
    pub generated_for: Option<NaiveDate>,
    /// Legacy single-assignee pointer.
    pub legacy_assignee: Option<UserId>,
    /// Archival timestamp; immutable once set.
    pub archived_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new recurring template.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleDomainError::EmptyTitle`] when the title is blank
    /// after trimming.
    pub fn new_template(draft: TemplateDraft, clock: &impl Clock) -> Result<Self, LifecycleDomainError> {
        let title = draft.title.trim().to_owned();
        if title.is_empty() {
            return Err(LifecycleDomainError::EmptyTitle);
        }
        let timestamp = clock.utc();
        Ok(Self {
            id: TaskId::new(),
            organization_id: draft.organization_id,
            created_by: draft.created_by,
            title,
            details: draft.details,
            is_private: draft.is_private,
            status: TaskStatus::Pending,
            schedule: Schedule::Recurring(draft.rule),
            parent_template_id: None,
            generated_for: None,
            legacy_assignee: draft.legacy_assignee,
            archived_at: None,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            organization_id: data.organization_id,
            created_by: data.created_by,
            title: data.title,
            details: data.details,
            is_private: data.is_private,
            status: data.status,
            schedule: data.schedule,
            parent_template_id: data.parent_template_id,
            generated_for: data.generated_for,
            legacy_assignee: data.legacy_assignee,
            archived_at: data.archived_at,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning organization.
    #[must_use]
    pub const fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    /// Returns the creating user.
    #[must_use]
    pub const fn created_by(&self) -> UserId {
        self.created_by
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the free-form description, if any.
    #[must_use]
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Returns the visibility flag.
    #[must_use]
    pub const fn is_private(&self) -> bool {
        self.is_private
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the scheduling role.
    #[must_use]
    pub const fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Returns the spawning template, when this task is an instance.
    #[must_use]
    pub const fn parent_template_id(&self) -> Option<TaskId> {
        self.parent_template_id
    }

    /// Returns the date this instance was generated for.
    #[must_use]
    pub const fn generated_for(&self) -> Option<NaiveDate> {
        self.generated_for
    }

    /// Returns the legacy single-assignee pointer.
    #[must_use]
    pub const fn legacy_assignee(&self) -> Option<UserId> {
        self.legacy_assignee
    }

    /// Returns the archival timestamp, if archived.
    #[must_use]
    pub const fn archived_at(&self) -> Option<DateTime<Utc>> {
        self.archived_at
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns whether this task is a recurring template.
    #[must_use]
    pub const fn is_template(&self) -> bool {
        matches!(self.schedule, Schedule::Recurring(_)) && self.parent_template_id.is_none()
    }

    /// Returns whether this task is an instance spawned from a template.
    #[must_use]
    pub const fn is_instance(&self) -> bool {
        self.parent_template_id.is_some()
    }

    /// Returns the recurrence rule, when this task is a template.
    #[must_use]
    pub const fn recurrence(&self) -> Option<&RecurrenceRule> {
        match &self.schedule {
            Schedule::Recurring(rule) => Some(rule),
            Schedule::OneTime { .. } => None,
        }
    }

    /// Returns the deadline, when this task is a one-time task.
    #[must_use]
    pub const fn deadline(&self) -> Option<NaiveDate> {
        match self.schedule {
            Schedule::OneTime { deadline } => deadline,
            Schedule::Recurring(_) => None,
        }
    }

    /// Spawns a concrete instance of this template for `as_of`.
    ///
    /// The instance copies title, details, visibility, and organization; it
    /// starts in [`TaskStatus::InProgress`] with a deadline one interval past
    /// `as_of`. The legacy single-assignee pointer is carried over only when
    /// that user is absent from `assignees`, so clients reading either field
    /// see each assignee once.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleDomainError::NotATemplate`] when called on an
    /// instance or one-time task, [`LifecycleDomainError::Archived`] when
    /// the template is archived, and deadline-arithmetic errors from
    /// [`RecurrenceRule::instance_deadline`].
    pub fn spawn_instance(
        &self,
        as_of: NaiveDate,
        assignees: &[Assignee],
        clock: &impl Clock,
    ) -> Result<Self, LifecycleDomainError> {
        if self.archived_at.is_some() {
            return Err(LifecycleDomainError::Archived(self.id));
        }
        let rule = self
            .recurrence()
            .filter(|_| self.is_template())
            .ok_or(LifecycleDomainError::NotATemplate(self.id))?;
        let deadline = rule.instance_deadline(as_of)?;
        let legacy_assignee = self
            .legacy_assignee
            .filter(|user| !assignees.iter().any(|assignee| assignee.user_id() == *user));
        let timestamp = clock.utc();
        Ok(Self {
            id: TaskId::new(),
            organization_id: self.organization_id,
            created_by: self.created_by,
            title: self.title.clone(),
            details: self.details.clone(),
            is_private: self.is_private,
            status: TaskStatus::InProgress,
            schedule: Schedule::OneTime {
                deadline: Some(deadline),
            },
            parent_template_id: Some(self.id),
            generated_for: Some(as_of),
            legacy_assignee,
            archived_at: None,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Advances the generation watermark to `generated_for`.
    ///
    /// The watermark is monotonically non-decreasing; advancing it is the
    /// final step of materialization so a failed attempt is retried on the
    /// next tick.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleDomainError::NotATemplate`] when called on a
    /// non-template and [`LifecycleDomainError::WatermarkRewind`] when
    /// `generated_for` precedes the current watermark.
    pub fn advance_watermark(
        &mut self,
        generated_for: NaiveDate,
        clock: &impl Clock,
    ) -> Result<(), LifecycleDomainError> {
        let rule = *self
            .recurrence()
            .filter(|_| self.is_template())
            .ok_or(LifecycleDomainError::NotATemplate(self.id))?;
        let current = rule.last_generated_at();
        if generated_for < current {
            return Err(LifecycleDomainError::WatermarkRewind {
                template_id: self.id,
                current,
                requested: generated_for,
            });
        }
        self.schedule = Schedule::Recurring(rule.with_watermark(generated_for));
        self.touch(clock);
        Ok(())
    }

    /// Applies a status transition after consulting the transition table.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleDomainError::Archived`] for archived tasks and
    /// [`LifecycleDomainError::IllegalTransition`] when the table forbids
    /// the move.
    pub fn apply_status(
        &mut self,
        to: TaskStatus,
        clock: &impl Clock,
    ) -> Result<(), LifecycleDomainError> {
        if self.archived_at.is_some() {
            return Err(LifecycleDomainError::Archived(self.id));
        }
        if !self.status.can_transition_to(to) {
            return Err(LifecycleDomainError::IllegalTransition {
                task_id: self.id,
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.touch(clock);
        Ok(())
    }

    /// Transitions the task to [`TaskStatus::Overdue`] at `now`.
    ///
    /// Used by the bulk sweep, which carries an explicit timestamp rather
    /// than a clock.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleDomainError::Archived`] for archived tasks and
    /// [`LifecycleDomainError::IllegalTransition`] when the current status
    /// is not a permitted overdue source; completed and submitted tasks are
    /// never swept overdue.
    pub fn mark_overdue_at(&mut self, now: DateTime<Utc>) -> Result<(), LifecycleDomainError> {
        if self.archived_at.is_some() {
            return Err(LifecycleDomainError::Archived(self.id));
        }
        if !self.status.can_transition_to(TaskStatus::Overdue) {
            return Err(LifecycleDomainError::IllegalTransition {
                task_id: self.id,
                from: self.status,
                to: TaskStatus::Overdue,
            });
        }
        self.status = TaskStatus::Overdue;
        self.updated_at = now;
        Ok(())
    }

    /// Records the task as archived at `archived_at`.
    ///
    /// `archived_at` is immutable once set; the engine never clears it.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleDomainError::Archived`] when already archived and
    /// [`LifecycleDomainError::NotArchivable`] when the task is not
    /// completed.
    pub fn archive(&mut self, archived_at: DateTime<Utc>) -> Result<(), LifecycleDomainError> {
        if self.archived_at.is_some() {
            return Err(LifecycleDomainError::Archived(self.id));
        }
        if self.status != TaskStatus::Completed {
            return Err(LifecycleDomainError::NotArchivable {
                task_id: self.id,
                status: self.status,
            });
        }
        self.archived_at = Some(archived_at);
        self.updated_at = archived_at;
        Ok(())
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

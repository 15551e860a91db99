//! Instance materialization: turning a due template into a concrete task.

use crate::lifecycle::{
    domain::{Assignee, LifecycleDomainError, Notification, Requirement, Task, TaskId, UserId},
    ports::{Notifier, NotifierError, TaskRepository, TaskRepositoryError},
};
use chrono::NaiveDate;
use mockable::Clock;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for instance materialization.
#[derive(Debug, Error)]
pub enum MaterializeError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] LifecycleDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// Notification delivery failed.
    #[error(transparent)]
    Notifier(#[from] NotifierError),
}

/// Result type for materialization operations.
pub type MaterializeResult<T> = Result<T, MaterializeError>;

/// Outcome of one materialization attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterializeOutcome {
    /// A new instance was created.
    Created(TaskId),
    /// An earlier attempt already created the instance for this date; any
    /// snapshot rows that attempt left behind were backfilled and the
    /// watermark (re-)advanced.
    AlreadyMaterialized,
}

/// Materializes instances from due templates.
///
/// Not idempotent by itself: callers gate on the recurrence evaluator, and
/// the `(template, date)` uniqueness constraint downgrades a raced or
/// retried creation to [`MaterializeOutcome::AlreadyMaterialized`]. The
/// watermark is advanced as the very last step so a partial failure leaves
/// the template eligible for retry on the next tick.
#[derive(Clone)]
pub struct InstanceMaterializer<R, N, C>
where
    R: TaskRepository,
    N: Notifier,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    notifier: Arc<N>,
    clock: Arc<C>,
}

impl<R, N, C> InstanceMaterializer<R, N, C>
where
    R: TaskRepository,
    N: Notifier,
    C: Clock + Send + Sync,
{
    /// Creates a new materializer.
    #[must_use]
    pub const fn new(repository: Arc<R>, notifier: Arc<N>, clock: Arc<C>) -> Self {
        Self {
            repository,
            notifier,
            clock,
        }
    }

    /// Materializes one instance of `template` for `as_of`.
    ///
    /// Copies requirements (text and order) and assignees from the template,
    /// emits one "new recurring task" notification per assignee other than
    /// the template's creator, carries the legacy single-assignee pointer
    /// when it is not already in the copied set, and finally advances the
    /// template's generation watermark.
    ///
    /// # Errors
    ///
    /// Returns [`MaterializeError`] when any step fails; the watermark is
    /// only advanced after every other step succeeded, so a failed attempt
    /// is retried on the next tick.
    pub async fn materialize(
        &self,
        template: &Task,
        as_of: NaiveDate,
    ) -> MaterializeResult<MaterializeOutcome> {
        let requirements = self.repository.requirements_for(template.id()).await?;
        let assignees = self.repository.assignees_for(template.id()).await?;
        let instance = template.spawn_instance(as_of, &assignees, &*self.clock)?;

        let outcome = match self.repository.store_instance(&instance).await {
            Ok(()) => {
                self.repository
                    .store_requirements(instance.id(), &requirements)
                    .await?;
                self.repository
                    .store_assignees(instance.id(), &assignees)
                    .await?;
                self.notify_assignees(template, &instance, &assignees)
                    .await?;
                MaterializeOutcome::Created(instance.id())
            }
            // A crash after instance creation but before the watermark
            // update lands here on retry: finish whatever the failed
            // attempt left undone before moving the watermark.
            Err(TaskRepositoryError::DuplicateInstance { .. }) => {
                self.backfill_snapshot(template, as_of, &requirements, &assignees)
                    .await?;
                MaterializeOutcome::AlreadyMaterialized
            }
            Err(err) => return Err(err.into()),
        };

        let mut advanced = template.clone();
        advanced.advance_watermark(as_of, &*self.clock)?;
        self.repository.update(&advanced).await?;
        Ok(outcome)
    }

    /// Completes the snapshot of an instance an earlier attempt created but
    /// failed to finish.
    ///
    /// Requirements and assignees are only written when the instance has
    /// none of its own yet, and notifications are re-sent only alongside a
    /// backfilled assignee copy, so a fully materialized instance passes
    /// through untouched.
    async fn backfill_snapshot(
        &self,
        template: &Task,
        as_of: NaiveDate,
        requirements: &[Requirement],
        assignees: &[Assignee],
    ) -> MaterializeResult<()> {
        let instances = self.repository.find_instances_of(template.id()).await?;
        let Some(instance) = instances
            .into_iter()
            .find(|candidate| candidate.generated_for() == Some(as_of))
        else {
            return Err(TaskRepositoryError::NotFound(template.id()).into());
        };

        if !requirements.is_empty()
            && self
                .repository
                .requirements_for(instance.id())
                .await?
                .is_empty()
        {
            self.repository
                .store_requirements(instance.id(), requirements)
                .await?;
        }
        if !assignees.is_empty()
            && self
                .repository
                .assignees_for(instance.id())
                .await?
                .is_empty()
        {
            self.repository
                .store_assignees(instance.id(), assignees)
                .await?;
            self.notify_assignees(template, &instance, assignees).await?;
        }
        Ok(())
    }

    /// Emits one "new recurring task" notification per distinct assignee
    /// other than the template's creator, plus one for the legacy pointer
    /// when the instance still carries it.
    async fn notify_assignees(
        &self,
        template: &Task,
        instance: &Task,
        assignees: &[Assignee],
    ) -> MaterializeResult<()> {
        let mut notified: HashSet<UserId> = HashSet::new();
        for assignee in assignees {
            let user = assignee.user_id();
            if user == template.created_by() || !notified.insert(user) {
                continue;
            }
            self.notifier
                .notify(&Notification::recurring_task_created(
                    user,
                    instance.id(),
                    instance.title(),
                ))
                .await?;
        }
        if let Some(legacy) = instance.legacy_assignee()
            && legacy != template.created_by()
        {
            self.notifier
                .notify(&Notification::recurring_task_created(
                    legacy,
                    instance.id(),
                    instance.title(),
                ))
                .await?;
        }
        Ok(())
    }
}

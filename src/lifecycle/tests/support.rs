//! Shared fixtures and test doubles for lifecycle tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, Utc};
use mockable::Clock;

use crate::lifecycle::{
    adapters::memory::InMemoryTaskRepository,
    domain::{
        Assignee, Notification, OrganizationId, PersistedTaskData, Requirement, Schedule, Task,
        TaskId, TaskStatus, UserId,
    },
    ports::{
        Notifier, NotifierError, NotifierResult, TaskRepository, TaskRepositoryError,
        TaskRepositoryResult,
    },
};

/// Clock pinned to a fixed instant.
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Builds a calendar date, panicking on invalid input.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar date")
}

/// Builds a UTC timestamp at noon on the given date.
pub fn at_noon(day: NaiveDate) -> DateTime<Utc> {
    day.and_hms_opt(12, 0, 0)
        .expect("valid time of day")
        .and_utc()
}

/// Builds a persisted one-time task for sweep fixtures.
pub fn one_time_task(
    organization_id: OrganizationId,
    status: TaskStatus,
    deadline: Option<NaiveDate>,
    updated_at: DateTime<Utc>,
) -> Task {
    Task::from_persisted(PersistedTaskData {
        id: TaskId::new(),
        organization_id,
        created_by: UserId::new(),
        title: "Fixture task".to_owned(),
        details: None,
        is_private: false,
        status,
        schedule: Schedule::OneTime { deadline },
        parent_template_id: None,
        generated_for: None,
        legacy_assignee: None,
        archived_at: None,
        created_at: updated_at,
        updated_at,
    })
}

/// Repository double that rejects the first few requirement snapshots and
/// delegates everything else to the in-memory adapter.
///
/// Fixtures seed state through [`Self::inner`] so the failure budget is
/// spent only by the code under test.
pub struct FlakySnapshotRepository {
    inner: InMemoryTaskRepository,
    requirement_failures: AtomicUsize,
}

impl FlakySnapshotRepository {
    /// Creates a double whose first `count` requirement stores fail.
    pub fn failing_requirement_stores(count: usize) -> Self {
        Self {
            inner: InMemoryTaskRepository::new(),
            requirement_failures: AtomicUsize::new(count),
        }
    }

    /// Direct handle to the backing store, bypassing injected failures.
    pub const fn inner(&self) -> &InMemoryTaskRepository {
        &self.inner
    }
}

#[async_trait]
impl TaskRepository for FlakySnapshotRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        self.inner.store(task).await
    }

    async fn store_instance(&self, instance: &Task) -> TaskRepositoryResult<()> {
        self.inner.store_instance(instance).await
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        self.inner.update(task).await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.inner.find_by_id(id).await
    }

    async fn find_instances_of(&self, template_id: TaskId) -> TaskRepositoryResult<Vec<Task>> {
        self.inner.find_instances_of(template_id).await
    }

    async fn due_template_candidates(&self, as_of: NaiveDate) -> TaskRepositoryResult<Vec<Task>> {
        self.inner.due_template_candidates(as_of).await
    }

    async fn requirements_for(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<Requirement>> {
        self.inner.requirements_for(task_id).await
    }

    async fn store_requirements(
        &self,
        task_id: TaskId,
        requirements: &[Requirement],
    ) -> TaskRepositoryResult<()> {
        if self
            .requirement_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok()
        {
            return Err(TaskRepositoryError::persistence(std::io::Error::other(
                "requirement store unavailable",
            )));
        }
        self.inner.store_requirements(task_id, requirements).await
    }

    async fn assignees_for(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<Assignee>> {
        self.inner.assignees_for(task_id).await
    }

    async fn store_assignees(
        &self,
        task_id: TaskId,
        assignees: &[Assignee],
    ) -> TaskRepositoryResult<()> {
        self.inner.store_assignees(task_id, assignees).await
    }

    async fn sweep_overdue(&self, now: DateTime<Utc>) -> TaskRepositoryResult<usize> {
        self.inner.sweep_overdue(now).await
    }

    async fn archive_candidates(
        &self,
        organization_id: OrganizationId,
        cutoff: DateTime<Utc>,
    ) -> TaskRepositoryResult<Vec<Task>> {
        self.inner.archive_candidates(organization_id, cutoff).await
    }
}

/// Notifier double that rejects every notification.
#[derive(Debug, Clone, Default)]
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(&self, _notification: &Notification) -> NotifierResult<()> {
        Err(NotifierError::sink(std::io::Error::other(
            "notification sink unavailable",
        )))
    }
}

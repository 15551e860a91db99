//! Tests for the bulk overdue sweep.

use std::sync::Arc;

use super::support::{at_noon, date, one_time_task};
use crate::lifecycle::{
    adapters::memory::InMemoryTaskRepository,
    domain::{OrganizationId, TaskStatus},
    ports::TaskRepository,
    services::OverdueSweeper,
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sweep_marks_only_eligible_deadline_holders() {
    let repository = Arc::new(InMemoryTaskRepository::new());
    let organization = OrganizationId::new();
    let now = at_noon(date(2025, 2, 1));
    let past = date(2025, 1, 15);

    let lapsed_pending = one_time_task(organization, TaskStatus::Pending, Some(past), now);
    let lapsed_in_progress = one_time_task(organization, TaskStatus::InProgress, Some(past), now);
    let lapsed_submitted = one_time_task(organization, TaskStatus::Submitted, Some(past), now);
    let lapsed_completed = one_time_task(organization, TaskStatus::Completed, Some(past), now);
    let undated = one_time_task(organization, TaskStatus::Pending, None, now);
    let future = one_time_task(
        organization,
        TaskStatus::Pending,
        Some(date(2025, 2, 10)),
        now,
    );
    for task in [
        &lapsed_pending,
        &lapsed_in_progress,
        &lapsed_submitted,
        &lapsed_completed,
        &undated,
        &future,
    ] {
        repository.store(task).await.expect("fixture stores");
    }

    let sweeper = OverdueSweeper::new(Arc::clone(&repository));
    let transitioned = sweeper.sweep(now).await.expect("sweep succeeds");
    assert_eq!(transitioned, 2);

    for (task, expected) in [
        (&lapsed_pending, TaskStatus::Overdue),
        (&lapsed_in_progress, TaskStatus::Overdue),
        (&lapsed_submitted, TaskStatus::Submitted),
        (&lapsed_completed, TaskStatus::Completed),
        (&undated, TaskStatus::Pending),
        (&future, TaskStatus::Pending),
    ] {
        let stored = repository
            .find_by_id(task.id())
            .await
            .expect("lookup succeeds")
            .expect("task exists");
        assert_eq!(stored.status(), expected);
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deadline_on_today_is_not_yet_overdue() {
    let repository = Arc::new(InMemoryTaskRepository::new());
    let now = at_noon(date(2025, 2, 1));
    let due_today = one_time_task(
        OrganizationId::new(),
        TaskStatus::InProgress,
        Some(date(2025, 2, 1)),
        now,
    );
    repository.store(&due_today).await.expect("fixture stores");

    let sweeper = OverdueSweeper::new(Arc::clone(&repository));
    let transitioned = sweeper.sweep(now).await.expect("sweep succeeds");
    assert_eq!(transitioned, 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sweep_is_idempotent() {
    let repository = Arc::new(InMemoryTaskRepository::new());
    let now = at_noon(date(2025, 2, 1));
    let lapsed = one_time_task(
        OrganizationId::new(),
        TaskStatus::Pending,
        Some(date(2025, 1, 15)),
        now,
    );
    repository.store(&lapsed).await.expect("fixture stores");

    let sweeper = OverdueSweeper::new(Arc::clone(&repository));
    assert_eq!(sweeper.sweep(now).await.expect("first sweep"), 1);
    assert_eq!(sweeper.sweep(now).await.expect("second sweep"), 0);
}

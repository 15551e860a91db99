//! Tests for the per-organization archival sweep.

use std::sync::Arc;

use super::support::{at_noon, date, one_time_task};
use crate::lifecycle::{
    adapters::memory::{InMemoryArchivePolicyStore, InMemoryTaskRepository, RecordingAuditLog},
    domain::{
        ArchiveSchedule, AuditAction, AuditActor, OrganizationArchivePolicy, OrganizationId,
        TaskStatus,
    },
    ports::TaskRepository,
    services::{ArchiveSweepError, ArchiveSweeper},
};
use rstest::{fixture, rstest};
use serde_json::json;

type TestSweeper =
    ArchiveSweeper<InMemoryTaskRepository, InMemoryArchivePolicyStore, RecordingAuditLog>;

struct Harness {
    repository: Arc<InMemoryTaskRepository>,
    policies: Arc<InMemoryArchivePolicyStore>,
    audit: Arc<RecordingAuditLog>,
    sweeper: TestSweeper,
}

#[fixture]
fn harness() -> Harness {
    let repository = Arc::new(InMemoryTaskRepository::new());
    let policies = Arc::new(InMemoryArchivePolicyStore::new());
    let audit = Arc::new(RecordingAuditLog::new());
    let sweeper = ArchiveSweeper::new(
        Arc::clone(&repository),
        Arc::clone(&policies),
        Arc::clone(&audit),
    );
    Harness {
        repository,
        policies,
        audit,
        sweeper,
    }
}

fn policy(
    organization: OrganizationId,
    enabled: bool,
    retention_days: u32,
    schedule: ArchiveSchedule,
) -> OrganizationArchivePolicy {
    OrganizationArchivePolicy::new(organization, enabled, retention_days, schedule)
        .expect("valid policy")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sweep_archives_completed_tasks_past_the_retention_window(harness: Harness) {
    let organization = OrganizationId::new();
    harness
        .policies
        .upsert(policy(organization, true, 7, ArchiveSchedule::Daily))
        .expect("policy stores");

    let now = at_noon(date(2025, 2, 10));
    let stale = one_time_task(
        organization,
        TaskStatus::Completed,
        None,
        at_noon(date(2025, 1, 20)),
    );
    let fresh = one_time_task(
        organization,
        TaskStatus::Completed,
        None,
        at_noon(date(2025, 2, 8)),
    );
    let open = one_time_task(
        organization,
        TaskStatus::InProgress,
        None,
        at_noon(date(2025, 1, 20)),
    );
    for task in [&stale, &fresh, &open] {
        harness.repository.store(task).await.expect("fixture stores");
    }

    let archived = harness
        .sweeper
        .sweep(ArchiveSchedule::Daily, now)
        .await
        .expect("sweep succeeds");
    assert_eq!(archived, 1);

    let stored = harness
        .repository
        .find_by_id(stale.id())
        .await
        .expect("lookup succeeds")
        .expect("task exists");
    assert_eq!(stored.archived_at(), Some(now));
    for untouched in [&fresh, &open] {
        let stored = harness
            .repository
            .find_by_id(untouched.id())
            .await
            .expect("lookup succeeds")
            .expect("task exists");
        assert_eq!(stored.archived_at(), None);
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sweep_records_a_system_audit_entry_per_task(harness: Harness) {
    let organization = OrganizationId::new();
    harness
        .policies
        .upsert(policy(organization, true, 30, ArchiveSchedule::WeeklySunday))
        .expect("policy stores");
    let stale = one_time_task(
        organization,
        TaskStatus::Completed,
        None,
        at_noon(date(2025, 1, 1)),
    );
    harness.repository.store(&stale).await.expect("fixture stores");

    harness
        .sweeper
        .sweep(ArchiveSchedule::WeeklySunday, at_noon(date(2025, 3, 2)))
        .await
        .expect("sweep succeeds");

    let entries = harness.audit.entries().expect("entries recorded");
    assert_eq!(entries.len(), 1);
    let entry = entries.first().expect("entry recorded");
    assert_eq!(entry.task_id(), stale.id());
    assert_eq!(entry.actor(), AuditActor::System);
    assert_eq!(entry.action(), AuditAction::AutoArchived);
    assert_eq!(
        entry.metadata(),
        &json!({
            "auto_archive_after_days": 30,
            "schedule_type": "weekly_sunday",
        })
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sweep_skips_disabled_and_mismatched_policies(harness: Harness) {
    let disabled_org = OrganizationId::new();
    let weekly_org = OrganizationId::new();
    harness
        .policies
        .upsert(policy(disabled_org, false, 7, ArchiveSchedule::Daily))
        .expect("policy stores");
    harness
        .policies
        .upsert(policy(weekly_org, true, 7, ArchiveSchedule::WeeklyMonday))
        .expect("policy stores");
    let now = at_noon(date(2025, 2, 10));
    for organization in [disabled_org, weekly_org] {
        let stale = one_time_task(
            organization,
            TaskStatus::Completed,
            None,
            at_noon(date(2025, 1, 1)),
        );
        harness.repository.store(&stale).await.expect("fixture stores");
    }

    let archived = harness
        .sweeper
        .sweep(ArchiveSchedule::Daily, now)
        .await
        .expect("sweep succeeds");
    assert_eq!(archived, 0);
    assert!(harness.audit.entries().expect("entries recorded").is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sweep_one_requires_a_configured_policy(harness: Harness) {
    let organization = OrganizationId::new();
    let result = harness
        .sweeper
        .sweep_one(organization, at_noon(date(2025, 2, 10)))
        .await;
    assert!(matches!(
        result,
        Err(ArchiveSweepError::NoPolicy(missing)) if missing == organization
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sweep_one_backfills_a_single_organization(harness: Harness) {
    let target = OrganizationId::new();
    let other = OrganizationId::new();
    harness
        .policies
        .upsert(policy(target, true, 7, ArchiveSchedule::Daily))
        .expect("policy stores");
    harness
        .policies
        .upsert(policy(other, true, 7, ArchiveSchedule::Daily))
        .expect("policy stores");
    let now = at_noon(date(2025, 2, 10));
    let target_task = one_time_task(
        target,
        TaskStatus::Completed,
        None,
        at_noon(date(2025, 1, 1)),
    );
    let other_task = one_time_task(
        other,
        TaskStatus::Completed,
        None,
        at_noon(date(2025, 1, 1)),
    );
    for task in [&target_task, &other_task] {
        harness.repository.store(task).await.expect("fixture stores");
    }

    let archived = harness
        .sweeper
        .sweep_one(target, now)
        .await
        .expect("backfill succeeds");
    assert_eq!(archived, 1);

    let untouched = harness
        .repository
        .find_by_id(other_task.id())
        .await
        .expect("lookup succeeds")
        .expect("task exists");
    assert_eq!(untouched.archived_at(), None);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cutoff_boundary_is_exclusive(harness: Harness) {
    let organization = OrganizationId::new();
    harness
        .policies
        .upsert(policy(organization, true, 7, ArchiveSchedule::Daily))
        .expect("policy stores");
    let now = at_noon(date(2025, 2, 10));
    // Last touched exactly at the cutoff instant: retained.
    let boundary = one_time_task(
        organization,
        TaskStatus::Completed,
        None,
        at_noon(date(2025, 2, 3)),
    );
    harness
        .repository
        .store(&boundary)
        .await
        .expect("fixture stores");

    let archived = harness
        .sweeper
        .sweep(ArchiveSchedule::Daily, now)
        .await
        .expect("sweep succeeds");
    assert_eq!(archived, 0);
}

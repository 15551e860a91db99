//! Domain-focused tests for the task aggregate.

use super::support::{FixedClock, at_noon, date};
use crate::lifecycle::domain::{
    ArchiveSchedule, Assignee, Cadence, LifecycleDomainError, OrganizationArchivePolicy,
    OrganizationId, RecurrenceRule, Schedule, Task, TaskStatus, TemplateDraft, UserId,
};
use rstest::{fixture, rstest};

#[fixture]
fn clock() -> FixedClock {
    FixedClock(at_noon(date(2025, 1, 1)))
}

fn weekly_rule() -> RecurrenceRule {
    RecurrenceRule::new(Cadence::Weekly, 2, date(2025, 1, 6), None).expect("valid rule")
}

fn template(clock: &FixedClock) -> Task {
    let draft = TemplateDraft::new(
        OrganizationId::new(),
        UserId::new(),
        "Fortnightly report",
        weekly_rule(),
    )
    .with_details("Compile the fortnightly status report");
    Task::new_template(draft, clock).expect("valid template")
}

#[rstest]
fn new_template_starts_pending_with_watermark_at_start(clock: FixedClock) {
    let task = template(&clock);

    assert!(task.is_template());
    assert!(!task.is_instance());
    assert_eq!(task.status(), TaskStatus::Pending);
    assert_eq!(task.archived_at(), None);
    let rule = task.recurrence().expect("recurring schedule");
    assert_eq!(rule.last_generated_at(), date(2025, 1, 6));
}

#[rstest]
fn new_template_rejects_blank_title(clock: FixedClock) {
    let draft = TemplateDraft::new(OrganizationId::new(), UserId::new(), "   ", weekly_rule());
    assert_eq!(
        Task::new_template(draft, &clock),
        Err(LifecycleDomainError::EmptyTitle)
    );
}

#[rstest]
fn spawn_instance_copies_fields_and_sets_deadline(clock: FixedClock) {
    let source = template(&clock);
    let instance = source
        .spawn_instance(date(2025, 1, 20), &[], &clock)
        .expect("instance spawns");

    assert!(instance.is_instance());
    assert_eq!(instance.parent_template_id(), Some(source.id()));
    assert_eq!(instance.generated_for(), Some(date(2025, 1, 20)));
    assert_eq!(instance.status(), TaskStatus::InProgress);
    assert_eq!(instance.title(), source.title());
    assert_eq!(instance.details(), source.details());
    assert_eq!(instance.organization_id(), source.organization_id());
    // Two-week cadence: the instance is due one interval after generation.
    assert_eq!(
        instance.schedule(),
        &Schedule::OneTime {
            deadline: Some(date(2025, 2, 3)),
        }
    );
}

#[rstest]
fn spawn_instance_drops_legacy_pointer_already_in_assignee_set(clock: FixedClock) {
    let creator = UserId::new();
    let legacy = UserId::new();
    let draft = TemplateDraft::new(OrganizationId::new(), creator, "Weekly sync", weekly_rule())
        .with_legacy_assignee(legacy);
    let source = Task::new_template(draft, &clock).expect("valid template");

    let duplicated = source
        .spawn_instance(date(2025, 1, 20), &[Assignee::new(legacy, creator)], &clock)
        .expect("instance spawns");
    assert_eq!(duplicated.legacy_assignee(), None);

    let carried = source
        .spawn_instance(date(2025, 1, 20), &[], &clock)
        .expect("instance spawns");
    assert_eq!(carried.legacy_assignee(), Some(legacy));
}

#[rstest]
fn spawn_instance_rejects_non_templates(clock: FixedClock) {
    let source = template(&clock);
    let instance = source
        .spawn_instance(date(2025, 1, 20), &[], &clock)
        .expect("instance spawns");

    let result = instance.spawn_instance(date(2025, 2, 3), &[], &clock);
    assert_eq!(
        result,
        Err(LifecycleDomainError::NotATemplate(instance.id()))
    );
}

#[rstest]
fn advance_watermark_is_monotonic(clock: FixedClock) {
    let mut task = template(&clock);
    task.advance_watermark(date(2025, 1, 20), &clock)
        .expect("first advance");
    task.advance_watermark(date(2025, 1, 20), &clock)
        .expect("same date re-advance is permitted");

    let result = task.advance_watermark(date(2025, 1, 13), &clock);
    assert_eq!(
        result,
        Err(LifecycleDomainError::WatermarkRewind {
            template_id: task.id(),
            current: date(2025, 1, 20),
            requested: date(2025, 1, 13),
        })
    );
}

#[rstest]
fn apply_status_consults_transition_table(clock: FixedClock) {
    let mut task = template(&clock);
    task.apply_status(TaskStatus::InProgress, &clock)
        .expect("pending to in_progress");

    let result = task.apply_status(TaskStatus::Completed, &clock);
    assert_eq!(
        result,
        Err(LifecycleDomainError::IllegalTransition {
            task_id: task.id(),
            from: TaskStatus::InProgress,
            to: TaskStatus::Completed,
        })
    );
}

#[rstest]
fn archive_requires_completed_status(clock: FixedClock) {
    let mut task = template(&clock);
    let now = at_noon(date(2025, 3, 1));

    let result = task.archive(now);
    assert_eq!(
        result,
        Err(LifecycleDomainError::NotArchivable {
            task_id: task.id(),
            status: TaskStatus::Pending,
        })
    );

    task.apply_status(TaskStatus::InProgress, &clock)
        .expect("to in_progress");
    task.apply_status(TaskStatus::Submitted, &clock)
        .expect("to submitted");
    task.apply_status(TaskStatus::Completed, &clock)
        .expect("to completed");
    task.archive(now).expect("archives once completed");
    assert_eq!(task.archived_at(), Some(now));

    // archived_at is immutable once set.
    assert_eq!(
        task.archive(at_noon(date(2025, 3, 2))),
        Err(LifecycleDomainError::Archived(task.id()))
    );
    assert_eq!(task.archived_at(), Some(now));
}

#[rstest]
fn archived_tasks_reject_status_changes(clock: FixedClock) {
    let mut task = template(&clock);
    task.apply_status(TaskStatus::InProgress, &clock)
        .expect("to in_progress");
    task.apply_status(TaskStatus::Submitted, &clock)
        .expect("to submitted");
    task.apply_status(TaskStatus::Completed, &clock)
        .expect("to completed");
    task.archive(at_noon(date(2025, 3, 1))).expect("archives");

    let result = task.apply_status(TaskStatus::InProgress, &clock);
    assert_eq!(result, Err(LifecycleDomainError::Archived(task.id())));
}

#[rstest]
fn mark_overdue_at_is_not_reapplied(clock: FixedClock) {
    let mut task = template(&clock);
    task.apply_status(TaskStatus::InProgress, &clock)
        .expect("to in_progress");

    let now = at_noon(date(2025, 2, 1));
    task.mark_overdue_at(now).expect("in_progress to overdue");
    assert_eq!(task.status(), TaskStatus::Overdue);
    assert_eq!(task.updated_at(), now);

    let result = task.mark_overdue_at(now);
    assert!(matches!(
        result,
        Err(LifecycleDomainError::IllegalTransition { .. })
    ));
}

#[rstest]
fn policy_cutoff_subtracts_retention_window() {
    let policy = OrganizationArchivePolicy::new(
        OrganizationId::new(),
        true,
        7,
        ArchiveSchedule::WeeklySunday,
    )
    .expect("valid policy");
    let now = at_noon(date(2025, 1, 9));
    assert_eq!(policy.cutoff(now), at_noon(date(2025, 1, 2)));
}

#[rstest]
fn zero_retention_policy_is_rejected() {
    let result =
        OrganizationArchivePolicy::new(OrganizationId::new(), true, 0, ArchiveSchedule::Daily);
    assert_eq!(result, Err(LifecycleDomainError::ZeroRetention));
}

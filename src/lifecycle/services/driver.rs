//! Lifecycle tick orchestration.
//!
//! One tick runs instance generation, then the overdue sweep, then an
//! archival sweep for each archive schedule tag the trigger requested. The
//! tick holds an advisory lease throughout so concurrent driver replicas
//! cannot double-generate instances. "Today" is the UTC date of the
//! injected clock.

use super::{
    ArchiveSweepError, ArchiveSweeper, InstanceMaterializer, MaterializeOutcome, OverdueSweepError,
    OverdueSweeper,
};
use crate::lifecycle::{
    domain::{ArchiveSchedule, Task},
    ports::{
        ArchivePolicyStore, AuditLog, LeaseStore, LeaseStoreError, Notifier, TaskRepository,
        TaskRepositoryError,
    },
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// Name of the advisory lease guarding the tick.
pub const TICK_LEASE_NAME: &str = "lifecycle_tick";

/// Lease lifetime; comfortably longer than any tick, short enough that a
/// crashed driver does not block the schedule for long.
fn lease_ttl() -> Duration {
    Duration::hours(1)
}

/// Errors aborting an entire tick.
///
/// Per-template and per-organization failures are isolated and logged, not
/// surfaced here; the driver has no caller in the request sense.
#[derive(Debug, Error)]
pub enum TickError {
    /// Another driver holds the tick lease; the tick was skipped.
    #[error("tick lease '{0}' is held by another driver")]
    LeaseUnavailable(String),
    /// Lease store operation failed.
    #[error(transparent)]
    Lease(#[from] LeaseStoreError),
    /// Template enumeration failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// The overdue sweep failed.
    #[error(transparent)]
    Overdue(#[from] OverdueSweepError),
    /// The archival sweep failed at the policy level.
    #[error(transparent)]
    Archive(#[from] ArchiveSweepError),
}

/// Selects the work of one tick.
///
/// Generation and the overdue sweep always run; archival runs only for the
/// schedule tags the external trigger matched, since it fires on a coarser
/// cadence than the daily tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickRequest {
    archive_schedules: Vec<ArchiveSchedule>,
}

impl TickRequest {
    /// Creates a generation + overdue tick with no archival.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            archive_schedules: Vec::new(),
        }
    }

    /// Adds an archival sweep for the given schedule tag.
    #[must_use]
    pub fn with_archive_schedule(mut self, schedule: ArchiveSchedule) -> Self {
        self.archive_schedules.push(schedule);
        self
    }

    /// Returns the requested archival schedule tags.
    #[must_use]
    pub fn archive_schedules(&self) -> &[ArchiveSchedule] {
        &self.archive_schedules
    }
}

/// Counters summarizing one completed tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Templates enumerated as generation candidates.
    pub templates_checked: usize,
    /// Instances materialized this tick.
    pub instances_created: usize,
    /// Tasks transitioned to overdue.
    pub tasks_marked_overdue: usize,
    /// Tasks archived across all requested schedules.
    pub tasks_archived: usize,
}

/// Periodic trigger entry point for the lifecycle engine.
#[derive(Clone)]
pub struct LifecycleDriver<R, P, N, A, L, C>
where
    R: TaskRepository,
    P: ArchivePolicyStore,
    N: Notifier,
    A: AuditLog,
    L: LeaseStore,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    materializer: InstanceMaterializer<R, N, C>,
    overdue: OverdueSweeper<R>,
    archiver: ArchiveSweeper<R, P, A>,
    leases: Arc<L>,
    clock: Arc<C>,
}

impl<R, P, N, A, L, C> LifecycleDriver<R, P, N, A, L, C>
where
    R: TaskRepository,
    P: ArchivePolicyStore,
    N: Notifier,
    A: AuditLog,
    L: LeaseStore,
    C: Clock + Send + Sync,
{
    /// Creates a driver wired to the given ports.
    #[must_use]
    pub fn new(
        repository: Arc<R>,
        policies: Arc<P>,
        notifier: Arc<N>,
        audit: Arc<A>,
        leases: Arc<L>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            materializer: InstanceMaterializer::new(
                Arc::clone(&repository),
                notifier,
                Arc::clone(&clock),
            ),
            overdue: OverdueSweeper::new(Arc::clone(&repository)),
            archiver: ArchiveSweeper::new(Arc::clone(&repository), policies, audit),
            repository,
            leases,
            clock,
        }
    }

    /// Returns the archival sweeper, for operator-triggered single-
    /// organization backfills.
    #[must_use]
    pub const fn archiver(&self) -> &ArchiveSweeper<R, P, A> {
        &self.archiver
    }

    /// Runs one tick now: generation, overdue sweep, and any requested
    /// archival sweeps, under the advisory lease.
    ///
    /// Also serves as the synchronous operator entry point for backfills
    /// and tests.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::LeaseUnavailable`] when another driver holds
    /// the lease, and tick-level failures otherwise. Per-item failures are
    /// logged and isolated, never surfaced.
    pub async fn run_tick(&self, request: TickRequest) -> Result<TickSummary, TickError> {
        let now = self.clock.utc();
        let lease = self
            .leases
            .acquire(TICK_LEASE_NAME, lease_ttl(), now)
            .await?
            .ok_or_else(|| TickError::LeaseUnavailable(TICK_LEASE_NAME.to_owned()))?;

        let result = self.run_phases(&request, now).await;

        if let Err(release_err) = self.leases.release(&lease).await {
            warn!(error = %release_err, "failed to release tick lease; expiry will reclaim it");
        }
        let summary = result?;
        info!(
            templates_checked = summary.templates_checked,
            instances_created = summary.instances_created,
            tasks_marked_overdue = summary.tasks_marked_overdue,
            tasks_archived = summary.tasks_archived,
            "lifecycle tick complete",
        );
        Ok(summary)
    }

    async fn run_phases(
        &self,
        request: &TickRequest,
        now: DateTime<Utc>,
    ) -> Result<TickSummary, TickError> {
        let today = now.date_naive();
        let mut summary = TickSummary::default();

        let candidates = self.repository.due_template_candidates(today).await?;
        summary.templates_checked = candidates.len();
        for template in &candidates {
            summary.instances_created += self.generate_for(template, today).await;
        }

        summary.tasks_marked_overdue = self.overdue.sweep(now).await?;

        for schedule in request.archive_schedules() {
            summary.tasks_archived += self.archiver.sweep(*schedule, now).await?;
        }

        Ok(summary)
    }

    /// Evaluates and materializes one template, isolating its failures.
    ///
    /// Returns 1 when a new instance was created, 0 otherwise.
    async fn generate_for(&self, template: &Task, today: NaiveDate) -> usize {
        let due = template.recurrence().is_some_and(|rule| rule.is_due(today));
        if !due {
            return 0;
        }
        match self.materializer.materialize(template, today).await {
            Ok(MaterializeOutcome::Created(_)) => 1,
            Ok(MaterializeOutcome::AlreadyMaterialized) => 0,
            Err(err) => {
                // Watermark untouched: the next tick retries this template.
                error!(
                    template_id = %template.id(),
                    error = %err,
                    "instance materialization failed",
                );
                0
            }
        }
    }
}

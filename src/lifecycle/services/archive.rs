//! Archival sweep: per-organization retention of completed tasks.

use crate::lifecycle::{
    domain::{ArchiveSchedule, AuditEntry, LifecycleDomainError, OrganizationArchivePolicy, OrganizationId},
    ports::{
        ArchivePolicyStore, ArchivePolicyStoreError, AuditLog, AuditLogError, TaskRepository,
        TaskRepositoryError,
    },
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

/// Service-level errors for the archival sweep.
#[derive(Debug, Error)]
pub enum ArchiveSweepError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] LifecycleDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// Policy store operation failed.
    #[error(transparent)]
    Policy(#[from] ArchivePolicyStoreError),
    /// Audit write failed.
    #[error(transparent)]
    Audit(#[from] AuditLogError),
    /// The organization has no archival policy configured.
    #[error("no archival policy configured for organization {0}")]
    NoPolicy(OrganizationId),
}

/// Result type for archival sweep operations.
pub type ArchiveSweepResult<T> = Result<T, ArchiveSweepError>;

/// Archives completed tasks older than each organization's retention
/// window.
#[derive(Clone)]
pub struct ArchiveSweeper<R, P, A>
where
    R: TaskRepository,
    P: ArchivePolicyStore,
    A: AuditLog,
{
    repository: Arc<R>,
    policies: Arc<P>,
    audit: Arc<A>,
}

impl<R, P, A> ArchiveSweeper<R, P, A>
where
    R: TaskRepository,
    P: ArchivePolicyStore,
    A: AuditLog,
{
    /// Creates a new archival sweeper.
    #[must_use]
    pub const fn new(repository: Arc<R>, policies: Arc<P>, audit: Arc<A>) -> Self {
        Self {
            repository,
            policies,
            audit,
        }
    }

    /// Sweeps every organization whose enabled policy matches `schedule`,
    /// returning the number of tasks archived.
    ///
    /// Per-organization failures are logged with the organization key and
    /// do not abort the sweep for the remaining organizations.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveSweepError::Policy`] when the policy enumeration
    /// itself fails.
    pub async fn sweep(
        &self,
        schedule: ArchiveSchedule,
        now: DateTime<Utc>,
    ) -> ArchiveSweepResult<usize> {
        let policies = self.policies.enabled_policies_for(schedule).await?;
        let mut archived = 0_usize;
        for policy in policies {
            match self.sweep_organization(&policy, now).await {
                Ok(count) => archived += count,
                Err(err) => {
                    error!(
                        organization_id = %policy.organization_id(),
                        error = %err,
                        "archival sweep failed for organization",
                    );
                }
            }
        }
        Ok(archived)
    }

    /// Sweeps a single organization on demand, for operator-triggered
    /// backfills outside the normal trigger.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveSweepError::NoPolicy`] when the organization has no
    /// configured policy, and the underlying repository or audit errors
    /// otherwise.
    pub async fn sweep_one(
        &self,
        organization_id: OrganizationId,
        now: DateTime<Utc>,
    ) -> ArchiveSweepResult<usize> {
        let policy = self
            .policies
            .policy_for(organization_id)
            .await?
            .ok_or(ArchiveSweepError::NoPolicy(organization_id))?;
        self.sweep_organization(&policy, now).await
    }

    async fn sweep_organization(
        &self,
        policy: &OrganizationArchivePolicy,
        now: DateTime<Utc>,
    ) -> ArchiveSweepResult<usize> {
        let cutoff = policy.cutoff(now);
        let candidates = self
            .repository
            .archive_candidates(policy.organization_id(), cutoff)
            .await?;
        let mut archived = 0_usize;
        for mut task in candidates {
            task.archive(now)?;
            self.repository.update(&task).await?;
            self.audit
                .record(&AuditEntry::auto_archived(
                    task.id(),
                    policy.retention_days(),
                    policy.schedule(),
                ))
                .await?;
            archived += 1;
        }
        Ok(archived)
    }
}

//! Organization archival policy store port.

use crate::lifecycle::domain::{ArchiveSchedule, OrganizationArchivePolicy, OrganizationId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for policy store operations.
pub type ArchivePolicyStoreResult<T> = Result<T, ArchivePolicyStoreError>;

/// Read contract over per-organization archival settings.
#[async_trait]
pub trait ArchivePolicyStore: Send + Sync {
    /// Returns the enabled policies whose configured cadence matches
    /// `schedule`.
    async fn enabled_policies_for(
        &self,
        schedule: ArchiveSchedule,
    ) -> ArchivePolicyStoreResult<Vec<OrganizationArchivePolicy>>;

    /// Returns one organization's policy, when configured.
    async fn policy_for(
        &self,
        organization_id: OrganizationId,
    ) -> ArchivePolicyStoreResult<Option<OrganizationArchivePolicy>>;
}

/// Errors returned by policy store implementations.
#[derive(Debug, Clone, Error)]
pub enum ArchivePolicyStoreError {
    /// A persisted policy row could not be mapped into the domain.
    #[error("invalid policy for organization {organization_id}: {reason}")]
    InvalidPolicy {
        /// Organization whose policy failed to map.
        organization_id: OrganizationId,
        /// Human-readable mapping failure.
        reason: String,
    },

    /// Persistence-layer failure.
    #[error("policy store error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ArchivePolicyStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

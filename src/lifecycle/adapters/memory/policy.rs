//! In-memory archival policy store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::lifecycle::{
    domain::{ArchiveSchedule, OrganizationArchivePolicy, OrganizationId},
    ports::{ArchivePolicyStore, ArchivePolicyStoreError, ArchivePolicyStoreResult},
};

/// Thread-safe in-memory policy store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryArchivePolicyStore {
    policies: Arc<RwLock<HashMap<OrganizationId, OrganizationArchivePolicy>>>,
}

impl InMemoryArchivePolicyStore {
    /// Creates an empty policy store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces one organization's policy.
    ///
    /// # Errors
    ///
    /// Returns [`ArchivePolicyStoreError`] when the store lock is poisoned.
    pub fn upsert(&self, policy: OrganizationArchivePolicy) -> ArchivePolicyStoreResult<()> {
        let mut policies = self.policies.write().map_err(|err| {
            ArchivePolicyStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        policies.insert(policy.organization_id(), policy);
        Ok(())
    }
}

#[async_trait]
impl ArchivePolicyStore for InMemoryArchivePolicyStore {
    async fn enabled_policies_for(
        &self,
        schedule: ArchiveSchedule,
    ) -> ArchivePolicyStoreResult<Vec<OrganizationArchivePolicy>> {
        let policies = self.policies.read().map_err(|err| {
            ArchivePolicyStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let mut matching: Vec<OrganizationArchivePolicy> = policies
            .values()
            .filter(|policy| policy.enabled() && policy.schedule() == schedule)
            .copied()
            .collect();
        matching.sort_by_key(|policy| policy.organization_id().into_inner());
        Ok(matching)
    }

    async fn policy_for(
        &self,
        organization_id: OrganizationId,
    ) -> ArchivePolicyStoreResult<Option<OrganizationArchivePolicy>> {
        let policies = self.policies.read().map_err(|err| {
            ArchivePolicyStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(policies.get(&organization_id).copied())
    }
}

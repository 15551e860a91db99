//! In-memory advisory lease store.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::lifecycle::{
    domain::TickLease,
    ports::{LeaseStore, LeaseStoreError, LeaseStoreResult},
};

/// Thread-safe in-memory lease store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLeaseStore {
    leases: Arc<RwLock<HashMap<String, TickLease>>>,
}

impl InMemoryLeaseStore {
    /// Creates an empty lease store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LeaseStore for InMemoryLeaseStore {
    async fn acquire(
        &self,
        name: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> LeaseStoreResult<Option<TickLease>> {
        let mut leases = self
            .leases
            .write()
            .map_err(|err| LeaseStoreError::persistence(std::io::Error::other(err.to_string())))?;
        if let Some(held) = leases.get(name)
            && !held.is_expired(now)
        {
            return Ok(None);
        }
        let lease = TickLease::new(name, now + ttl);
        leases.insert(name.to_owned(), lease.clone());
        Ok(Some(lease))
    }

    async fn release(&self, lease: &TickLease) -> LeaseStoreResult<()> {
        let mut leases = self
            .leases
            .write()
            .map_err(|err| LeaseStoreError::persistence(std::io::Error::other(err.to_string())))?;
        if leases
            .get(lease.name())
            .is_some_and(|held| held.holder() == lease.holder())
        {
            leases.remove(lease.name());
        }
        Ok(())
    }
}

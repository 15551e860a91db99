//! Advisory lease store port.

use crate::lifecycle::domain::TickLease;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for lease store operations.
pub type LeaseStoreResult<T> = Result<T, LeaseStoreError>;

/// Mutual-exclusion contract for the lifecycle tick.
///
/// A lease is either free (absent or expired) and may be acquired, or held
/// by another driver, in which case `acquire` returns `None` and the tick
/// is skipped.
#[async_trait]
pub trait LeaseStore: Send + Sync {
    /// Attempts to acquire the named lease for `ttl` starting at `now`.
    ///
    /// Returns the held lease, or `None` when another holder has an
    /// unexpired claim.
    async fn acquire(
        &self,
        name: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> LeaseStoreResult<Option<TickLease>>;

    /// Releases a held lease.
    ///
    /// Releasing a lease the store no longer attributes to this holder is a
    /// no-op; the expiry already reclaimed it.
    async fn release(&self, lease: &TickLease) -> LeaseStoreResult<()>;
}

/// Errors returned by lease store implementations.
#[derive(Debug, Clone, Error)]
pub enum LeaseStoreError {
    /// Persistence-layer failure.
    #[error("lease store error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl LeaseStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

//! `PostgreSQL` implementation of the advisory lease store.

use super::{models::NewLeaseRow, repository::LifecyclePgPool, schema::lifecycle_leases};
use crate::lifecycle::{
    domain::TickLease,
    ports::{LeaseStore, LeaseStoreError, LeaseStoreResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use diesel::prelude::*;

/// `PostgreSQL`-backed lease store.
///
/// Acquisition runs in one transaction: the lease row is deleted when its
/// expiry has passed, then a fresh row is inserted with a do-nothing conflict
/// target, so exactly one driver wins the race for a free or stale lease.
#[derive(Debug, Clone)]
pub struct PostgresLeaseStore {
    pool: LifecyclePgPool,
}

impl PostgresLeaseStore {
    /// Creates a new lease store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: LifecyclePgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeaseStore for PostgresLeaseStore {
    async fn acquire(
        &self,
        name: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> LeaseStoreResult<Option<TickLease>> {
        let lease = TickLease::new(name, now + ttl);
        let new_row = NewLeaseRow {
            name: lease.name().to_owned(),
            holder: lease.holder(),
            expires_at: lease.expires_at(),
        };
        let pool = self.pool.clone();
        let claimed = tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(LeaseStoreError::persistence)?;
            connection
                .transaction::<usize, diesel::result::Error, _>(|tx_conn| {
                    diesel::delete(
                        lifecycle_leases::table
                            .filter(lifecycle_leases::name.eq(new_row.name.as_str()))
                            .filter(lifecycle_leases::expires_at.le(now)),
                    )
                    .execute(tx_conn)?;
                    diesel::insert_into(lifecycle_leases::table)
                        .values(&new_row)
                        .on_conflict_do_nothing()
                        .execute(tx_conn)
                })
                .map_err(LeaseStoreError::persistence)
        })
        .await
        .map_err(LeaseStoreError::persistence)??;
        Ok((claimed > 0).then_some(lease))
    }

    async fn release(&self, lease: &TickLease) -> LeaseStoreResult<()> {
        let name = lease.name().to_owned();
        let holder = lease.holder();
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(LeaseStoreError::persistence)?;
            diesel::delete(
                lifecycle_leases::table
                    .filter(lifecycle_leases::name.eq(name))
                    .filter(lifecycle_leases::holder.eq(holder)),
            )
            .execute(&mut connection)
            .map_err(LeaseStoreError::persistence)?;
            Ok(())
        })
        .await
        .map_err(LeaseStoreError::persistence)?
    }
}

//! `PostgreSQL` implementation of the archival policy store.

use super::{
    models::ArchivePolicyRow, repository::LifecyclePgPool, schema::organization_archive_policies,
};
use crate::lifecycle::{
    domain::{ArchiveSchedule, OrganizationArchivePolicy, OrganizationId},
    ports::{ArchivePolicyStore, ArchivePolicyStoreError, ArchivePolicyStoreResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;

/// `PostgreSQL`-backed archival policy store.
#[derive(Debug, Clone)]
pub struct PostgresArchivePolicyStore {
    pool: LifecyclePgPool,
}

impl PostgresArchivePolicyStore {
    /// Creates a new policy store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: LifecyclePgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> ArchivePolicyStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ArchivePolicyStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(ArchivePolicyStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(ArchivePolicyStoreError::persistence)?
    }
}

#[async_trait]
impl ArchivePolicyStore for PostgresArchivePolicyStore {
    async fn enabled_policies_for(
        &self,
        schedule: ArchiveSchedule,
    ) -> ArchivePolicyStoreResult<Vec<OrganizationArchivePolicy>> {
        self.run_blocking(move |connection| {
            let rows = organization_archive_policies::table
                .filter(organization_archive_policies::auto_archive_enabled.eq(true))
                .filter(organization_archive_policies::archive_schedule.eq(schedule.as_str()))
                .order(organization_archive_policies::organization_id.asc())
                .select(ArchivePolicyRow::as_select())
                .load::<ArchivePolicyRow>(connection)
                .map_err(ArchivePolicyStoreError::persistence)?;
            rows.into_iter().map(row_to_policy).collect()
        })
        .await
    }

    async fn policy_for(
        &self,
        organization_id: OrganizationId,
    ) -> ArchivePolicyStoreResult<Option<OrganizationArchivePolicy>> {
        self.run_blocking(move |connection| {
            let row = organization_archive_policies::table
                .filter(
                    organization_archive_policies::organization_id
                        .eq(organization_id.into_inner()),
                )
                .select(ArchivePolicyRow::as_select())
                .first::<ArchivePolicyRow>(connection)
                .optional()
                .map_err(ArchivePolicyStoreError::persistence)?;
            row.map(row_to_policy).transpose()
        })
        .await
    }
}

fn row_to_policy(row: ArchivePolicyRow) -> ArchivePolicyStoreResult<OrganizationArchivePolicy> {
    let organization_id = OrganizationId::from_uuid(row.organization_id);
    let invalid = |reason: String| ArchivePolicyStoreError::InvalidPolicy {
        organization_id,
        reason,
    };
    let schedule = ArchiveSchedule::try_from(row.archive_schedule.as_str())
        .map_err(|err| invalid(err.to_string()))?;
    let retention_days = u32::try_from(row.auto_archive_after_days)
        .map_err(|_| invalid("negative retention window".to_owned()))?;
    OrganizationArchivePolicy::new(
        organization_id,
        row.auto_archive_enabled,
        retention_days,
        schedule,
    )
    .map_err(|err| invalid(err.to_string()))
}

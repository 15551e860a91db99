//! `PostgreSQL` implementations of the notification and audit sinks.

use super::{
    models::{NewAuditRow, NewNotificationRow},
    repository::LifecyclePgPool,
    schema::{audit_log, notifications},
};
use crate::lifecycle::{
    domain::{AuditActor, AuditEntry, Notification},
    ports::{AuditLog, AuditLogError, AuditLogResult, Notifier, NotifierError, NotifierResult},
};
use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

/// `PostgreSQL`-backed notification sink.
#[derive(Debug, Clone)]
pub struct PostgresNotifier {
    pool: LifecyclePgPool,
}

impl PostgresNotifier {
    /// Creates a new notifier from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: LifecyclePgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Notifier for PostgresNotifier {
    async fn notify(&self, notification: &Notification) -> NotifierResult<()> {
        let new_row = NewNotificationRow {
            id: Uuid::new_v4(),
            user_id: notification.user_id().into_inner(),
            kind: notification.kind().as_str().to_owned(),
            title: notification.title().to_owned(),
            message: notification.message().to_owned(),
            task_id: notification.task_id().into_inner(),
            created_at: Utc::now(),
        };
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(NotifierError::sink)?;
            diesel::insert_into(notifications::table)
                .values(&new_row)
                .execute(&mut connection)
                .map_err(NotifierError::sink)?;
            Ok(())
        })
        .await
        .map_err(NotifierError::sink)?
    }
}

/// `PostgreSQL`-backed audit trail.
#[derive(Debug, Clone)]
pub struct PostgresAuditLog {
    pool: LifecyclePgPool,
}

impl PostgresAuditLog {
    /// Creates a new audit log from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: LifecyclePgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLog for PostgresAuditLog {
    async fn record(&self, entry: &AuditEntry) -> AuditLogResult<()> {
        // System entries have no acting user; the nil UUID is the sentinel.
        let actor_id = match entry.actor() {
            AuditActor::System => Uuid::nil(),
            AuditActor::User { user_id } => user_id.into_inner(),
        };
        let new_row = NewAuditRow {
            id: Uuid::new_v4(),
            task_id: entry.task_id().into_inner(),
            actor_id,
            action: entry.action().as_str().to_owned(),
            metadata: entry.metadata().clone(),
            created_at: Utc::now(),
        };
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(AuditLogError::sink)?;
            diesel::insert_into(audit_log::table)
                .values(&new_row)
                .execute(&mut connection)
                .map_err(AuditLogError::sink)?;
            Ok(())
        })
        .await
        .map_err(AuditLogError::sink)?
    }
}

//! Audit-log sink port.

use crate::lifecycle::domain::AuditEntry;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for audit-log operations.
pub type AuditLogResult<T> = Result<T, AuditLogError>;

/// Write-only audit trail contract.
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Appends one audit entry.
    ///
    /// # Errors
    ///
    /// Returns [`AuditLogError`] when the sink rejects the write.
    async fn record(&self, entry: &AuditEntry) -> AuditLogResult<()>;
}

/// Errors returned by audit-log implementations.
#[derive(Debug, Clone, Error)]
pub enum AuditLogError {
    /// Persistence-layer failure.
    #[error("audit log error: {0}")]
    Sink(Arc<dyn std::error::Error + Send + Sync>),
}

impl AuditLogError {
    /// Wraps a sink error.
    pub fn sink(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Sink(Arc::new(err))
    }
}

//! Notification sink port.

use crate::lifecycle::domain::Notification;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for notifier operations.
pub type NotifierResult<T> = Result<T, NotifierError>;

/// Write-only notification delivery contract.
///
/// The engine only creates notification records; rendering and delivery
/// belong to the surrounding application.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Records one notification for later delivery.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError`] when the sink rejects the write.
    async fn notify(&self, notification: &Notification) -> NotifierResult<()>;
}

/// Errors returned by notifier implementations.
#[derive(Debug, Clone, Error)]
pub enum NotifierError {
    /// Persistence-layer failure.
    #[error("notification sink error: {0}")]
    Sink(Arc<dyn std::error::Error + Send + Sync>),
}

impl NotifierError {
    /// Wraps a sink error.
    pub fn sink(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Sink(Arc::new(err))
    }
}

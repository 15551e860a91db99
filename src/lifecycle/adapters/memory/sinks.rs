//! Recording in-memory sinks for notifications and audit entries.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::lifecycle::{
    domain::{AuditEntry, Notification},
    ports::{AuditLog, AuditLogError, AuditLogResult, Notifier, NotifierError, NotifierResult},
};

/// In-memory notifier that records every notification it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<RwLock<Vec<Notification>>>,
}

impl RecordingNotifier {
    /// Creates an empty recording notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every recorded notification, in delivery order.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError`] when the record lock is poisoned.
    pub fn sent(&self) -> NotifierResult<Vec<Notification>> {
        let sent = self
            .sent
            .read()
            .map_err(|err| NotifierError::sink(std::io::Error::other(err.to_string())))?;
        Ok(sent.clone())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &Notification) -> NotifierResult<()> {
        let mut sent = self
            .sent
            .write()
            .map_err(|err| NotifierError::sink(std::io::Error::other(err.to_string())))?;
        sent.push(notification.clone());
        Ok(())
    }
}

/// In-memory audit log that records every entry it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingAuditLog {
    entries: Arc<RwLock<Vec<AuditEntry>>>,
}

impl RecordingAuditLog {
    /// Creates an empty recording audit log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every recorded entry, in write order.
    ///
    /// # Errors
    ///
    /// Returns [`AuditLogError`] when the record lock is poisoned.
    pub fn entries(&self) -> AuditLogResult<Vec<AuditEntry>> {
        let entries = self
            .entries
            .read()
            .map_err(|err| AuditLogError::sink(std::io::Error::other(err.to_string())))?;
        Ok(entries.clone())
    }
}

#[async_trait]
impl AuditLog for RecordingAuditLog {
    async fn record(&self, entry: &AuditEntry) -> AuditLogResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|err| AuditLogError::sink(std::io::Error::other(err.to_string())))?;
        entries.push(entry.clone());
        Ok(())
    }
}

//! Advisory lease guarding the lifecycle tick against concurrent drivers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A held advisory lease with an expiry.
///
/// The driver acquires a lease before generation and archival so multiple
/// service replicas cannot double-generate instances. Expiry bounds the
/// damage of a crashed holder: a stale lease is reclaimable once past
/// `expires_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickLease {
    name: String,
    holder: Uuid,
    expires_at: DateTime<Utc>,
}

impl TickLease {
    /// Creates a lease held by a fresh holder token.
    #[must_use]
    pub fn new(name: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            holder: Uuid::new_v4(),
            expires_at,
        }
    }

    /// Returns the lease name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the holder token.
    #[must_use]
    pub const fn holder(&self) -> Uuid {
        self.holder
    }

    /// Returns the expiry instant.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns whether the lease has expired as of `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

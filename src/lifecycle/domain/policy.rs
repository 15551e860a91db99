//! Per-organization archival policy.

use super::{LifecycleDomainError, OrganizationId, ParseArchiveScheduleError};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trigger cadence on which an organization's archival sweep runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveSchedule {
    /// Sweep every day.
    Daily,
    /// Sweep weekly, on Sundays.
    WeeklySunday,
    /// Sweep weekly, on Mondays.
    WeeklyMonday,
}

impl ArchiveSchedule {
    /// All supported schedule tags.
    pub const ALL: [Self; 3] = [Self::Daily, Self::WeeklySunday, Self::WeeklyMonday];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::WeeklySunday => "weekly_sunday",
            Self::WeeklyMonday => "weekly_monday",
        }
    }
}

impl TryFrom<&str> for ArchiveSchedule {
    type Error = ParseArchiveScheduleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "daily" => Ok(Self::Daily),
            "weekly_sunday" => Ok(Self::WeeklySunday),
            "weekly_monday" => Ok(Self::WeeklyMonday),
            _ => Err(ParseArchiveScheduleError(value.to_owned())),
        }
    }
}

impl fmt::Display for ArchiveSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Archival policy configured for one organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationArchivePolicy {
    organization_id: OrganizationId,
    enabled: bool,
    retention_days: u32,
    schedule: ArchiveSchedule,
}

impl OrganizationArchivePolicy {
    /// Creates a validated archival policy.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleDomainError::ZeroRetention`] when `retention_days`
    /// is zero.
    pub const fn new(
        organization_id: OrganizationId,
        enabled: bool,
        retention_days: u32,
        schedule: ArchiveSchedule,
    ) -> Result<Self, LifecycleDomainError> {
        if retention_days == 0 {
            return Err(LifecycleDomainError::ZeroRetention);
        }
        Ok(Self {
            organization_id,
            enabled,
            retention_days,
            schedule,
        })
    }

    /// Returns the organization this policy belongs to.
    #[must_use]
    pub const fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    /// Returns whether automatic archival is enabled.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the retention window in days.
    #[must_use]
    pub const fn retention_days(&self) -> u32 {
        self.retention_days
    }

    /// Returns the configured sweep cadence.
    #[must_use]
    pub const fn schedule(&self) -> ArchiveSchedule {
        self.schedule
    }

    /// Computes the archival cutoff: completed tasks last touched before
    /// this moment are eligible.
    #[must_use]
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(i64::from(self.retention_days))
    }
}

//! Recurrence rules and the pure due-date evaluator.
//!
//! All arithmetic here is naive calendar-date arithmetic; the engine
//! evaluates "today" on UTC day boundaries (see the driver). Weekly rules
//! align to the weekday of the rule's start date, and monthly rules clamp
//! the target day-of-month to the length of the month under evaluation, so
//! a rule started on the 31st fires on the 28th or 29th in February.

use super::{LifecycleDomainError, ParseCadenceError};
use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed-interval recurrence cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    /// Every `frequency` days.
    Daily,
    /// Every `frequency` weeks, on the start date's weekday.
    Weekly,
    /// Every `frequency` months, on the start date's day-of-month (clamped).
    Monthly,
}

impl Cadence {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl TryFrom<&str> for Cadence {
    type Error = ParseCadenceError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(ParseCadenceError(value.to_owned())),
        }
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declarative recurrence attached to a template task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    cadence: Cadence,
    frequency: u32,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    last_generated_at: NaiveDate,
}

impl RecurrenceRule {
    /// Creates a validated recurrence rule with the watermark at the start
    /// date.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleDomainError::ZeroFrequency`] when `frequency` is
    /// zero and [`LifecycleDomainError::InvertedWindow`] when `end_date`
    /// precedes `start_date`.
    pub fn new(
        cadence: Cadence,
        frequency: u32,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
    ) -> Result<Self, LifecycleDomainError> {
        if frequency == 0 {
            return Err(LifecycleDomainError::ZeroFrequency);
        }
        if let Some(end) = end_date
            && end < start_date
        {
            return Err(LifecycleDomainError::InvertedWindow {
                start: start_date,
                end,
            });
        }
        Ok(Self {
            cadence,
            frequency,
            start_date,
            end_date,
            last_generated_at: start_date,
        })
    }

    /// Reconstructs a rule from persisted storage without re-validation.
    ///
    /// A missing watermark column defaults to the start date.
    #[must_use]
    pub fn from_persisted(
        cadence: Cadence,
        frequency: u32,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
        last_generated_at: Option<NaiveDate>,
    ) -> Self {
        Self {
            cadence,
            frequency,
            start_date,
            end_date,
            last_generated_at: last_generated_at.unwrap_or(start_date),
        }
    }

    /// Returns the recurrence cadence.
    #[must_use]
    pub const fn cadence(&self) -> Cadence {
        self.cadence
    }

    /// Returns the interval multiplier (`every N` days/weeks/months).
    #[must_use]
    pub const fn frequency(&self) -> u32 {
        self.frequency
    }

    /// Returns the first date on which the rule may fire.
    #[must_use]
    pub const fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Returns the last date of the recurrence window, if bounded.
    #[must_use]
    pub const fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    /// Returns the most recent date an instance was generated for.
    #[must_use]
    pub const fn last_generated_at(&self) -> NaiveDate {
        self.last_generated_at
    }

    /// Returns whether `as_of` falls inside the recurrence window.
    #[must_use]
    pub fn is_candidate(&self, as_of: NaiveDate) -> bool {
        self.start_date <= as_of && self.end_date.is_none_or(|end| as_of <= end)
    }

    /// Decides whether a new instance is due on `as_of`.
    ///
    /// Pure and deterministic; callers gate materialization on this.
    #[must_use]
    pub fn is_due(&self, as_of: NaiveDate) -> bool {
        if !self.is_candidate(as_of) {
            return false;
        }
        let elapsed_days = (as_of - self.last_generated_at).num_days();
        let frequency = i64::from(self.frequency);
        match self.cadence {
            Cadence::Daily => elapsed_days >= frequency,
            Cadence::Weekly => {
                as_of.weekday() == self.start_date.weekday()
                    && elapsed_days.div_euclid(7) >= frequency
            }
            Cadence::Monthly => {
                let target_day = self.start_date.day().min(last_day_of_month(as_of));
                as_of.day() == target_day
                    && whole_months_between(self.last_generated_at, as_of) >= frequency
            }
        }
    }

    /// Computes the deadline of an instance generated on `as_of`.
    ///
    /// The deadline is `as_of` plus one full interval, independent of the
    /// template's recurrence window.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleDomainError::DeadlineOverflow`] when the result
    /// leaves the representable calendar range.
    pub fn instance_deadline(&self, as_of: NaiveDate) -> Result<NaiveDate, LifecycleDomainError> {
        let deadline = match self.cadence {
            Cadence::Daily => as_of.checked_add_days(Days::new(u64::from(self.frequency))),
            Cadence::Weekly => {
                as_of.checked_add_days(Days::new(u64::from(self.frequency).saturating_mul(7)))
            }
            Cadence::Monthly => as_of.checked_add_months(Months::new(self.frequency)),
        };
        deadline.ok_or(LifecycleDomainError::DeadlineOverflow(as_of))
    }

    /// Returns a copy of the rule with the watermark at `generated_for`.
    #[must_use]
    pub const fn with_watermark(mut self, generated_for: NaiveDate) -> Self {
        self.last_generated_at = generated_for;
        self
    }
}

/// Returns the day number of the last day of `date`'s month.
fn last_day_of_month(date: NaiveDate) -> u32 {
    let (next_year, next_month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .map_or(28, |last| last.day())
}

/// Counts whole calendar months between two dates by month index.
///
/// Day-of-month alignment is enforced separately by the caller, so the
/// month index difference is sufficient here: the watermark of a monthly
/// rule only ever lands on (clamped) target days.
fn whole_months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    let from_index = i64::from(from.year()) * 12 + i64::from(from.month0());
    let to_index = i64::from(to.year()) * 12 + i64::from(to.month0());
    to_index - from_index
}

//! Unit tests for the pure recurrence evaluator.

use super::support::date;
use crate::lifecycle::domain::{Cadence, LifecycleDomainError, RecurrenceRule};
use chrono::NaiveDate;
use rstest::rstest;

fn rule(cadence: Cadence, frequency: u32, start: NaiveDate) -> RecurrenceRule {
    RecurrenceRule::new(cadence, frequency, start, None).expect("valid rule")
}

#[rstest]
// Daily: due once a full interval has elapsed since the watermark.
#[case(Cadence::Daily, 1, date(2025, 1, 1), date(2025, 1, 1), false)]
#[case(Cadence::Daily, 1, date(2025, 1, 1), date(2025, 1, 2), true)]
#[case(Cadence::Daily, 2, date(2025, 1, 1), date(2025, 1, 2), false)]
#[case(Cadence::Daily, 2, date(2025, 1, 1), date(2025, 1, 3), true)]
#[case(Cadence::Daily, 1, date(2025, 1, 1), date(2025, 3, 15), true)]
// Weekly: weekday alignment with the start date, then whole weeks.
// 2025-01-06 is a Monday.
#[case(Cadence::Weekly, 2, date(2025, 1, 6), date(2025, 1, 13), false)]
#[case(Cadence::Weekly, 2, date(2025, 1, 6), date(2025, 1, 20), true)]
#[case(Cadence::Weekly, 2, date(2025, 1, 6), date(2025, 1, 21), false)]
#[case(Cadence::Weekly, 1, date(2025, 1, 6), date(2025, 1, 13), true)]
#[case(Cadence::Weekly, 1, date(2025, 1, 6), date(2025, 1, 12), false)]
// Monthly: day-of-month alignment with end-of-month clamping.
#[case(Cadence::Monthly, 1, date(2025, 1, 31), date(2025, 2, 28), true)]
#[case(Cadence::Monthly, 1, date(2025, 1, 31), date(2025, 2, 27), false)]
#[case(Cadence::Monthly, 1, date(2025, 1, 15), date(2025, 2, 15), true)]
#[case(Cadence::Monthly, 1, date(2025, 1, 15), date(2025, 2, 14), false)]
#[case(Cadence::Monthly, 2, date(2025, 1, 15), date(2025, 2, 15), false)]
#[case(Cadence::Monthly, 2, date(2025, 1, 15), date(2025, 3, 15), true)]
fn is_due_matches_schedule(
    #[case] cadence: Cadence,
    #[case] frequency: u32,
    #[case] start: NaiveDate,
    #[case] as_of: NaiveDate,
    #[case] expected: bool,
) {
    assert_eq!(rule(cadence, frequency, start).is_due(as_of), expected);
}

#[rstest]
fn monthly_clamp_fires_again_on_original_day() {
    // Started on the 31st, fired on Feb 28 (clamped); March has a 31st, so
    // the next firing realigns to the 31st.
    let advanced = rule(Cadence::Monthly, 1, date(2025, 1, 31)).with_watermark(date(2025, 2, 28));
    assert!(!advanced.is_due(date(2025, 3, 28)));
    assert!(advanced.is_due(date(2025, 3, 31)));
}

#[rstest]
fn leap_february_clamps_to_twenty_ninth() {
    let from_december = rule(Cadence::Monthly, 2, date(2023, 12, 31));
    assert!(from_december.is_due(date(2024, 2, 29)));
}

#[rstest]
fn not_due_before_start_date() {
    let weekly = rule(Cadence::Weekly, 1, date(2025, 1, 6));
    assert!(!weekly.is_due(date(2024, 12, 30)));
    assert!(!weekly.is_candidate(date(2024, 12, 30)));
}

#[rstest]
fn not_due_past_window_end() {
    let bounded = RecurrenceRule::new(
        Cadence::Daily,
        1,
        date(2025, 1, 1),
        Some(date(2025, 1, 10)),
    )
    .expect("valid rule");
    assert!(bounded.is_due(date(2025, 1, 10)));
    assert!(!bounded.is_due(date(2025, 1, 11)));
}

#[rstest]
fn watermark_resets_the_interval() {
    let advanced = rule(Cadence::Daily, 3, date(2025, 1, 1)).with_watermark(date(2025, 1, 4));
    assert!(!advanced.is_due(date(2025, 1, 6)));
    assert!(advanced.is_due(date(2025, 1, 7)));
}

#[rstest]
#[case(Cadence::Daily, 3, date(2025, 1, 10), date(2025, 1, 13))]
#[case(Cadence::Weekly, 2, date(2025, 1, 10), date(2025, 1, 24))]
#[case(Cadence::Monthly, 1, date(2025, 1, 31), date(2025, 2, 28))]
#[case(Cadence::Monthly, 3, date(2025, 1, 15), date(2025, 4, 15))]
fn instance_deadline_adds_one_interval(
    #[case] cadence: Cadence,
    #[case] frequency: u32,
    #[case] as_of: NaiveDate,
    #[case] expected: NaiveDate,
) {
    let deadline = rule(cadence, frequency, date(2025, 1, 1))
        .instance_deadline(as_of)
        .expect("deadline computes");
    assert_eq!(deadline, expected);
}

#[rstest]
fn zero_frequency_is_rejected() {
    let result = RecurrenceRule::new(Cadence::Daily, 0, date(2025, 1, 1), None);
    assert_eq!(result, Err(LifecycleDomainError::ZeroFrequency));
}

#[rstest]
fn inverted_window_is_rejected() {
    let result = RecurrenceRule::new(
        Cadence::Weekly,
        1,
        date(2025, 1, 10),
        Some(date(2025, 1, 9)),
    );
    assert_eq!(
        result,
        Err(LifecycleDomainError::InvertedWindow {
            start: date(2025, 1, 10),
            end: date(2025, 1, 9),
        })
    );
}

#[rstest]
fn missing_watermark_defaults_to_start_date() {
    let restored =
        RecurrenceRule::from_persisted(Cadence::Daily, 1, date(2025, 1, 1), None, None);
    assert_eq!(restored.last_generated_at(), date(2025, 1, 1));
}

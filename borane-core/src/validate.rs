//! Advisory booking-time validation.

use chrono::{NaiveDateTime, Timelike};
use thiserror::Error;

use crate::rules::BusinessRules;
use crate::time::TimeInterval;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Cannot book for past time slots")]
    PastTimeSlot,

    #[error("Bookings are only allowed between {open_hour:02}:00 and {close_hour:02}:00")]
    OutsideOperatingHours { open_hour: u32, close_hour: u32 },

    #[error("Minimum booking duration is {min_minutes} minutes")]
    DurationTooShort { min_minutes: i64 },

    #[error("Maximum booking duration is {max_minutes} minutes")]
    DurationTooLong { max_minutes: i64 },

    #[error("Time slot conflicts with existing booking")]
    Conflict,
}

/// Checks a proposed interval against the rules and the room's existing
/// bookings.
///
/// Checks run in a fixed order and stop at the first failure: past start,
/// operating hours, minimum duration, maximum duration, overlap.
pub fn validate(
    proposed: &TimeInterval,
    existing: &[TimeInterval],
    rules: &BusinessRules,
    now: NaiveDateTime,
) -> Result<(), ValidationError> {
    if proposed.start <= now {
        return Err(ValidationError::PastTimeSlot);
    }

    let end_hour = proposed.end.hour();
    if proposed.start.hour() < rules.open_hour
        || end_hour > rules.close_hour
        || (end_hour == rules.close_hour && proposed.end.minute() > 0)
    {
        return Err(ValidationError::OutsideOperatingHours {
            open_hour: rules.open_hour,
            close_hour: rules.close_hour,
        });
    }

    // Seconds, so a 29m59s request is still too short.
    let seconds = proposed.duration().num_seconds();
    if seconds < rules.min_duration_minutes.saturating_mul(60) {
        return Err(ValidationError::DurationTooShort {
            min_minutes: rules.min_duration_minutes,
        });
    }
    if seconds > rules.max_duration_minutes.saturating_mul(60) {
        return Err(ValidationError::DurationTooLong {
            max_minutes: rules.max_duration_minutes,
        });
    }

    if find_conflict(proposed, existing).is_some() {
        return Err(ValidationError::Conflict);
    }

    Ok(())
}

/// Index of the first existing interval the proposal collides with.
pub fn find_conflict(proposed: &TimeInterval, existing: &[TimeInterval]) -> Option<usize> {
    existing.iter().position(|e| overlaps(proposed, e))
}

/// Booking overlap test.
///
/// Three clauses: the proposal covers the existing start, covers the existing
/// end, or sits inside the existing interval. A proposal starting exactly when
/// the existing one ends matches none of them.
pub fn overlaps(proposed: &TimeInterval, existing: &TimeInterval) -> bool {
    let (p, e) = (proposed, existing);
    (p.start <= e.start && p.end > e.start)
        || (p.start < e.end && p.end >= e.end)
        || (p.start >= e.start && p.end <= e.end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn span(sh: u32, sm: u32, eh: u32, em: u32) -> TimeInterval {
        TimeInterval::new(at(sh, sm), at(eh, em))
    }

    fn early() -> NaiveDateTime {
        at(7, 0)
    }

    fn check(proposed: TimeInterval, existing: &[TimeInterval]) -> Result<(), ValidationError> {
        validate(&proposed, existing, &BusinessRules::default(), early())
    }

    #[test]
    fn test_accepts_afternoon_half_hour() {
        assert_eq!(check(span(14, 0, 14, 30), &[]), Ok(()));
    }

    #[test]
    fn test_rejects_start_at_or_before_now() {
        let rules = BusinessRules::default();
        let proposed = span(10, 0, 11, 0);
        assert_eq!(
            validate(&proposed, &[], &rules, at(10, 0)),
            Err(ValidationError::PastTimeSlot)
        );
        assert_eq!(
            validate(&proposed, &[], &rules, at(10, 30)),
            Err(ValidationError::PastTimeSlot)
        );
    }

    #[test]
    fn test_past_check_runs_before_hours_check() {
        let rules = BusinessRules::default();
        let proposed = span(6, 0, 6, 30);
        assert_eq!(
            validate(&proposed, &[], &rules, at(12, 0)),
            Err(ValidationError::PastTimeSlot)
        );
    }

    #[test]
    fn test_rejects_before_opening() {
        assert!(matches!(
            check(span(8, 0, 8, 30), &[]),
            Err(ValidationError::OutsideOperatingHours { .. })
        ));
        assert!(matches!(
            check(span(8, 30, 9, 30), &[]),
            Err(ValidationError::OutsideOperatingHours { .. })
        ));
    }

    #[test]
    fn test_closing_hour_boundary() {
        assert_eq!(check(span(19, 0, 20, 0), &[]), Ok(()));
        assert!(matches!(
            check(span(19, 30, 20, 1), &[]),
            Err(ValidationError::OutsideOperatingHours { .. })
        ));
        assert!(matches!(
            check(span(19, 0, 21, 0), &[]),
            Err(ValidationError::OutsideOperatingHours { .. })
        ));
    }

    #[test]
    fn test_duration_bounds() {
        assert_eq!(
            check(span(10, 0, 10, 29), &[]),
            Err(ValidationError::DurationTooShort { min_minutes: 30 })
        );
        assert_eq!(check(span(10, 0, 15, 0), &[]), Ok(()));
        assert_eq!(
            check(span(10, 0, 15, 30), &[]),
            Err(ValidationError::DurationTooLong { max_minutes: 300 })
        );
    }

    #[test]
    fn test_inverted_interval_is_too_short() {
        assert!(matches!(
            check(span(12, 0, 11, 0), &[]),
            Err(ValidationError::DurationTooShort { .. })
        ));
    }

    #[test]
    fn test_sub_minute_shortfall_is_too_short() {
        let start = at(10, 0);
        let end = start + chrono::TimeDelta::seconds(30 * 60 - 1);
        assert!(matches!(
            check(TimeInterval::new(start, end), &[]),
            Err(ValidationError::DurationTooShort { .. })
        ));
    }

    #[test]
    fn test_back_to_back_is_allowed() {
        let existing = [span(10, 0, 11, 0)];
        assert_eq!(check(span(11, 0, 12, 0), &existing), Ok(()));
        assert_eq!(check(span(9, 0, 10, 0), &existing), Ok(()));
    }

    #[test]
    fn test_nested_overlap_conflicts() {
        let existing = [span(10, 0, 12, 0)];
        assert_eq!(
            check(span(10, 30, 11, 30), &existing),
            Err(ValidationError::Conflict)
        );
    }

    #[test]
    fn test_partial_overlaps_conflict() {
        let existing = [span(10, 0, 11, 0)];
        assert_eq!(
            check(span(9, 30, 10, 30), &existing),
            Err(ValidationError::Conflict)
        );
        assert_eq!(
            check(span(10, 30, 11, 30), &existing),
            Err(ValidationError::Conflict)
        );
    }

    #[test]
    fn test_enclosing_and_identical_conflict() {
        let existing = [span(10, 0, 11, 0)];
        assert_eq!(
            check(span(9, 30, 11, 30), &existing),
            Err(ValidationError::Conflict)
        );
        assert_eq!(
            check(span(10, 0, 11, 0), &existing),
            Err(ValidationError::Conflict)
        );
    }

    #[test]
    fn test_find_conflict_reports_first_match() {
        let existing = [span(9, 0, 9, 30), span(13, 0, 14, 0), span(13, 30, 15, 0)];
        assert_eq!(find_conflict(&span(13, 15, 13, 45), &existing), Some(1));
        assert_eq!(find_conflict(&span(10, 0, 11, 0), &existing), None);
    }

    #[test]
    fn test_custom_rules_message() {
        let rules = BusinessRules {
            open_hour: 8,
            close_hour: 18,
            ..BusinessRules::default()
        };
        let err = validate(&span(7, 0, 7, 30), &[], &rules, at(6, 0)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Bookings are only allowed between 08:00 and 18:00"
        );
    }

    #[test]
    fn test_extreme_rules_do_not_overflow() {
        let proposed = span(10, 0, 11, 0);

        let unbounded = BusinessRules {
            max_duration_minutes: i64::MAX,
            ..BusinessRules::default()
        };
        assert_eq!(validate(&proposed, &[], &unbounded, early()), Ok(()));

        let impossible = BusinessRules {
            min_duration_minutes: i64::MAX,
            max_duration_minutes: i64::MAX,
            ..BusinessRules::default()
        };
        assert_eq!(
            validate(&proposed, &[], &impossible, early()),
            Err(ValidationError::DurationTooShort {
                min_minutes: i64::MAX
            })
        );
    }
}

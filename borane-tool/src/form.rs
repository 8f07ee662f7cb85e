//! Booking form: raw user input to a checked [`BookingCandidate`].

use std::collections::BTreeSet;

use borane_core::{
    check_room_fit, validate, Booking, BookingCandidate, BusinessRules, Room, TimeInterval,
    UserId,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

use crate::error::BrnError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Meeting title is required")]
    MissingTitle,

    #[error("Invalid {field} time '{value}', expected HH:MM")]
    InvalidTime { field: &'static str, value: String },

    #[error("Invalid number of attendees '{0}'")]
    InvalidAttendees(String),
}

/// Parses a `HH:MM` wall-clock time.
pub fn parse_clock(field: &'static str, value: &str) -> Result<NaiveTime, FormError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|_| FormError::InvalidTime {
        field,
        value: value.to_string(),
    })
}

/// Form fields as typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingForm {
    pub title: String,
    pub start: String,
    pub end: String,
    pub attendees: String,
    pub equipment: BTreeSet<String>,
}

impl Default for BookingForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            start: String::new(),
            end: String::new(),
            attendees: "1".to_string(),
            equipment: BTreeSet::new(),
        }
    }
}

impl BookingForm {
    pub fn toggle_equipment(&mut self, item: &str) {
        if !self.equipment.remove(item) {
            self.equipment.insert(item.to_string());
        }
    }

    /// Builds the request for `room` on `date`. Times are taken on that date.
    pub fn to_candidate(
        &self,
        room: &Room,
        user_id: UserId,
        date: NaiveDate,
    ) -> Result<BookingCandidate, FormError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(FormError::MissingTitle);
        }

        let start = parse_clock("start", &self.start)?;
        let end = parse_clock("end", &self.end)?;
        let attendees_count = self
            .attendees
            .trim()
            .parse::<u32>()
            .map_err(|_| FormError::InvalidAttendees(self.attendees.clone()))?;

        Ok(BookingCandidate {
            user_id,
            room_id: room.id,
            title: title.to_string(),
            interval: TimeInterval::new(date.and_time(start), date.and_time(end)),
            attendees_count,
            equipment: self.equipment.clone(),
        })
    }
}

/// Local checks run before a candidate is sent: booking time first, then
/// whether the room can take it.
pub fn check_candidate(
    candidate: &BookingCandidate,
    room: &Room,
    existing: &[Booking],
    rules: &BusinessRules,
    now: NaiveDateTime,
) -> Result<(), BrnError> {
    let blocking = Booking::blocking_intervals(existing);
    validate(&candidate.interval, &blocking, rules, now)?;
    check_room_fit(candidate, room)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use borane_core::{BookingStatus, RoomFitError, ValidationError};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    fn room() -> Room {
        Room {
            id: 5,
            name: "Atrium".to_string(),
            capacity: 8,
            equipment: vec!["Projector".to_string()],
        }
    }

    fn form(start: &str, end: &str) -> BookingForm {
        BookingForm {
            title: "  Kickoff ".to_string(),
            start: start.to_string(),
            end: end.to_string(),
            attendees: "3".to_string(),
            equipment: BTreeSet::new(),
        }
    }

    #[test]
    fn test_parse_clock() {
        assert_eq!(
            parse_clock("start", "09:30"),
            Ok(NaiveTime::from_hms_opt(9, 30, 0).unwrap())
        );
        assert!(matches!(
            parse_clock("start", "25:00"),
            Err(FormError::InvalidTime { field: "start", .. })
        ));
        assert!(parse_clock("end", "noon").is_err());
    }

    #[test]
    fn test_to_candidate() {
        let candidate = form("14:00", "15:00").to_candidate(&room(), 11, day()).unwrap();
        assert_eq!(candidate.title, "Kickoff");
        assert_eq!(candidate.room_id, 5);
        assert_eq!(candidate.user_id, 11);
        assert_eq!(candidate.attendees_count, 3);
        assert_eq!(
            candidate.interval.start,
            day().and_hms_opt(14, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_to_candidate_errors() {
        let mut f = form("14:00", "15:00");
        f.title = "   ".to_string();
        assert_eq!(
            f.to_candidate(&room(), 1, day()),
            Err(FormError::MissingTitle)
        );

        let mut f = form("14:00", "15:00");
        f.attendees = "many".to_string();
        assert!(matches!(
            f.to_candidate(&room(), 1, day()),
            Err(FormError::InvalidAttendees(_))
        ));

        assert!(matches!(
            form("2pm", "15:00").to_candidate(&room(), 1, day()),
            Err(FormError::InvalidTime { field: "start", .. })
        ));
    }

    #[test]
    fn test_toggle_equipment() {
        let mut f = BookingForm::default();
        f.toggle_equipment("Projector");
        assert!(f.equipment.contains("Projector"));
        f.toggle_equipment("Projector");
        assert!(f.equipment.is_empty());
    }

    #[test]
    fn test_check_candidate_order() {
        let now = day().and_hms_opt(8, 0, 0).unwrap();
        let rules = BusinessRules::default();
        let existing = vec![Booking {
            id: 1,
            room_id: 5,
            user_id: 2,
            title: "Taken".to_string(),
            interval: TimeInterval::new(
                day().and_hms_opt(14, 0, 0).unwrap(),
                day().and_hms_opt(15, 0, 0).unwrap(),
            ),
            attendees_count: 2,
            equipment: BTreeSet::new(),
            status: BookingStatus::Confirmed,
            user_name: None,
            room_name: None,
        }];

        // Conflict is reported before the over-capacity problem.
        let mut f = form("14:30", "15:30");
        f.attendees = "20".to_string();
        let candidate = f.to_candidate(&room(), 1, day()).unwrap();
        let err = check_candidate(&candidate, &room(), &existing, &rules, now).unwrap_err();
        assert!(matches!(err, BrnError::Validation(ValidationError::Conflict)));

        let candidate = f.to_candidate(&room(), 1, day());
        let mut candidate = candidate.unwrap();
        candidate.interval = TimeInterval::new(
            day().and_hms_opt(15, 0, 0).unwrap(),
            day().and_hms_opt(16, 0, 0).unwrap(),
        );
        let err = check_candidate(&candidate, &room(), &existing, &rules, now).unwrap_err();
        assert!(matches!(
            err,
            BrnError::RoomFit(RoomFitError::OverCapacity { .. })
        ));

        let candidate = form("15:00", "16:00").to_candidate(&room(), 1, day()).unwrap();
        assert!(check_candidate(&candidate, &room(), &existing, &rules, now).is_ok());
    }
}

//! Subcommand bodies. Each writes its report to `out` so tests can capture it.

use std::io::Write;

use borane_client::BookingService;
use borane_core::{Booking, BookingId, BusinessRules, RoomId, SlotGrid, UserId};
use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, instrument};

use crate::error::BrnError;
use crate::form::{check_candidate, BookingForm};
use crate::render::{booking_line, grid_header, room_line, time_range, timeline_rows};

const ROOM_COLUMN: usize = 20;

pub async fn rooms<S: BookingService>(service: &S, out: &mut impl Write) -> Result<(), BrnError> {
    let rooms = service.list_rooms().await?;
    if rooms.is_empty() {
        writeln!(out, "No rooms available")?;
        return Ok(());
    }
    for room in &rooms {
        writeln!(out, "{}", room_line(room))?;
    }
    Ok(())
}

/// Prints the slot grid for `date`, or for today when no date is given.
pub async fn timeline<S: BookingService>(
    service: &S,
    grid: &SlotGrid,
    date: Option<NaiveDate>,
    out: &mut impl Write,
) -> Result<(), BrnError> {
    let rooms = service.list_rooms().await?;
    let bookings = match date {
        Some(date) => service.list_bookings_for_date(date).await?,
        None => service.list_today_bookings().await?,
    };
    debug!(rooms = rooms.len(), bookings = bookings.len(), "Loaded timeline");

    match date {
        Some(date) => writeln!(out, "Timeline for {}", date)?,
        None => writeln!(out, "Today's timeline")?,
    }
    writeln!(out, "{:<w$} {}", "", grid_header(grid), w = ROOM_COLUMN)?;

    for row in timeline_rows(&rooms, &bookings, grid) {
        let name: String = row.room.name.chars().take(ROOM_COLUMN).collect();
        let cells: String = row.segments.iter().map(|s| s.text()).collect();
        writeln!(out, "{:<w$} {}", name, cells, w = ROOM_COLUMN)?;
    }

    let mut confirmed: Vec<&Booking> = bookings.iter().filter(|b| b.is_confirmed()).collect();
    confirmed.sort_by_key(|b| (b.interval.start, b.room_id));
    if !confirmed.is_empty() {
        writeln!(out)?;
    }
    for booking in confirmed {
        let room = rooms
            .iter()
            .find(|r| r.id == booking.room_id)
            .map(|r| r.name.as_str())
            .or(booking.room_name.as_deref())
            .unwrap_or("?");
        let who = booking
            .user_name
            .as_deref()
            .map(|n| format!(" ({})", n))
            .unwrap_or_default();
        writeln!(
            out,
            "  {:<w$} {}  {}{}",
            room,
            time_range(booking),
            booking.title,
            who,
            w = ROOM_COLUMN
        )?;
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct BookRequest {
    pub room_id: RoomId,
    pub date: NaiveDate,
    pub form: BookingForm,
}

/// Validates locally against the room's bookings for the day, then submits.
/// Nothing is sent when a local check fails.
#[instrument(skip(service, rules, request, out), fields(room_id = request.room_id))]
pub async fn book<S: BookingService>(
    service: &S,
    rules: &BusinessRules,
    user_id: UserId,
    request: BookRequest,
    now: NaiveDateTime,
    out: &mut impl Write,
) -> Result<Booking, BrnError> {
    let rooms = service.list_rooms().await?;
    let room = rooms
        .iter()
        .find(|r| r.id == request.room_id)
        .ok_or(BrnError::RoomNotFound(request.room_id))?;

    let candidate = request.form.to_candidate(room, user_id, request.date)?;
    let existing = service
        .list_room_bookings_for_date(room.id, request.date)
        .await?;
    check_candidate(&candidate, room, &existing, rules, now)?;

    let booking = service.create_booking(&candidate).await?;
    writeln!(
        out,
        "Booked #{} {} {} {} in {}",
        booking.id,
        booking.interval.start.format("%Y-%m-%d"),
        time_range(&booking),
        booking.title,
        room.name
    )?;
    Ok(booking)
}

pub async fn bookings<S: BookingService>(
    service: &S,
    user_id: UserId,
    now: NaiveDateTime,
    out: &mut impl Write,
) -> Result<(), BrnError> {
    let mut bookings = service.list_user_bookings(user_id).await?;
    if bookings.is_empty() {
        writeln!(out, "No bookings")?;
        return Ok(());
    }
    bookings.sort_by_key(|b| b.interval.start);
    for booking in &bookings {
        writeln!(out, "{}", booking_line(booking, now))?;
    }
    Ok(())
}

/// Cancels one of the user's own bookings, refusing locally once it started.
#[instrument(skip(service, now, out))]
pub async fn cancel<S: BookingService>(
    service: &S,
    user_id: UserId,
    booking_id: BookingId,
    now: NaiveDateTime,
    out: &mut impl Write,
) -> Result<(), BrnError> {
    let mine = service.list_user_bookings(user_id).await?;
    let booking = mine
        .iter()
        .find(|b| b.id == booking_id)
        .ok_or(BrnError::BookingNotFound(booking_id))?;

    if !booking.is_cancellable(now) {
        return Err(BrnError::NotCancellable(booking_id));
    }

    service.cancel_booking(booking_id, user_id).await?;
    writeln!(out, "Cancelled #{} {}", booking.id, booking.title)?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use borane_client::{ClientError, Rejection};
    use borane_core::{BookingCandidate, BookingStatus, Room, TimeInterval, ValidationError};

    /// In-memory booking server
    pub(crate) struct FakeService {
        pub rooms: Vec<Room>,
        pub bookings: Mutex<Vec<Booking>>,
        pub creates: AtomicUsize,
        pub reject_with: Option<&'static str>,
    }

    impl FakeService {
        pub(crate) fn new(bookings: Vec<Booking>) -> Self {
            Self {
                rooms: vec![
                    Room {
                        id: 1,
                        name: "Atrium".to_string(),
                        capacity: 10,
                        equipment: vec!["Projector".to_string()],
                    },
                    Room {
                        id: 2,
                        name: "Cellar".to_string(),
                        capacity: 4,
                        equipment: vec![],
                    },
                ],
                bookings: Mutex::new(bookings),
                creates: AtomicUsize::new(0),
                reject_with: None,
            }
        }

        fn snapshot(&self, keep: impl Fn(&Booking) -> bool) -> Vec<Booking> {
            self.bookings
                .lock()
                .unwrap()
                .iter()
                .filter(|b| keep(b))
                .cloned()
                .collect()
        }
    }

    impl BookingService for FakeService {
        async fn list_rooms(&self) -> Result<Vec<Room>, ClientError> {
            Ok(self.rooms.clone())
        }

        async fn list_room_bookings_for_date(
            &self,
            room_id: RoomId,
            date: NaiveDate,
        ) -> Result<Vec<Booking>, ClientError> {
            Ok(self.snapshot(|b| b.room_id == room_id && b.interval.date() == date))
        }

        async fn list_bookings_for_date(
            &self,
            date: NaiveDate,
        ) -> Result<Vec<Booking>, ClientError> {
            Ok(self.snapshot(|b| b.interval.date() == date))
        }

        async fn list_today_bookings(&self) -> Result<Vec<Booking>, ClientError> {
            Ok(self.snapshot(|b| b.interval.date() == day()))
        }

        async fn list_user_bookings(&self, user_id: UserId) -> Result<Vec<Booking>, ClientError> {
            Ok(self.snapshot(|b| b.user_id == user_id))
        }

        async fn create_booking(
            &self,
            candidate: &BookingCandidate,
        ) -> Result<Booking, ClientError> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            if let Some(message) = self.reject_with {
                return Err(ClientError::Rejected(Rejection {
                    status: 409,
                    code: "409".to_string(),
                    message: message.to_string(),
                }));
            }

            let mut bookings = self.bookings.lock().unwrap();
            let booking = Booking {
                id: 100 + bookings.len() as i64,
                room_id: candidate.room_id,
                user_id: candidate.user_id,
                title: candidate.title.clone(),
                interval: candidate.interval,
                attendees_count: candidate.attendees_count,
                equipment: candidate.equipment.clone(),
                status: BookingStatus::Confirmed,
                user_name: None,
                room_name: None,
            };
            bookings.push(booking.clone());
            Ok(booking)
        }

        async fn cancel_booking(
            &self,
            booking_id: BookingId,
            _requester_id: UserId,
        ) -> Result<(), ClientError> {
            let mut bookings = self.bookings.lock().unwrap();
            bookings.retain(|b| b.id != booking_id);
            Ok(())
        }
    }

    pub(crate) fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()
    }

    pub(crate) fn at(hour: u32, minute: u32) -> NaiveDateTime {
        day().and_hms_opt(hour, minute, 0).unwrap()
    }

    pub(crate) fn booking(
        id: i64,
        room_id: i64,
        user_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Booking {
        Booking {
            id,
            room_id,
            user_id,
            title: format!("Meeting {}", id),
            interval: TimeInterval::new(start, end),
            attendees_count: 2,
            equipment: BTreeSet::new(),
            status: BookingStatus::Confirmed,
            user_name: Some("Ada".to_string()),
            room_name: Some("Atrium".to_string()),
        }
    }

    fn request(room_id: RoomId, start: &str, end: &str) -> BookRequest {
        BookRequest {
            room_id,
            date: day(),
            form: BookingForm {
                title: "Planning".to_string(),
                start: start.to_string(),
                end: end.to_string(),
                attendees: "3".to_string(),
                equipment: BTreeSet::new(),
            },
        }
    }

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[tokio::test]
    async fn test_rooms_lists_each_room() {
        let service = FakeService::new(vec![]);
        let mut out = Vec::new();
        rooms(&service, &mut out).await.unwrap();
        let text = output(out);
        assert!(text.contains("Atrium"));
        assert!(text.contains("Projector"));
        assert_eq!(text.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_timeline_draws_rows() {
        let service = FakeService::new(vec![booking(1, 1, 3, at(10, 0), at(11, 0))]);
        let mut out = Vec::new();
        timeline(&service, &SlotGrid::default(), Some(day()), &mut out)
            .await
            .unwrap();
        let text = output(out);

        assert!(text.starts_with("Timeline for 2024-05-06"));
        let atrium = text.lines().find(|l| l.starts_with("Atrium")).unwrap();
        assert!(atrium.contains("[Mee"));
        let cellar = text.lines().find(|l| l.starts_with("Cellar")).unwrap();
        assert!(!cellar.contains('['));
        assert!(text.contains("10:00-11:00  Meeting 1 (Ada)"));
    }

    #[tokio::test]
    async fn test_book_creates_after_local_checks() {
        let service = FakeService::new(vec![booking(1, 1, 3, at(14, 0), at(15, 0))]);
        let mut out = Vec::new();
        let created = book(
            &service,
            &BusinessRules::default(),
            7,
            request(1, "15:00", "16:00"),
            at(9, 0),
            &mut out,
        )
        .await
        .unwrap();

        assert_eq!(created.user_id, 7);
        assert_eq!(created.interval.start, at(15, 0));
        assert!(output(out).starts_with("Booked #"));
        assert_eq!(service.creates.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_book_conflict_never_reaches_server() {
        let service = FakeService::new(vec![booking(1, 1, 3, at(14, 0), at(15, 0))]);
        let mut out = Vec::new();
        let err = book(
            &service,
            &BusinessRules::default(),
            7,
            request(1, "14:30", "15:30"),
            at(9, 0),
            &mut out,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, BrnError::Validation(ValidationError::Conflict)));
        assert_eq!(service.creates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_book_other_room_is_free() {
        let service = FakeService::new(vec![booking(1, 1, 3, at(14, 0), at(15, 0))]);
        let mut out = Vec::new();
        let result = book(
            &service,
            &BusinessRules::default(),
            7,
            request(2, "14:00", "15:00"),
            at(9, 0),
            &mut out,
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_book_unknown_room_and_server_rejection() {
        let mut service = FakeService::new(vec![]);
        let mut out = Vec::new();
        let err = book(
            &service,
            &BusinessRules::default(),
            7,
            request(9, "14:00", "15:00"),
            at(9, 0),
            &mut out,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BrnError::RoomNotFound(9)));

        service.reject_with = Some("Room is already booked for this time");
        let err = book(
            &service,
            &BusinessRules::default(),
            7,
            request(1, "14:00", "15:00"),
            at(9, 0),
            &mut out,
        )
        .await
        .unwrap_err();
        match err {
            BrnError::Client(e) => assert_eq!(
                e.rejection().map(|r| r.message.as_str()),
                Some("Room is already booked for this time")
            ),
            other => panic!("Expected client error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_bookings_marks_cancellable() {
        let service = FakeService::new(vec![
            booking(2, 1, 7, at(16, 0), at(17, 0)),
            booking(1, 1, 7, at(9, 0), at(10, 0)),
            booking(3, 1, 8, at(12, 0), at(13, 0)),
        ]);
        let mut out = Vec::new();
        bookings(&service, 7, at(11, 0), &mut out).await.unwrap();
        let text = output(out);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("#1 "));
        assert!(!lines[0].contains("[cancellable]"));
        assert!(lines[1].ends_with("[cancellable]"));
    }

    #[tokio::test]
    async fn test_cancel_rules() {
        let service = FakeService::new(vec![
            booking(1, 1, 7, at(9, 0), at(10, 0)),
            booking(2, 1, 7, at(16, 0), at(17, 0)),
        ]);
        let now = at(11, 0);
        let mut out = Vec::new();

        let err = cancel(&service, 7, 1, now, &mut out).await.unwrap_err();
        assert!(matches!(err, BrnError::NotCancellable(1)));

        let err = cancel(&service, 7, 42, now, &mut out).await.unwrap_err();
        assert!(matches!(err, BrnError::BookingNotFound(42)));

        cancel(&service, 7, 2, now, &mut out).await.unwrap();
        assert!(output(out).starts_with("Cancelled #2"));
        assert_eq!(service.bookings.lock().unwrap().len(), 1);
    }
}

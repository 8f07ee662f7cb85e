use std::collections::BTreeSet;

use borane_core::{Booking, BookingCandidate, BookingStatus, Room, TimeInterval};
use chrono::{DateTime, Local, NaiveDateTime};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::error::{ClientError, Rejection};

/// Timestamp format sent to the server.
const WIRE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Booking as the server sends it.
#[derive(Debug, Deserialize)]
struct WireBooking {
    id: i64,
    room_id: i64,
    #[serde(default)]
    user_id: i64,
    #[serde(default)]
    meeting_title: String,
    start_time: String,
    end_time: String,
    #[serde(default)]
    attendees_count: u32,
    #[serde(default)]
    selected_equipment: Option<Value>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    user_name: Option<String>,
    #[serde(default)]
    room_name: Option<String>,
}

/// Parses a server timestamp into local wall-clock time.
///
/// Accepts naive `YYYY-MM-DDTHH:MM[:SS[.fff]]` (space separator too) and
/// RFC 3339 with an offset, which is converted to the local zone.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

pub fn format_timestamp(t: NaiveDateTime) -> String {
    t.format(WIRE_TIME_FORMAT).to_string()
}

/// Equipment arrives as a JSON array, a JSON-encoded array string, or a
/// comma-separated string depending on the backend.
fn parse_equipment(value: Option<Value>) -> BTreeSet<String> {
    match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| v.as_str().map(|s| s.trim().to_string()))
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) => match serde_json::from_str::<Vec<String>>(&s) {
            Ok(items) => items.into_iter().collect(),
            Err(_) => s
                .split(',')
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
        },
        _ => BTreeSet::new(),
    }
}

fn parse_status(raw: Option<&str>) -> BookingStatus {
    match raw {
        Some(s) if s.eq_ignore_ascii_case("cancelled") => BookingStatus::Cancelled,
        _ => BookingStatus::Confirmed,
    }
}

fn booking_from_wire(wire: WireBooking) -> Option<Booking> {
    let start = parse_timestamp(&wire.start_time)?;
    let end = parse_timestamp(&wire.end_time)?;
    Some(Booking {
        id: wire.id,
        room_id: wire.room_id,
        user_id: wire.user_id,
        title: wire.meeting_title,
        interval: TimeInterval::new(start, end),
        attendees_count: wire.attendees_count,
        equipment: parse_equipment(wire.selected_equipment),
        status: parse_status(wire.status.as_deref()),
        user_name: wire.user_name,
        room_name: wire.room_name,
    })
}

/// Decodes one booking object. Returns `None` when it is malformed.
pub fn parse_booking(value: Value) -> Option<Booking> {
    match serde_json::from_value::<WireBooking>(value) {
        Ok(wire) => {
            let id = wire.id;
            let booking = booking_from_wire(wire);
            if booking.is_none() {
                warn!(booking_id = id, "Dropping booking with unreadable timestamps");
            }
            booking
        }
        Err(e) => {
            warn!(error = %e, "Dropping malformed booking");
            None
        }
    }
}

/// Decodes a booking list, skipping malformed entries so the rest still
/// render.
pub fn parse_bookings(body: Value) -> Result<Vec<Booking>, ClientError> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("bookings") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(ClientError::UnexpectedResponse(
                    "expected a list of bookings".to_string(),
                ));
            }
        },
        Value::Null => Vec::new(),
        _ => {
            return Err(ClientError::UnexpectedResponse(
                "expected a list of bookings".to_string(),
            ));
        }
    };
    Ok(items.into_iter().filter_map(parse_booking).collect())
}

/// Decodes the room list, dropping rooms that cannot hold anyone.
pub fn parse_rooms(body: Value) -> Result<Vec<Room>, ClientError> {
    let rooms: Vec<Room> = serde_json::from_value(body)?;
    Ok(rooms
        .into_iter()
        .filter(|room| {
            if room.capacity == 0 {
                warn!(room_id = room.id, "Dropping room with zero capacity");
            }
            room.capacity > 0
        })
        .collect())
}

/// Request body for `POST /bookings`.
pub fn build_create_body(candidate: &BookingCandidate) -> Value {
    json!({
        "userId": candidate.user_id,
        "roomId": candidate.room_id,
        "meetingTitle": candidate.title,
        "startTime": format_timestamp(candidate.interval.start),
        "endTime": format_timestamp(candidate.interval.end),
        "attendeesCount": candidate.attendees_count,
        "selectedEquipment": candidate.equipment.iter().collect::<Vec<_>>(),
    })
}

/// Interprets the create response.
///
/// The server answers `{"success": true, "booking": {...}}`; when only an id
/// comes back the booking is rebuilt from the candidate.
pub fn parse_create_response(
    body: Value,
    candidate: &BookingCandidate,
) -> Result<Booking, ClientError> {
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(ClientError::Rejected(rejection_from(200, &body)));
    }

    if let Some(booking) = body.get("booking").cloned().and_then(parse_booking) {
        return Ok(booking);
    }

    let id = ["bookingId", "booking_id", "id"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_i64))
        .ok_or_else(|| {
            ClientError::UnexpectedResponse("create response carries no booking".to_string())
        })?;

    Ok(Booking {
        id,
        room_id: candidate.room_id,
        user_id: candidate.user_id,
        title: candidate.title.clone(),
        interval: candidate.interval,
        attendees_count: candidate.attendees_count,
        equipment: candidate.equipment.clone(),
        status: BookingStatus::Confirmed,
        user_name: None,
        room_name: None,
    })
}

/// Builds a rejection from an error body (`{"error": ...}` or
/// `{"code": ..., "message": ...}`).
pub fn rejection_from(status: u16, body: &Value) -> Rejection {
    let message = ["error", "message"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .or_else(|| body.as_str())
        .unwrap_or("Unknown error")
        .to_string();
    let code = body
        .get("code")
        .and_then(|c| match c {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_else(|| status.to_string());
    Rejection {
        status,
        code,
        message,
    }
}

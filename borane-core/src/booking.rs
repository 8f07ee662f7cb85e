use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::room::RoomId;
use crate::time::TimeInterval;

pub type BookingId = i64;
pub type UserId = i64;

/// Booking lifecycle. The only transition is `Confirmed -> Cancelled`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Confirmed,
    Cancelled,
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingStatus::Confirmed => write!(f, "confirmed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A reservation of one room for one interval, as held by the server.
///
/// The client keeps a read-only copy per fetch and replaces it wholesale on
/// the next response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub room_id: RoomId,
    pub user_id: UserId,
    pub title: String,
    pub interval: TimeInterval,
    pub attendees_count: u32,
    pub equipment: BTreeSet<String>,
    pub status: BookingStatus,
    /// Display name of the booking user, when the server joins it in
    pub user_name: Option<String>,
    /// Display name of the room, when the server joins it in
    pub room_name: Option<String>,
}

impl Booking {
    pub fn is_confirmed(&self) -> bool {
        self.status == BookingStatus::Confirmed
    }

    /// A booking can be cancelled until it starts.
    pub fn is_cancellable(&self, now: NaiveDateTime) -> bool {
        self.is_confirmed() && self.interval.start > now
    }

    /// Moves a confirmed booking to `Cancelled`. Already cancelled bookings
    /// are left as they are.
    pub fn cancel(&mut self) {
        self.status = BookingStatus::Cancelled;
    }

    /// Intervals that still occupy their room, for seeding the validator.
    pub fn blocking_intervals(bookings: &[Booking]) -> Vec<TimeInterval> {
        bookings
            .iter()
            .filter(|b| b.is_confirmed())
            .map(|b| b.interval)
            .collect()
    }
}

/// A booking request before the server has assigned it an id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingCandidate {
    pub user_id: UserId,
    pub room_id: RoomId,
    pub title: String,
    pub interval: TimeInterval,
    pub attendees_count: u32,
    pub equipment: BTreeSet<String>,
}

use std::future::Future;

use borane_core::{Booking, BookingCandidate, BookingId, Room, RoomId, UserId};
use chrono::NaiveDate;

use crate::error::ClientError;

/// The booking server as seen by the client.
///
/// [`crate::BookingClient`] talks HTTP; tests and offline tools can provide
/// their own implementation. Every call is authoritative: `create_booking`
/// may refuse a request the local validator accepted.
pub trait BookingService: Send + Sync {
    fn list_rooms(&self) -> impl Future<Output = Result<Vec<Room>, ClientError>> + Send;

    /// Bookings of one room on one day, used to seed the validator.
    fn list_room_bookings_for_date(
        &self,
        room_id: RoomId,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<Booking>, ClientError>> + Send;

    /// Bookings of every room on one day, used to build the timeline.
    fn list_bookings_for_date(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<Booking>, ClientError>> + Send;

    fn list_today_bookings(&self) -> impl Future<Output = Result<Vec<Booking>, ClientError>> + Send;

    fn list_user_bookings(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<Booking>, ClientError>> + Send;

    fn create_booking(
        &self,
        candidate: &BookingCandidate,
    ) -> impl Future<Output = Result<Booking, ClientError>> + Send;

    fn cancel_booking(
        &self,
        booking_id: BookingId,
        requester_id: UserId,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;
}

use borane_core::{Booking, BookingCandidate, BookingId, Room, RoomId, UserId};
use chrono::NaiveDate;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::convert::{
    build_create_body, parse_bookings, parse_create_response, parse_rooms, rejection_from,
};
use crate::error::ClientError;
use crate::service::BookingService;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// HTTP client for the booking server.
pub struct BookingClient {
    http: reqwest::Client,
    base_url: String,
}

impl BookingClient {
    /// Creates a client against the default local server.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL, e.g. `https://rooms.example.com/api`.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Creates a client around a preconfigured `reqwest::Client` (timeouts,
    /// proxy settings).
    pub fn with_http_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let mut client = Self::with_base_url(base_url);
        client.http = http;
        client
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ClientError> {
        let mut request = self.http.get(self.url(path));
        if !query.is_empty() {
            request = request.query(query);
        }
        read_body(request.send().await?).await
    }
}

impl Default for BookingClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads a response body, turning non-2xx statuses into rejections.
async fn read_body(response: reqwest::Response) -> Result<Value, ClientError> {
    let status = response.status();
    let text = response.text().await?;

    let body = if text.trim().is_empty() {
        Value::Null
    } else if status.is_success() {
        serde_json::from_str(&text)?
    } else {
        serde_json::from_str(&text).unwrap_or(Value::String(text))
    };

    if !status.is_success() {
        let rejection = rejection_from(status.as_u16(), &body);
        debug!(status = rejection.status, code = %rejection.code, "Request rejected");
        return Err(ClientError::Rejected(rejection));
    }

    Ok(body)
}

fn date_param(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

impl BookingService for BookingClient {
    #[instrument(skip(self))]
    async fn list_rooms(&self) -> Result<Vec<Room>, ClientError> {
        let body = self.get_json("/rooms", &[]).await?;
        let rooms = parse_rooms(body)?;
        debug!(count = rooms.len(), "Fetched rooms");
        Ok(rooms)
    }

    #[instrument(skip(self))]
    async fn list_room_bookings_for_date(
        &self,
        room_id: RoomId,
        date: NaiveDate,
    ) -> Result<Vec<Booking>, ClientError> {
        let body = self
            .get_json(
                &format!("/rooms/{}/availability", room_id),
                &[("date", date_param(date))],
            )
            .await?;
        parse_bookings(body)
    }

    #[instrument(skip(self))]
    async fn list_bookings_for_date(&self, date: NaiveDate) -> Result<Vec<Booking>, ClientError> {
        let body = self
            .get_json("/bookings", &[("date", date_param(date))])
            .await?;
        parse_bookings(body)
    }

    #[instrument(skip(self))]
    async fn list_today_bookings(&self) -> Result<Vec<Booking>, ClientError> {
        let body = self.get_json("/bookings/today", &[]).await?;
        parse_bookings(body)
    }

    #[instrument(skip(self))]
    async fn list_user_bookings(&self, user_id: UserId) -> Result<Vec<Booking>, ClientError> {
        let body = self
            .get_json(&format!("/users/{}/bookings", user_id), &[])
            .await?;
        parse_bookings(body)
    }

    #[instrument(skip(self, candidate), fields(room_id = candidate.room_id))]
    async fn create_booking(&self, candidate: &BookingCandidate) -> Result<Booking, ClientError> {
        debug!("Submitting booking");
        let response = self
            .http
            .post(self.url("/bookings"))
            .json(&build_create_body(candidate))
            .send()
            .await?;
        let body = read_body(response).await?;
        let booking = parse_create_response(body, candidate)?;
        debug!(booking_id = booking.id, "Booking created");
        Ok(booking)
    }

    #[instrument(skip(self))]
    async fn cancel_booking(
        &self,
        booking_id: BookingId,
        requester_id: UserId,
    ) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(self.url(&format!("/bookings/{}", booking_id)))
            .json(&json!({ "userId": requester_id }))
            .send()
            .await?;
        let body = read_body(response).await?;

        if body.get("success").and_then(Value::as_bool) == Some(false) {
            return Err(ClientError::Rejected(rejection_from(200, &body)));
        }
        Ok(())
    }
}

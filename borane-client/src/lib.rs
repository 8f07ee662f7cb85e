//! HTTP client for the Borane booking server.
//!
//! Wraps the server's REST endpoints behind the [`BookingService`] trait and
//! converts its JSON into [`borane_core`] types. Malformed bookings in a list
//! are dropped with a warning rather than failing the whole request.
//!
//! # Example
//!
//! ```ignore
//! use borane_client::{BookingClient, BookingService};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = BookingClient::with_base_url("http://localhost:5000/api");
//!     for room in client.list_rooms().await.unwrap() {
//!         println!("{} ({} people)", room.name, room.capacity);
//!     }
//! }
//! ```

mod client;
mod convert;
mod error;
mod service;

pub use client::{BookingClient, DEFAULT_BASE_URL};
pub use convert::{
    build_create_body, format_timestamp, parse_booking, parse_bookings, parse_create_response,
    parse_rooms, parse_timestamp, rejection_from,
};
pub use error::{ClientError, Rejection};
pub use service::BookingService;

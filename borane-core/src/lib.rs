//! Borane Core - room-booking data model and the client-side scheduling logic.
//!
//! Two pure components live here:
//! - [`validate`]: decides whether a proposed booking interval is acceptable
//!   against existing bookings and the [`BusinessRules`]
//! - [`layout`]: maps a day's bookings onto a fixed [`SlotGrid`] per room
//!
//! Both are advisory. The booking server stays the system of record and may
//! still reject a request the validator accepted.
//!
//! # Example
//!
//! ```
//! use borane_core::{validate, BusinessRules, TimeInterval};
//! use chrono::NaiveDate;
//!
//! let day = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
//! let now = day.and_hms_opt(8, 0, 0).unwrap();
//! let existing = [TimeInterval::new(
//!     day.and_hms_opt(10, 0, 0).unwrap(),
//!     day.and_hms_opt(11, 0, 0).unwrap(),
//! )];
//!
//! // Back-to-back with the existing booking is fine.
//! let proposed = TimeInterval::new(
//!     day.and_hms_opt(11, 0, 0).unwrap(),
//!     day.and_hms_opt(12, 0, 0).unwrap(),
//! );
//! assert!(validate(&proposed, &existing, &BusinessRules::default(), now).is_ok());
//! ```

pub mod booking;
pub mod fit;
pub mod room;
pub mod rules;
pub mod time;
pub mod timeline;
pub mod validate;

pub use booking::{Booking, BookingCandidate, BookingId, BookingStatus, UserId};
pub use fit::{check_room_fit, RoomFitError};
pub use room::{Room, RoomId};
pub use rules::BusinessRules;
pub use time::TimeInterval;
pub use timeline::{layout, row_cells, SlotCell, SlotGrid, Span, Timeline};
pub use validate::{find_conflict, overlaps, validate, ValidationError};

use borane_core::{BookingId, RoomFitError, RoomId, ValidationError};
use thiserror::Error;

use crate::form::FormError;

#[derive(Debug, Error)]
pub enum BrnError {
    #[error(
        "No user configured. Set BORANE_USER_ID, pass --user-id, or add [user] id to ~/.config/borane/config.toml"
    )]
    UserNotConfigured,

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Client(#[from] borane_client::ClientError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    RoomFit(#[from] RoomFitError),

    #[error("{0}")]
    Form(#[from] FormError),

    #[error("Room not found: {0}")]
    RoomNotFound(RoomId),

    #[error("Booking not found: {0}")]
    BookingNotFound(BookingId),

    #[error("This booking cannot be cancelled (already started or in the past)")]
    NotCancellable(BookingId),

    #[error("Failed to set up logging: {0}")]
    Logging(String),
}

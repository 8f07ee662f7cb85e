use thiserror::Error;

use crate::booking::BookingCandidate;
use crate::room::Room;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomFitError {
    #[error("At least one attendee is required")]
    NoAttendees,

    #[error("{room} holds at most {capacity} people")]
    OverCapacity { room: String, capacity: u32 },

    #[error("{room} has no {item}")]
    UnknownEquipment { room: String, item: String },
}

/// Checks that a candidate fits the room it targets: attendee count within
/// capacity and only equipment the room actually offers.
pub fn check_room_fit(candidate: &BookingCandidate, room: &Room) -> Result<(), RoomFitError> {
    if candidate.attendees_count == 0 {
        return Err(RoomFitError::NoAttendees);
    }
    if candidate.attendees_count > room.capacity {
        return Err(RoomFitError::OverCapacity {
            room: room.name.clone(),
            capacity: room.capacity,
        });
    }
    if let Some(item) = candidate.equipment.iter().find(|i| !room.has_equipment(i)) {
        return Err(RoomFitError::UnknownEquipment {
            room: room.name.clone(),
            item: item.clone(),
        });
    }
    Ok(())
}

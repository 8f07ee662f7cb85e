use serde::{Deserialize, Serialize};

/// Server-assigned room identifier
pub type RoomId = i64;

/// A bookable meeting room (static reference data)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub capacity: u32,
    /// Equipment in the order the server lists it
    #[serde(default)]
    pub equipment: Vec<String>,
}

impl Room {
    pub fn has_equipment(&self, item: &str) -> bool {
        self.equipment.iter().any(|e| e == item)
    }
}

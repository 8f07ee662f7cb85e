use serde::{Deserialize, Serialize};

/// Longest booking a rule set may allow.
pub const MAX_DURATION_MINUTES: i64 = 24 * 60;

/// Booking policy enforced before a request is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessRules {
    /// First hour a booking may start in
    pub open_hour: u32,
    /// Bookings must end at or before `close_hour:00`
    pub close_hour: u32,
    pub min_duration_minutes: i64,
    pub max_duration_minutes: i64,
}

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            open_hour: 9,
            close_hour: 20,
            min_duration_minutes: 30,
            max_duration_minutes: 300,
        }
    }
}

impl BusinessRules {
    /// Rejects rule sets that no interval could satisfy, and durations
    /// longer than a day.
    pub fn is_consistent(&self) -> bool {
        self.open_hour < self.close_hour
            && self.close_hour <= 24
            && self.min_duration_minutes >= 0
            && self.min_duration_minutes <= self.max_duration_minutes
            && self.max_duration_minutes <= MAX_DURATION_MINUTES
    }
}

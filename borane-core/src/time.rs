use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// A half-open span of local wall-clock time.
///
/// Well-formed intervals have `start < end`. Intervals built from user input
/// may violate that; [`crate::validate`] reports them as too short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeInterval {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Calendar day the interval starts on.
    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }
}

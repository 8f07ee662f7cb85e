//! Daily timeline layout: bookings onto a fixed grid of half-hour slots.

use std::collections::BTreeMap;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::booking::Booking;
use crate::room::RoomId;

/// Width of one grid column.
pub const SLOT_MINUTES: u32 = 30;

const SLOTS_PER_HOUR: u32 = 60 / SLOT_MINUTES;

/// Display window of the timeline.
///
/// Columns run from `start_hour:00` up to and including the `end_hour:00`
/// label, so the default 09:00-22:00 window has 27 columns. Timestamps in the
/// `end_hour` hour or later are off-grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotGrid {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl Default for SlotGrid {
    fn default() -> Self {
        Self {
            start_hour: 9,
            end_hour: 22,
        }
    }
}

impl SlotGrid {
    pub fn new(start_hour: u32, end_hour: u32) -> Option<Self> {
        let grid = Self {
            start_hour,
            end_hour,
        };
        grid.is_valid().then_some(grid)
    }

    pub fn is_valid(&self) -> bool {
        self.start_hour < self.end_hour && self.end_hour <= 24
    }

    pub fn slot_count(&self) -> usize {
        (self.end_hour.saturating_sub(self.start_hour) * SLOTS_PER_HOUR + 1) as usize
    }

    /// Column a timestamp falls in, or `None` when it is off-grid.
    pub fn slot_index(&self, t: NaiveDateTime) -> Option<usize> {
        let hour = t.hour();
        if hour < self.start_hour || hour >= self.end_hour {
            return None;
        }
        let half = u32::from(t.minute() >= SLOT_MINUTES);
        Some(((hour - self.start_hour) * SLOTS_PER_HOUR + half) as usize)
    }

    /// Column headers, `"09:00"`, `"09:30"`, ...
    pub fn labels(&self) -> Vec<String> {
        (0..self.slot_count() as u32)
            .map(|i| {
                let minutes = self.start_hour * 60 + i * SLOT_MINUTES;
                format!("{:02}:{:02}", minutes / 60, minutes % 60)
            })
            .collect()
    }
}

/// A booking's footprint on one room's row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span<'a> {
    pub start_slot: usize,
    pub slot_count: usize,
    pub booking: &'a Booking,
}

impl Span<'_> {
    /// Whether `slot` falls in the columns this span occupies.
    pub fn covers(&self, slot: usize) -> bool {
        slot >= self.start_slot && slot < self.start_slot + self.slot_count
    }
}

/// Spans per room, as produced by [`layout`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline<'a> {
    rows: BTreeMap<RoomId, Vec<Span<'a>>>,
}

impl<'a> Timeline<'a> {
    /// Spans for one room. Rooms with no bookings get an empty slice.
    pub fn spans_for(&self, room_id: RoomId) -> &[Span<'a>] {
        self.rows.get(&room_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RoomId, &Vec<Span<'a>>)> {
        self.rows.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.values().all(Vec::is_empty)
    }
}

/// Lays bookings out on the grid, grouped by room.
///
/// Bookings whose start is off-grid produce no span. Spans running past the
/// last column are clipped to the grid. Cancelled bookings are skipped.
pub fn layout<'a>(bookings: &'a [Booking], grid: &SlotGrid) -> Timeline<'a> {
    let mut rows: BTreeMap<RoomId, Vec<Span<'a>>> = BTreeMap::new();

    for booking in bookings.iter().filter(|b| b.is_confirmed()) {
        let row = rows.entry(booking.room_id).or_default();
        if let Some(span) = span_for(booking, grid) {
            row.push(span);
        }
    }

    Timeline { rows }
}

fn span_for<'a>(booking: &'a Booking, grid: &SlotGrid) -> Option<Span<'a>> {
    let start_slot = grid.slot_index(booking.interval.start)?;
    let remaining = grid.slot_count() - start_slot;

    let slot_count = match grid.slot_index(booking.interval.end) {
        Some(end_slot) if end_slot > start_slot => (end_slot - start_slot).min(remaining),
        Some(_) => 1,
        None => remaining,
    };

    Some(Span {
        start_slot,
        slot_count,
        booking,
    })
}

/// What one column of a room's row shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotCell<'s, 'a> {
    /// A span begins here and stretches over `span.slot_count` columns
    Start(&'s Span<'a>),
    /// Drawn by an earlier span
    Covered,
    Free,
}

/// Resolves a row into one cell per grid column.
///
/// Each column is drawn at most once: a span starting inside a column already
/// covered by an earlier span is suppressed.
pub fn row_cells<'s, 'a>(spans: &'s [Span<'a>], grid: &SlotGrid) -> Vec<SlotCell<'s, 'a>> {
    let columns = grid.slot_count();
    let mut cells = Vec::with_capacity(columns);
    let mut drawn: Option<&'s Span<'a>> = None;

    for column in 0..columns {
        if drawn.is_some_and(|span| span.covers(column)) {
            cells.push(SlotCell::Covered);
            continue;
        }
        match spans.iter().find(|s| s.start_slot == column) {
            Some(span) => {
                drawn = Some(span);
                cells.push(SlotCell::Start(span));
            }
            None => cells.push(SlotCell::Free),
        }
    }

    cells
}

//! Text building blocks shared by the CLI output and the dashboard.

use borane_core::{layout, row_cells, Booking, Room, SlotCell, SlotGrid};
use chrono::NaiveDateTime;

/// Characters per grid column.
pub const CELL_WIDTH: usize = 2;

/// A run of one room's row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Free,
    Booked { slots: usize, booking: &'a Booking },
}

impl Segment<'_> {
    pub fn slots(&self) -> usize {
        match self {
            Segment::Free => 1,
            Segment::Booked { slots, .. } => *slots,
        }
    }

    /// Fixed-width text for the segment: `. ` per free column, the booking
    /// title squeezed into `[title===` for a booked run.
    pub fn text(&self) -> String {
        match self {
            Segment::Free => format!("{:<w$}", ".", w = CELL_WIDTH),
            Segment::Booked { slots, booking } => {
                let width = slots * CELL_WIDTH - 1;
                let title: String = booking.title.chars().take(width).collect();
                format!("[{:=<w$}", title, w = width)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineRow<'a> {
    pub room: &'a Room,
    pub segments: Vec<Segment<'a>>,
}

/// One row per room, in the order given, each covering the whole grid.
pub fn timeline_rows<'a>(
    rooms: &'a [Room],
    bookings: &'a [Booking],
    grid: &SlotGrid,
) -> Vec<TimelineRow<'a>> {
    let timeline = layout(bookings, grid);

    rooms
        .iter()
        .map(|room| {
            let segments = row_cells(timeline.spans_for(room.id), grid)
                .into_iter()
                .filter_map(|cell| match cell {
                    SlotCell::Start(span) => Some(Segment::Booked {
                        slots: span.slot_count,
                        booking: span.booking,
                    }),
                    SlotCell::Covered => None,
                    SlotCell::Free => Some(Segment::Free),
                })
                .collect();
            TimelineRow { room, segments }
        })
        .collect()
}

/// Hour markers above the grid: `09  10  11 ...`
pub fn grid_header(grid: &SlotGrid) -> String {
    grid.labels()
        .iter()
        .map(|label| {
            let mark = if label.ends_with(":00") { &label[..2] } else { "" };
            format!("{:<w$}", mark, w = CELL_WIDTH)
        })
        .collect()
}

pub fn time_range(booking: &Booking) -> String {
    format!(
        "{}-{}",
        booking.interval.start.format("%H:%M"),
        booking.interval.end.format("%H:%M")
    )
}

/// One line describing a booking, used by `brn bookings` and the dashboard.
pub fn booking_line(booking: &Booking, now: NaiveDateTime) -> String {
    let room = booking
        .room_name
        .clone()
        .unwrap_or_else(|| format!("room {}", booking.room_id));
    let marker = if !booking.is_confirmed() {
        " [cancelled]"
    } else if booking.is_cancellable(now) {
        " [cancellable]"
    } else {
        ""
    };

    format!(
        "#{:<5} {} {}  {:<16} {}  ({}){}",
        booking.id,
        booking.interval.start.format("%Y-%m-%d"),
        time_range(booking),
        room,
        booking.title,
        booking_details(booking),
        marker
    )
}

/// Attendee count followed by any reserved equipment: `3 people, projector`
fn booking_details(booking: &Booking) -> String {
    let people = match booking.attendees_count {
        1 => "1 person".to_string(),
        n => format!("{n} people"),
    };
    std::iter::once(people)
        .chain(booking.equipment.iter().cloned())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn room_line(room: &Room) -> String {
    let equipment = if room.equipment.is_empty() {
        "-".to_string()
    } else {
        room.equipment.join(", ")
    };
    format!(
        "{:>4}  {:<20} {:>3} seats  {}",
        room.id, room.name, room.capacity, equipment
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use borane_core::{BookingStatus, TimeInterval};
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn room(id: i64, name: &str) -> Room {
        Room {
            id,
            name: name.to_string(),
            capacity: 6,
            equipment: vec![],
        }
    }

    fn booking(id: i64, room_id: i64, start: NaiveDateTime, end: NaiveDateTime) -> Booking {
        Booking {
            id,
            room_id,
            user_id: 1,
            title: "Sync".to_string(),
            interval: TimeInterval::new(start, end),
            attendees_count: 2,
            equipment: BTreeSet::new(),
            status: BookingStatus::Confirmed,
            user_name: None,
            room_name: Some("Atrium".to_string()),
        }
    }

    #[test]
    fn test_rows_cover_whole_grid() {
        let grid = SlotGrid::default();
        let rooms = vec![room(1, "Atrium"), room(2, "Cellar")];
        let bookings = vec![
            booking(1, 1, at(10, 0), at(11, 30)),
            booking(2, 1, at(10, 30), at(11, 0)),
        ];

        let rows = timeline_rows(&rooms, &bookings, &grid);
        assert_eq!(rows.len(), 2);
        for row in &rows {
            let total: usize = row.segments.iter().map(Segment::slots).sum();
            assert_eq!(total, grid.slot_count());
        }

        assert_eq!(
            rows[0].segments[2],
            Segment::Booked {
                slots: 3,
                booking: &bookings[0],
            }
        );
        assert!(rows[1].segments.iter().all(|s| *s == Segment::Free));
    }

    #[test]
    fn test_segment_text_width() {
        let b = booking(1, 1, at(10, 0), at(11, 0));
        let seg = Segment::Booked {
            slots: 2,
            booking: &b,
        };
        assert_eq!(seg.text(), "[Syn");
        assert_eq!(Segment::Free.text(), ". ");

        let seg = Segment::Booked {
            slots: 4,
            booking: &b,
        };
        assert_eq!(seg.text(), "[Sync===");
    }

    #[test]
    fn test_grid_header() {
        let header = grid_header(&SlotGrid::default());
        assert!(header.starts_with("09  10  "));
        assert!(header.trim_end().ends_with("22"));
        assert_eq!(header.len(), 27 * CELL_WIDTH);
    }

    #[test]
    fn test_booking_line_markers() {
        let mut b = booking(12, 1, at(14, 0), at(15, 0));
        let line = booking_line(&b, at(9, 0));
        assert!(line.starts_with("#12"));
        assert!(line.contains("14:00-15:00"));
        assert!(line.ends_with("[cancellable]"));

        assert!(!booking_line(&b, at(14, 0)).contains('['));

        b.cancel();
        assert!(booking_line(&b, at(9, 0)).ends_with("[cancelled]"));
    }

    #[test]
    fn test_booking_line_details() {
        let mut b = booking(4, 1, at(14, 0), at(15, 0));
        assert!(booking_line(&b, at(14, 0)).ends_with("Sync  (2 people)"));

        b.attendees_count = 1;
        b.equipment = ["whiteboard", "projector"]
            .into_iter()
            .map(String::from)
            .collect();
        let line = booking_line(&b, at(9, 0));
        assert!(line.contains("Sync  (1 person, projector, whiteboard)"));
        assert!(line.ends_with("[cancellable]"));
    }
}

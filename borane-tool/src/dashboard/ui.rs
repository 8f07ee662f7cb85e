use borane_core::{BookingId, SlotGrid, UserId};
use chrono::NaiveDateTime;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame,
};

use super::state::{DashboardState, Field, FormState, Load, NoticeKind, Tab};
use crate::render::{booking_line, grid_header, room_line, time_range, timeline_rows, Segment};

/// Values the view needs besides the state
pub struct ViewContext<'a> {
    pub now: NaiveDateTime,
    pub user_id: UserId,
    pub user_name: Option<&'a str>,
    pub grid: &'a SlotGrid,
}

const FIELDS: [Field; 4] = [Field::Title, Field::Start, Field::End, Field::Attendees];

pub fn render(frame: &mut Frame, state: &DashboardState, ctx: &ViewContext) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Min(1),    // Body
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_tabs(frame, state, ctx, chunks[0]);
    match state.tab {
        Tab::Rooms => render_rooms(frame, state, chunks[1]),
        Tab::Timeline => render_timeline(frame, state, ctx, chunks[1]),
        Tab::MyBookings => render_my_bookings(frame, state, ctx, chunks[1]),
    }
    render_status_bar(frame, state, chunks[2]);

    if let Some(form) = &state.form {
        render_form(frame, form);
    }
    if let Some(id) = state.confirm_cancel {
        render_confirm(frame, id);
    }
}

fn render_tabs(frame: &mut Frame, state: &DashboardState, ctx: &ViewContext, area: Rect) {
    let who = match ctx.user_name {
        Some(name) => format!("{} (#{})", name, ctx.user_id),
        None => format!("user #{}", ctx.user_id),
    };
    let title = format!("brn - {} - {}", who, ctx.now.format("%Y-%m-%d %H:%M"));

    let tabs = Tabs::new(Tab::ALL.iter().map(|t| t.title()))
        .block(Block::default().borders(Borders::ALL).title(title))
        .select(state.tab.index())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

/// Placeholder text for a collection that is not loaded yet.
fn load_message<T>(load: &Load<T>) -> Option<Line<'static>> {
    match load {
        Load::Idle => Some(Line::from("")),
        Load::Loading => Some(Line::from(Span::styled(
            "Loading...",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        ))),
        Load::Failed(e) => Some(Line::from(Span::styled(
            format!("Error: {}", e),
            Style::default().fg(Color::Red),
        ))),
        Load::Loaded(_) => None,
    }
}

fn render_list(frame: &mut Frame, area: Rect, title: &str, items: Vec<ListItem>, selected: usize) {
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut list_state = ListState::default();
    list_state.select(Some(selected));

    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_placeholder(frame: &mut Frame, area: Rect, title: &str, line: Line) {
    let paragraph =
        Paragraph::new(line).block(Block::default().borders(Borders::ALL).title(title.to_string()));
    frame.render_widget(paragraph, area);
}

fn render_rooms(frame: &mut Frame, state: &DashboardState, area: Rect) {
    let Some(rooms) = state.rooms.loaded() else {
        if let Some(line) = load_message(&state.rooms) {
            render_placeholder(frame, area, "Rooms", line);
        }
        return;
    };

    let items: Vec<ListItem> = rooms.iter().map(|r| ListItem::new(room_line(r))).collect();
    render_list(frame, area, "Rooms", items, state.selected_room);
}

fn render_timeline(frame: &mut Frame, state: &DashboardState, ctx: &ViewContext, area: Rect) {
    let (rooms, bookings) = match (state.rooms.loaded(), state.today.loaded()) {
        (Some(rooms), Some(bookings)) => (rooms, bookings),
        _ => {
            let line = load_message(&state.rooms)
                .or_else(|| load_message(&state.today))
                .unwrap_or_default();
            render_placeholder(frame, area, "Today", line);
            return;
        }
    };

    let name_width = rooms
        .iter()
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(0)
        .min(20);

    let mut lines = vec![Line::from(Span::styled(
        format!("{:<w$}   {}", "", grid_header(ctx.grid), w = name_width),
        Style::default().fg(Color::DarkGray),
    ))];

    for (index, row) in timeline_rows(rooms, bookings, ctx.grid).into_iter().enumerate() {
        let selected = index == state.selected_room;
        let name: String = row.room.name.chars().take(name_width).collect();
        let name_style = if selected {
            Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };

        let mut spans = vec![
            Span::styled(format!("{:<w$}", name, w = name_width), name_style),
            Span::raw("   "),
        ];
        spans.extend(row.segments.iter().map(|segment| {
            let style = match segment {
                Segment::Free => Style::default().fg(Color::DarkGray),
                Segment::Booked { booking, .. } if booking.user_id == ctx.user_id => {
                    Style::default().fg(Color::Black).bg(Color::Green)
                }
                Segment::Booked { .. } => Style::default().fg(Color::Black).bg(Color::Blue),
            };
            Span::styled(segment.text(), style)
        }));
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    let mut confirmed: Vec<_> = bookings.iter().filter(|b| b.is_confirmed()).collect();
    confirmed.sort_by_key(|b| b.interval.start);
    for booking in confirmed {
        let room = rooms
            .iter()
            .find(|r| r.id == booking.room_id)
            .map(|r| r.name.as_str())
            .unwrap_or("?");
        let who = booking.user_name.as_deref().unwrap_or("");
        lines.push(Line::from(vec![
            Span::styled(time_range(booking), Style::default().fg(Color::Cyan)),
            Span::raw(format!("  {:<w$}  {}", room, booking.title, w = name_width)),
            Span::styled(format!("  {}", who), Style::default().fg(Color::DarkGray)),
        ]));
    }

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title("Today"))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_my_bookings(frame: &mut Frame, state: &DashboardState, ctx: &ViewContext, area: Rect) {
    if let Some(line) = load_message(&state.mine) {
        render_placeholder(frame, area, "My bookings", line);
        return;
    }

    let bookings = state.my_bookings();
    if bookings.is_empty() {
        render_placeholder(frame, area, "My bookings", Line::from("No bookings"));
        return;
    }

    let items: Vec<ListItem> = bookings
        .iter()
        .map(|b| {
            let style = if b.is_cancellable(ctx.now) {
                Style::default()
            } else {
                Style::default().fg(Color::DarkGray)
            };
            ListItem::new(booking_line(b, ctx.now)).style(style)
        })
        .collect();
    render_list(frame, area, "My bookings", items, state.selected_booking);
}

fn render_status_bar(frame: &mut Frame, state: &DashboardState, area: Rect) {
    let bar = if let Some(notice) = &state.notice {
        let color = match notice.kind {
            NoticeKind::Info => Color::Green,
            NoticeKind::Error => Color::Red,
        };
        Paragraph::new(notice.text.clone()).style(Style::default().fg(color))
    } else {
        let help = if state.confirm_cancel.is_some() {
            "y/Enter: Cancel booking  n/Esc: Keep"
        } else if state.form.is_some() {
            "Tab/↑/↓: Field  ←/→: Equipment  Space: Toggle  Enter: Book  Esc: Close"
        } else {
            match state.tab {
                Tab::MyBookings => "↑/↓: Select  c: Cancel booking  r: Refresh  Tab: Switch  q: Quit",
                _ => "↑/↓: Select  Enter: Book room  r: Refresh  Tab: Switch  q: Quit",
            }
        };
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray))
    };

    frame.render_widget(bar, area);
}

fn render_form(frame: &mut Frame, form: &FormState) {
    let area = centered_rect(60, 70, frame.area());
    frame.render_widget(Clear, area);

    let focused = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::from(format!(
            "{} on {}, up to {} people",
            form.room.name,
            form.date.format("%Y-%m-%d"),
            form.room.capacity
        )),
        Line::from(""),
    ];

    for field in FIELDS {
        let style = if form.focus == field { focused } else { Style::default() };
        lines.push(Line::from(vec![
            Span::styled(format!("{:<15}", field.label()), style),
            Span::raw(form.field_value(field).to_string()),
        ]));
    }

    let equipment_style = if form.focus == Field::Equipment {
        focused
    } else {
        Style::default()
    };
    let mut equipment = vec![Span::styled(
        format!("{:<15}", Field::Equipment.label()),
        equipment_style,
    )];
    if form.room.equipment.is_empty() {
        equipment.push(Span::styled("none", Style::default().fg(Color::DarkGray)));
    }
    for (i, item) in form.room.equipment.iter().enumerate() {
        let mark = if form.fields.equipment.contains(item) { "x" } else { " " };
        let style = if form.focus == Field::Equipment && i == form.equipment_cursor {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        equipment.push(Span::styled(format!("[{}] {}", mark, item), style));
        equipment.push(Span::raw("  "));
    }
    lines.push(Line::from(equipment));
    lines.push(Line::from(""));

    match &form.existing {
        Load::Loaded(existing) => {
            let mut taken: Vec<_> = existing.iter().filter(|b| b.is_confirmed()).collect();
            taken.sort_by_key(|b| b.interval.start);
            let summary = if taken.is_empty() {
                "Free all day".to_string()
            } else {
                let ranges: Vec<String> = taken.iter().map(|b| time_range(b)).collect();
                format!("Taken: {}", ranges.join(", "))
            };
            lines.push(Line::from(Span::styled(summary, Style::default().fg(Color::DarkGray))));
        }
        other => {
            if let Some(line) = load_message(other) {
                lines.push(line);
            }
        }
    }

    if form.submitting {
        lines.push(Line::from(Span::styled(
            "Booking...",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        )));
    }
    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title("Book room"))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_confirm(frame: &mut Frame, booking_id: BookingId) {
    let area = centered_rect(40, 20, frame.area());
    frame.render_widget(Clear, area);

    let paragraph = Paragraph::new(format!("Cancel booking #{}? (y/n)", booking_id))
        .block(Block::default().borders(Borders::ALL).title("Confirm"));
    frame.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

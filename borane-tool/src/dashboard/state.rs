//! Dashboard state and its reducer.
//!
//! Every change goes through [`DashboardState::reduce`]. The reducer never
//! performs I/O; it returns [`Effect`]s which the run loop turns into
//! background requests whose results come back as actions.

use borane_core::{Booking, BookingCandidate, BookingId, BusinessRules, Room, RoomId, UserId};
use chrono::{NaiveDate, NaiveDateTime};

use crate::error::BrnError;
use crate::form::{check_candidate, BookingForm};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Rooms,
    Timeline,
    MyBookings,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Rooms, Tab::Timeline, Tab::MyBookings];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Rooms => "Rooms",
            Tab::Timeline => "Timeline",
            Tab::MyBookings => "My bookings",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Tab::Rooms => 0,
            Tab::Timeline => 1,
            Tab::MyBookings => 2,
        }
    }

    fn next(self) -> Self {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    fn prev(self) -> Self {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

/// A fetched collection and where it is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Load<T> {
    Idle,
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> Load<T> {
    pub fn loaded(&self) -> Option<&T> {
        match self {
            Load::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Load::Loading)
    }

    fn from_result(result: Result<T, String>) -> Self {
        match result {
            Ok(value) => Load::Loaded(value),
            Err(message) => Load::Failed(message),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Start,
    End,
    Attendees,
    Equipment,
}

impl Field {
    const ORDER: [Field; 5] = [
        Field::Title,
        Field::Start,
        Field::End,
        Field::Attendees,
        Field::Equipment,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Field::Title => "Title",
            Field::Start => "Start (HH:MM)",
            Field::End => "End (HH:MM)",
            Field::Attendees => "Attendees",
            Field::Equipment => "Equipment",
        }
    }

    fn position(self) -> usize {
        Field::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Field::ORDER[(self.position() + 1) % Field::ORDER.len()]
    }

    fn prev(self) -> Self {
        Field::ORDER[(self.position() + Field::ORDER.len() - 1) % Field::ORDER.len()]
    }
}

/// The booking popup for one room on one day
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub room: Room,
    pub date: NaiveDate,
    pub fields: BookingForm,
    pub focus: Field,
    pub equipment_cursor: usize,
    /// The room's bookings that day, fetched when the form opens
    pub existing: Load<Vec<Booking>>,
    pub submitting: bool,
    pub error: Option<String>,
}

impl FormState {
    fn new(room: Room, date: NaiveDate) -> Self {
        Self {
            room,
            date,
            fields: BookingForm::default(),
            focus: Field::Title,
            equipment_cursor: 0,
            existing: Load::Loading,
            submitting: false,
            error: None,
        }
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        match self.focus {
            Field::Title => Some(&mut self.fields.title),
            Field::Start => Some(&mut self.fields.start),
            Field::End => Some(&mut self.fields.end),
            Field::Attendees => Some(&mut self.fields.attendees),
            Field::Equipment => None,
        }
    }

    pub fn field_value(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.fields.title,
            Field::Start => &self.fields.start,
            Field::End => &self.fields.end,
            Field::Attendees => &self.fields.attendees,
            Field::Equipment => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}

/// Inputs to the reducer that come from outside the state
#[derive(Debug, Clone)]
pub struct Env {
    pub now: NaiveDateTime,
    pub rules: BusinessRules,
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    NextTab,
    PrevTab,
    SelectTab(Tab),
    Up,
    Down,
    Refresh,

    OpenForm,
    CloseForm,
    FocusNext,
    FocusPrev,
    Input(char),
    Backspace,
    PrevEquipment,
    NextEquipment,
    ToggleEquipment,
    Submit,

    RequestCancel,
    ConfirmCancel,
    DismissCancel,

    RoomsLoaded(Result<Vec<Room>, String>),
    TodayLoaded(Result<Vec<Booking>, String>),
    MineLoaded(Result<Vec<Booking>, String>),
    RoomBookingsLoaded {
        room_id: RoomId,
        result: Result<Vec<Booking>, String>,
    },
    BookingCreated(Result<Booking, String>),
    BookingCancelled {
        booking_id: BookingId,
        result: Result<(), String>,
    },
}

/// Requests the run loop performs on the reducer's behalf
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchRooms,
    FetchToday,
    FetchMine(UserId),
    FetchRoomBookings { room_id: RoomId, date: NaiveDate },
    CreateBooking(BookingCandidate),
    CancelBooking {
        booking_id: BookingId,
        requester_id: UserId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardState {
    pub tab: Tab,
    pub rooms: Load<Vec<Room>>,
    pub today: Load<Vec<Booking>>,
    pub mine: Load<Vec<Booking>>,
    pub selected_room: usize,
    pub selected_booking: usize,
    pub form: Option<FormState>,
    pub confirm_cancel: Option<BookingId>,
    pub notice: Option<Notice>,
    pub should_quit: bool,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            tab: Tab::Rooms,
            rooms: Load::Idle,
            today: Load::Idle,
            mine: Load::Idle,
            selected_room: 0,
            selected_booking: 0,
            form: None,
            confirm_cancel: None,
            notice: None,
            should_quit: false,
        }
    }
}

impl DashboardState {
    /// Marks everything as loading and asks for the initial fetches.
    pub fn start(&mut self, env: &Env) -> Vec<Effect> {
        self.rooms = Load::Loading;
        self.today = Load::Loading;
        self.mine = Load::Loading;
        vec![
            Effect::FetchRooms,
            Effect::FetchToday,
            Effect::FetchMine(env.user_id),
        ]
    }

    pub fn selected_room(&self) -> Option<&Room> {
        self.rooms.loaded()?.get(self.selected_room)
    }

    /// The user's bookings in display order (by start time).
    pub fn my_bookings(&self) -> Vec<&Booking> {
        let mut list: Vec<&Booking> = self
            .mine
            .loaded()
            .map(|v| v.iter().collect())
            .unwrap_or_default();
        list.sort_by_key(|b| b.interval.start);
        list
    }

    pub fn selected_booking(&self) -> Option<&Booking> {
        self.my_bookings().get(self.selected_booking).copied()
    }

    pub fn reduce(&mut self, action: Action, env: &Env) -> Vec<Effect> {
        match action {
            Action::Quit => {
                self.should_quit = true;
                vec![]
            }
            Action::NextTab => {
                self.tab = self.tab.next();
                vec![]
            }
            Action::PrevTab => {
                self.tab = self.tab.prev();
                vec![]
            }
            Action::SelectTab(tab) => {
                self.tab = tab;
                vec![]
            }
            Action::Up => {
                self.move_selection(-1);
                vec![]
            }
            Action::Down => {
                self.move_selection(1);
                vec![]
            }
            Action::Refresh => {
                self.notice = None;
                self.start(env)
            }

            Action::OpenForm => self.open_form(env),
            Action::CloseForm => {
                self.form = None;
                vec![]
            }
            Action::FocusNext | Action::FocusPrev | Action::Input(_) | Action::Backspace
            | Action::PrevEquipment | Action::NextEquipment | Action::ToggleEquipment => {
                self.edit_form(action);
                vec![]
            }
            Action::Submit => self.submit(env),

            Action::RequestCancel => {
                self.request_cancel(env);
                vec![]
            }
            Action::ConfirmCancel => match self.confirm_cancel.take() {
                Some(booking_id) => vec![Effect::CancelBooking {
                    booking_id,
                    requester_id: env.user_id,
                }],
                None => vec![],
            },
            Action::DismissCancel => {
                self.confirm_cancel = None;
                vec![]
            }

            Action::RoomsLoaded(result) => {
                self.rooms = Load::from_result(result);
                self.clamp_selection();
                vec![]
            }
            Action::TodayLoaded(result) => {
                self.today = Load::from_result(result);
                vec![]
            }
            Action::MineLoaded(result) => {
                self.mine = Load::from_result(result);
                self.clamp_selection();
                vec![]
            }
            Action::RoomBookingsLoaded { room_id, result } => {
                if let Some(form) = self.form.as_mut().filter(|f| f.room.id == room_id) {
                    form.existing = Load::from_result(result);
                }
                vec![]
            }
            Action::BookingCreated(result) => self.booking_created(result, env),
            Action::BookingCancelled { booking_id, result } => {
                self.booking_cancelled(booking_id, result);
                vec![]
            }
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let (index, len) = match self.tab {
            Tab::Rooms | Tab::Timeline => (
                &mut self.selected_room,
                self.rooms.loaded().map_or(0, Vec::len),
            ),
            Tab::MyBookings => (
                &mut self.selected_booking,
                self.mine.loaded().map_or(0, Vec::len),
            ),
        };
        if len == 0 {
            *index = 0;
            return;
        }
        *index = index.saturating_add_signed(delta).min(len - 1);
    }

    fn clamp_selection(&mut self) {
        let rooms = self.rooms.loaded().map_or(0, Vec::len);
        let mine = self.mine.loaded().map_or(0, Vec::len);
        self.selected_room = self.selected_room.min(rooms.saturating_sub(1));
        self.selected_booking = self.selected_booking.min(mine.saturating_sub(1));
    }

    fn open_form(&mut self, env: &Env) -> Vec<Effect> {
        if self.tab == Tab::MyBookings {
            return vec![];
        }
        let Some(room) = self.selected_room().cloned() else {
            return vec![];
        };

        let date = env.now.date();
        let room_id = room.id;
        self.form = Some(FormState::new(room, date));
        vec![Effect::FetchRoomBookings { room_id, date }]
    }

    fn edit_form(&mut self, action: Action) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        if form.submitting {
            return;
        }

        let equipment_len = form.room.equipment.len();
        match action {
            Action::FocusNext => form.focus = form.focus.next(),
            Action::FocusPrev => form.focus = form.focus.prev(),
            Action::Input(c) => {
                if let Some(text) = form.focused_text() {
                    text.push(c);
                } else if c == ' ' {
                    toggle_equipment_at_cursor(form);
                }
            }
            Action::Backspace => {
                if let Some(text) = form.focused_text() {
                    text.pop();
                }
            }
            Action::PrevEquipment if form.focus == Field::Equipment => {
                form.equipment_cursor = form.equipment_cursor.saturating_sub(1);
            }
            Action::NextEquipment if form.focus == Field::Equipment => {
                if form.equipment_cursor + 1 < equipment_len {
                    form.equipment_cursor += 1;
                }
            }
            Action::ToggleEquipment => toggle_equipment_at_cursor(form),
            _ => {}
        }
    }

    fn submit(&mut self, env: &Env) -> Vec<Effect> {
        let Some(form) = self.form.as_mut() else {
            return vec![];
        };
        if form.submitting {
            return vec![];
        }
        if form.existing.is_loading() {
            form.error = Some("Still loading room availability".to_string());
            return vec![];
        }

        match prepare_candidate(form, env) {
            Ok(candidate) => {
                form.error = None;
                form.submitting = true;
                vec![Effect::CreateBooking(candidate)]
            }
            Err(e) => {
                form.error = Some(e.to_string());
                vec![]
            }
        }
    }

    fn booking_created(&mut self, result: Result<Booking, String>, env: &Env) -> Vec<Effect> {
        match result {
            Ok(booking) => {
                let room = self
                    .form
                    .take()
                    .map(|f| f.room.name)
                    .unwrap_or_else(|| format!("room {}", booking.room_id));
                self.notice = Some(Notice::info(format!(
                    "Booked #{} {} in {}",
                    booking.id, booking.title, room
                )));
                self.today = Load::Loading;
                self.mine = Load::Loading;
                vec![Effect::FetchToday, Effect::FetchMine(env.user_id)]
            }
            Err(message) => {
                if let Some(form) = self.form.as_mut() {
                    form.submitting = false;
                    form.error = Some(message);
                } else {
                    self.notice = Some(Notice::error(message));
                }
                vec![]
            }
        }
    }

    fn request_cancel(&mut self, env: &Env) {
        if self.tab != Tab::MyBookings {
            return;
        }
        let Some((id, cancellable)) = self
            .selected_booking()
            .map(|b| (b.id, b.is_cancellable(env.now)))
        else {
            return;
        };

        if cancellable {
            self.confirm_cancel = Some(id);
        } else {
            self.notice = Some(Notice::error(BrnError::NotCancellable(id).to_string()));
        }
    }

    fn booking_cancelled(&mut self, booking_id: BookingId, result: Result<(), String>) {
        match result {
            Ok(()) => {
                if let Load::Loaded(mine) = &mut self.mine {
                    mine.retain(|b| b.id != booking_id);
                }
                if let Load::Loaded(today) = &mut self.today {
                    today
                        .iter_mut()
                        .filter(|b| b.id == booking_id)
                        .for_each(Booking::cancel);
                }
                self.clamp_selection();
                self.notice = Some(Notice::info(format!("Cancelled #{}", booking_id)));
            }
            Err(message) => {
                self.notice = Some(Notice::error(message));
            }
        }
    }
}

fn toggle_equipment_at_cursor(form: &mut FormState) {
    if let Some(item) = form.room.equipment.get(form.equipment_cursor).cloned() {
        form.fields.toggle_equipment(&item);
    }
}

fn prepare_candidate(form: &FormState, env: &Env) -> Result<BookingCandidate, BrnError> {
    let candidate = form.fields.to_candidate(&form.room, env.user_id, form.date)?;
    let existing = form.existing.loaded().map(Vec::as_slice).unwrap_or(&[]);
    check_candidate(&candidate, &form.room, existing, &env.rules, env.now)?;
    Ok(candidate)
}

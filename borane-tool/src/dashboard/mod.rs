mod input;
mod state;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use borane_client::{BookingService, ClientError};
use borane_core::UserId;
use chrono::Local;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use state::{Action, DashboardState, Effect, Env};

use crate::config::Settings;
use crate::error::BrnError;
use ui::ViewContext;

pub async fn run<S: BookingService + 'static>(
    service: S,
    settings: Settings,
) -> Result<(), BrnError> {
    let user_id = settings.require_user()?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    info!(user_id, api_url = %settings.api_url, "Dashboard started");
    let result = run_loop(&mut terminal, Arc::new(service), &settings, user_id).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn current_env(settings: &Settings, user_id: UserId) -> Env {
    Env {
        now: Local::now().naive_local(),
        rules: settings.rules,
        user_id,
    }
}

async fn run_loop<S: BookingService + 'static>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    service: Arc<S>,
    settings: &Settings,
    user_id: UserId,
) -> Result<(), BrnError> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut state = DashboardState::default();

    for effect in state.start(&current_env(settings, user_id)) {
        spawn_effect(&service, effect, &tx);
    }

    loop {
        let env = current_env(settings, user_id);
        let view = ViewContext {
            now: env.now,
            user_id,
            user_name: settings.user_name.as_deref(),
            grid: &settings.grid,
        };
        terminal.draw(|f| ui::render(f, &state, &view))?;

        // Poll for events with timeout to allow draining finished requests
        if event::poll(Duration::from_millis(50))? {
            if let Some(action) = input::map_event(&state, event::read()?) {
                for effect in state.reduce(action, &env) {
                    spawn_effect(&service, effect, &tx);
                }
            }
        }

        while let Ok(action) = rx.try_recv() {
            for effect in state.reduce(action, &env) {
                spawn_effect(&service, effect, &tx);
            }
        }

        if state.should_quit {
            break;
        }
    }

    Ok(())
}

fn spawn_effect<S: BookingService + 'static>(
    service: &Arc<S>,
    effect: Effect,
    tx: &mpsc::UnboundedSender<Action>,
) {
    debug!(?effect, "Spawning request");
    let service = Arc::clone(service);
    let tx = tx.clone();

    tokio::spawn(async move {
        let action = perform(service.as_ref(), effect).await;
        // The receiver is gone once the dashboard has quit
        let _ = tx.send(action);
    });
}

/// Runs one effect against the server and wraps the outcome as an action.
async fn perform<S: BookingService>(service: &S, effect: Effect) -> Action {
    match effect {
        Effect::FetchRooms => Action::RoomsLoaded(service.list_rooms().await.map_err(describe)),
        Effect::FetchToday => {
            Action::TodayLoaded(service.list_today_bookings().await.map_err(describe))
        }
        Effect::FetchMine(user_id) => {
            Action::MineLoaded(service.list_user_bookings(user_id).await.map_err(describe))
        }
        Effect::FetchRoomBookings { room_id, date } => Action::RoomBookingsLoaded {
            room_id,
            result: service
                .list_room_bookings_for_date(room_id, date)
                .await
                .map_err(describe),
        },
        Effect::CreateBooking(candidate) => {
            Action::BookingCreated(service.create_booking(&candidate).await.map_err(describe))
        }
        Effect::CancelBooking {
            booking_id,
            requester_id,
        } => Action::BookingCancelled {
            booking_id,
            result: service
                .cancel_booking(booking_id, requester_id)
                .await
                .map_err(describe),
        },
    }
}

/// Text shown for a failed request: the server's own message when it gave one.
fn describe(error: ClientError) -> String {
    warn!(%error, "Request failed");
    match error.rejection() {
        Some(rejection) => rejection.message.clone(),
        None => error.to_string(),
    }
}

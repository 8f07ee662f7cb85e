mod commands;
mod config;
mod error;
mod form;
mod logging;
mod render;

#[cfg(feature = "dashboard")]
mod dashboard;

use std::collections::BTreeSet;

use borane_client::BookingClient;
use borane_core::{BookingId, RoomId, UserId};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};

use crate::commands::BookRequest;
use crate::config::{load_config, resolve_settings, Overrides};
use crate::form::BookingForm;
use crate::logging::{init_logging, LogTarget};

#[derive(Parser)]
#[command(name = "brn")]
#[command(about = "Borane room booking client", long_about = None)]
struct Cli {
    /// Booking server base URL (default: $BORANE_API_URL, config, or localhost)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Act as this user (default: $BORANE_USER_ID or config)
    #[arg(long, global = true)]
    user_id: Option<UserId>,

    /// Log debug output from brn and its libraries
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List rooms with capacity and equipment
    Rooms,

    /// Show the day's bookings on a slot grid
    Timeline {
        /// Day to show, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Book a room
    Book {
        /// Room id, see `brn rooms`
        #[arg(long)]
        room: RoomId,

        /// Meeting title
        #[arg(long)]
        title: String,

        /// Start time, HH:MM
        #[arg(long)]
        start: String,

        /// End time, HH:MM
        #[arg(long)]
        end: String,

        /// Number of attendees
        #[arg(long, default_value = "1")]
        attendees: String,

        /// Equipment to reserve, may be repeated
        #[arg(long)]
        equipment: Vec<String>,

        /// Day of the booking, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// List your bookings
    Bookings,

    /// Cancel one of your bookings before it starts
    Cancel {
        /// Booking id, see `brn bookings`
        id: BookingId,
    },

    #[cfg(feature = "dashboard")]
    /// Open the interactive dashboard
    Dashboard,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = resolve_settings(
        Overrides {
            api_url: cli.api_url,
            user_id: cli.user_id,
        },
        load_config(),
    );

    let target = match cli.command {
        #[cfg(feature = "dashboard")]
        Command::Dashboard => LogTarget::File,
        _ => LogTarget::Stderr,
    };
    init_logging(&settings, target, cli.verbose)?;
    settings.log_warnings();

    let client = BookingClient::with_base_url(settings.api_url.clone());
    let now = Local::now().naive_local();
    let mut out = std::io::stdout().lock();

    match cli.command {
        Command::Rooms => commands::rooms(&client, &mut out).await?,
        Command::Timeline { date } => {
            commands::timeline(&client, &settings.grid, date, &mut out).await?
        }
        Command::Book {
            room,
            title,
            start,
            end,
            attendees,
            equipment,
            date,
        } => {
            let user_id = settings.require_user()?;
            let request = BookRequest {
                room_id: room,
                date: date.unwrap_or(now.date()),
                form: BookingForm {
                    title,
                    start,
                    end,
                    attendees,
                    equipment: equipment.into_iter().collect::<BTreeSet<_>>(),
                },
            };
            commands::book(&client, &settings.rules, user_id, request, now, &mut out).await?;
        }
        Command::Bookings => {
            let user_id = settings.require_user()?;
            commands::bookings(&client, user_id, now, &mut out).await?
        }
        Command::Cancel { id } => {
            let user_id = settings.require_user()?;
            commands::cancel(&client, user_id, id, now, &mut out).await?
        }
        #[cfg(feature = "dashboard")]
        Command::Dashboard => {
            drop(out);
            dashboard::run(client, settings).await?
        }
    }

    Ok(())
}

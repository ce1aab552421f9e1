// File: services/seatpick_cli/src/main.rs
mod app_state;
mod console;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, warn};

use seatpick_booking::{AttemptOutcome, AvailabilityViewModel};
use seatpick_common::models::{BookingId, SpaceId};
use seatpick_common::services::{AutoConfirm, ConfirmationGate};
use seatpick_common::{config_error, init_from_config, is_payment_enabled, SeatpickError};
use seatpick_config::load_config;

use app_state::AppState;

#[derive(Parser, Debug)]
#[command(author, version, about = "Book meeting rooms and desks from the terminal")]
struct Cli {
    /// Answer "yes" to every confirmation
    #[arg(long, short = 'y', global = true)]
    yes: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Store the tokens from the login redirect (`accessToken=...&refreshToken=...`)
    Login {
        #[arg()]
        callback_query: String,
    },
    /// Forget the stored tokens
    Logout,
    /// List bookable spaces
    Spaces,
    /// Show one space
    Space {
        #[arg()]
        space_id: SpaceId,
    },
    /// Show the slot grid of a space for one day
    Slots {
        #[arg()]
        space_id: SpaceId,
        /// YYYY-MM-DD, defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Show the following day
        #[arg(long, conflicts_with = "prev")]
        next: bool,
        /// Show the preceding day
        #[arg(long)]
        prev: bool,
    },
    /// Pay for and book one slot
    Book {
        #[arg()]
        space_id: SpaceId,
        /// HH:MM
        #[arg(long)]
        time: String,
        /// YYYY-MM-DD, defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List my bookings
    My,
    /// Cancel one of my bookings
    Cancel {
        #[arg()]
        booking_id: BookingId,
    },
    /// Upgrade the account
    Upgrade,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), SeatpickError> {
    let config = Arc::new(load_config().map_err(config_error)?);
    let _log_guard = init_from_config(&config.logging);
    if !is_payment_enabled(&config) {
        warn!("payment gateway is not configured, bookings will fail at payment");
    }

    let mut builder = AppState::builder(config);
    if cli.yes {
        builder = builder.with_gate(Arc::new(AutoConfirm) as Arc<dyn ConfirmationGate>);
    }
    let state = builder.build()?;

    match cli.command {
        Commands::Login { callback_query } => {
            state.session.capture_from_callback(&callback_query)?;
            println!("Logged in.");
        }
        Commands::Logout => {
            state.session.clear()?;
            println!("Logged out.");
        }
        Commands::Spaces => {
            for space in state.spaces().list().await? {
                println!(
                    "{:>4}  {:<24} {:<16} {}",
                    space.id, space.name, space.location, space.category
                );
            }
        }
        Commands::Space { space_id } => {
            let space = state.spaces().get(space_id).await?;
            println!("id      : {}", space.id);
            println!("name    : {}", space.name);
            println!("location: {}", space.location);
            println!("type    : {}", space.category);
        }
        Commands::Slots {
            space_id,
            date,
            next,
            prev,
        } => {
            let mut view = slot_grid(&state, space_id, date).await?;
            if next {
                view.next_day();
            } else if prev {
                view.previous_day();
            }
            println!("{}", view.date());
            for cell in view.render().await? {
                let marker = if cell.selectable { "[ ]" } else { "[x]" };
                println!("{} {}  {}", marker, cell.time, cell.status);
            }
        }
        Commands::Book {
            space_id,
            time,
            date,
        } => {
            state.require_login()?;
            let view = slot_grid(&state, space_id, date).await?;
            let slot = view.find(&time).await?.ok_or_else(|| {
                SeatpickError::NotFoundError(format!("no slot at {} on {}", time, view.date()))
            })?;
            let outcome = state.orchestrator.select_slot(view.select(&slot)).await?;
            if let Some(line) = booking_summary(&outcome) {
                println!("{}", line);
            }
        }
        Commands::My => {
            state.require_login()?;
            for row in state.bookings().rows().await? {
                let action = if row.cancellable { "cancellable" } else { "" };
                println!(
                    "{:>6}  {:<24} {}  {}  {:<10} {}",
                    row.id, row.space_name, row.date, row.time_range, row.status, action
                );
            }
        }
        Commands::Cancel { booking_id } => {
            state.require_login()?;
            // Populates the list cache so terminal bookings are refused locally.
            state.bookings().bookings().await?;
            state.cancellation().cancel(booking_id).await?;
        }
        Commands::Upgrade => {
            state.require_login()?;
            state.backend.upgrade_account().await?;
            println!("Account upgraded.");
        }
    }
    Ok(())
}

/// Extra stdout line for a finished attempt. Every outcome but a confirmed booking has
/// already been reported by the notifier and is not an error of the command.
fn booking_summary(outcome: &AttemptOutcome) -> Option<String> {
    match outcome {
        AttemptOutcome::Confirmed { booking, .. } => {
            Some(format!("Booking {} is {}.", booking.id, booking.status))
        }
        _ => None,
    }
}

async fn slot_grid(
    state: &AppState,
    space_id: SpaceId,
    date: Option<NaiveDate>,
) -> Result<AvailabilityViewModel, SeatpickError> {
    let space = state.spaces().get(space_id).await?;
    let date = date.unwrap_or_else(|| Local::now().date_naive());
    Ok(AvailabilityViewModel::new(
        state.backend.clone(),
        state.cache.clone(),
        state.orchestrator.in_flight(),
        space_id,
        date,
    )
    .with_slot_duration(state.orchestrator.slot_duration())
    .with_space_name(space.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use seatpick_booking::RejectionKind;
    use seatpick_common::models::{Booking, BookingStatus};

    #[test]
    fn test_confirmed_booking_prints_its_status() {
        let outcome = AttemptOutcome::Confirmed {
            booking: Booking {
                id: 101,
                space_id: Some(1),
                space_name: Some("Room A".into()),
                date: NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
                start_time: "14:00:00".into(),
                end_time: "15:00:00".into(),
                status: BookingStatus::Confirmed,
            },
            merchant_uid: "mid_1".into(),
        };
        assert_eq!(
            booking_summary(&outcome).as_deref(),
            Some("Booking 101 is CONFIRMED.")
        );
    }

    #[test]
    fn test_notified_outcomes_are_not_reported_again() {
        let outcomes = [
            AttemptOutcome::Declined,
            AttemptOutcome::PaymentFailed {
                reason: "card declined".into(),
            },
            AttemptOutcome::Rejected {
                kind: RejectionKind::Conflict,
                message: "already reserved".into(),
                merchant_uid: "mid_1".into(),
            },
        ];
        for outcome in &outcomes {
            assert_eq!(booking_summary(outcome), None);
        }
    }
}

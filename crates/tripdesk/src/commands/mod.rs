//! Command dispatch: bridges CLI args -> resource clients -> output formatting.

pub mod auth;
pub mod community;
pub mod config_cmd;
pub mod dashboard;
pub mod people;
pub mod reservations;
pub mod rewards;
pub mod surveys;
pub mod trips;
pub mod util;

use tripdesk_core::Backend;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    backend: &Backend,
    profile: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Login { email } => auth::login(backend, profile, email, global).await,
        Command::Logout => auth::logout(backend, profile, global),
        Command::Whoami => auth::whoami(backend, global).await,
        Command::Trips(args) => trips::handle_trips(backend, args, global).await,
        Command::Events(args) => trips::handle_events(backend, args, global).await,
        Command::Reservations(args) => reservations::handle_trips(backend, args, global).await,
        Command::EventReservations(args) => {
            reservations::handle_events(backend, args, global).await
        }
        Command::Surveys(args) => surveys::handle_surveys(backend, args, global).await,
        Command::Questions(args) => surveys::handle_questions(backend, args, global).await,
        Command::Responses(args) => surveys::handle_responses(backend, args, global).await,
        Command::Rewards(args) => rewards::handle(backend, args, global).await,
        Command::Users(args) => people::handle_users(backend, args, global).await,
        Command::Admins(args) => people::handle_admins(backend, args, global).await,
        Command::Posts(args) => community::handle(backend, args, global).await,
        Command::Dashboard(args) => dashboard::handle(backend, args, global).await,
        // Handled in main before a backend exists
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions are not backend commands".into(),
        )),
    }
}

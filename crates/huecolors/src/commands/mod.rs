//! Command dispatch: CLI args -> session operations -> output formatting.

pub mod bridge;
pub mod config_cmd;
pub mod lights;
pub mod palette;
pub mod photos;
pub mod util;

use tokio_util::sync::CancellationToken;

use huecolors_core::HueSession;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a session-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    session: &HueSession,
    global: &GlobalOpts,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    match cmd {
        Command::Bridge(args) => bridge::handle(session, args, global, cancel).await,
        Command::Lights(args) => lights::handle(session, args, global).await,
        Command::Palette(args) => palette::handle(session, args, global).await,
        Command::Photos(args) => photos::handle(session, args, global),
        // Config and Completions are handled before a session exists
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "command does not use a bridge session".into(),
        )),
    }
}

//! Shared helpers for command handlers.

use huecolors_core::{HueSession, LightInfo};

use crate::error::CliError;

/// Find a cached light by id, legacy id, or label (case-insensitive).
pub fn find_light(session: &HueSession, identifier: &str) -> Result<Option<LightInfo>, CliError> {
    let lights = session.cache().lights()?;
    Ok(lights.into_iter().find(|l| {
        l.id == identifier || l.v1_id == identifier || l.label.eq_ignore_ascii_case(identifier)
    }))
}

/// Like [`find_light`], but a miss is an error.
pub fn resolve_light(session: &HueSession, identifier: &str) -> Result<LightInfo, CliError> {
    find_light(session, identifier)?.ok_or_else(|| CliError::NotFound {
        resource_type: "light".into(),
        identifier: identifier.into(),
        list_command: "lights list".into(),
    })
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

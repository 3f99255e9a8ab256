//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use huecolors_config::ConfigError;
use huecolors_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the bridge at {hostname}")]
    #[diagnostic(
        code(huecolors::connection_failed),
        help(
            "Check that the bridge is powered and on the same network.\n\
             Cause: {reason}\n\
             Try: huecolors bridge discover"
        )
    )]
    ConnectionFailed { hostname: String, reason: String },

    #[error("No bridges found on this network")]
    #[diagnostic(
        code(huecolors::no_bridges),
        help("Enter the address manually: huecolors bridge select <ip>")
    )]
    NoBridgesFound,

    // ── Authorization ────────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(huecolors::auth_failed),
        help("The bridge no longer accepts the stored key. Pair again: huecolors bridge authorize")
    )]
    AuthFailed { message: String },

    #[error("No authorized bridge")]
    #[diagnostic(
        code(huecolors::not_authorized),
        help("Pair with a bridge first: huecolors bridge authorize")
    )]
    NotAuthorized,

    #[error("No bridge selected")]
    #[diagnostic(
        code(huecolors::no_bridge),
        help(
            "Select one: huecolors bridge select [ip]\n\
             Or pair directly: huecolors bridge authorize --host <ip>"
        )
    )]
    NoBridgeSelected,

    #[error("The link button was not pressed within {seconds}s")]
    #[diagnostic(
        code(huecolors::pairing_timeout),
        help("Press the round button on top of the bridge, then run the command again.")
    )]
    PairingTimeout { seconds: u64 },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(huecolors::not_found),
        help("Run: huecolors {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Bridge API ───────────────────────────────────────────────────
    #[error("Bridge error: {message}")]
    #[diagnostic(code(huecolors::api_error))]
    ApiError { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(huecolors::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Unknown config key '{key}'")]
    #[diagnostic(code(huecolors::config_key), help("Valid keys: {valid}"))]
    UnknownConfigKey { key: String, valid: String },

    #[error("Config file already exists at {path}")]
    #[diagnostic(
        code(huecolors::config_exists),
        help("Use --force to overwrite it, or edit it with: huecolors config set <key> <value>")
    )]
    ConfigExists { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(huecolors::config))]
    Config { message: String },

    // ── Local storage ────────────────────────────────────────────────
    #[error("Cache error: {message}")]
    #[diagnostic(
        code(huecolors::cache),
        help("The cache can be rebuilt: remove it and run `huecolors bridge select` again.")
    )]
    Cache { message: String },

    #[error("Could not read image: {message}")]
    #[diagnostic(code(huecolors::image), help("Supported formats: JPEG and PNG."))]
    Image { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("'{action}' requires confirmation")]
    #[diagnostic(
        code(huecolors::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout / cancellation ───────────────────────────────────────
    #[error("Request timed out")]
    #[diagnostic(
        code(huecolors::timeout),
        help("Increase the timeout with --timeout or check that the bridge is reachable.")
    )]
    Timeout,

    #[error("Cancelled")]
    #[diagnostic(code(huecolors::cancelled))]
    Cancelled,

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(huecolors::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NotAuthorized => exit_code::AUTH,
            Self::NotFound { .. } | Self::NoBridgesFound => exit_code::NOT_FOUND,
            Self::PairingTimeout { .. } | Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. }
            | Self::UnknownConfigKey { .. }
            | Self::ConfigExists { .. }
            | Self::NoBridgeSelected
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { hostname, reason } => {
                CliError::ConnectionFailed { hostname, reason }
            }

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::NotAuthorized => CliError::NotAuthorized,

            CoreError::NoBridgeSelected => CliError::NoBridgeSelected,

            CoreError::PairingTimeout { timeout_secs } => CliError::PairingTimeout {
                seconds: timeout_secs,
            },

            CoreError::Timeout => CliError::Timeout,

            CoreError::Cancelled => CliError::Cancelled,

            CoreError::LightNotFound { identifier } => CliError::NotFound {
                resource_type: "light".into(),
                identifier,
                list_command: "lights list".into(),
            },

            CoreError::DeviceNotFound { identifier } => CliError::NotFound {
                resource_type: "device".into(),
                identifier,
                list_command: "bridge devices".into(),
            },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Api { message, status: _ } => CliError::ApiError { message },

            CoreError::Cache(e) => CliError::Cache {
                message: e.to_string(),
            },

            CoreError::Image(e) => CliError::Image {
                message: e.to_string(),
            },

            CoreError::Io(e) => CliError::Io(e),

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownKey { key } => CliError::UnknownConfigKey {
                key,
                valid: huecolors_config::KEYS.join(", "),
            },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_kind() {
        assert_eq!(CliError::from(CoreError::NotAuthorized).exit_code(), 3);
        assert_eq!(
            CliError::from(CoreError::LightNotFound {
                identifier: "x".into()
            })
            .exit_code(),
            4
        );
        assert_eq!(
            CliError::from(CoreError::PairingTimeout { timeout_secs: 30 }).exit_code(),
            8
        );
        assert_eq!(
            CliError::from(CoreError::ConnectionFailed {
                hostname: "10.0.0.2".into(),
                reason: "refused".into(),
            })
            .exit_code(),
            7
        );
        assert_eq!(CliError::from(CoreError::Cancelled).exit_code(), 1);
    }

    #[test]
    fn unknown_config_key_lists_valid_keys() {
        let err = CliError::from(ConfigError::UnknownKey {
            key: "nope".into(),
        });
        assert_eq!(err.exit_code(), 2);
        let CliError::UnknownConfigKey { valid, .. } = err else {
            panic!("expected UnknownConfigKey");
        };
        assert!(valid.contains("palette.max_colors"));
    }
}

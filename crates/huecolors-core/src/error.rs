// ── Core error types ──
//
// User-facing errors from huecolors-core. Consumers never see HTTP status
// codes or SQL errors directly; the `From` impls below translate the
// bridge client and cache failures into domain wording.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Bridge connection ────────────────────────────────────────────
    #[error("Cannot reach bridge at {hostname}: {reason}")]
    ConnectionFailed { hostname: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("No bridge is authorized -- run `huecolors bridge authorize` first")]
    NotAuthorized,

    #[error("No bridge selected -- run `huecolors bridge select` first")]
    NoBridgeSelected,

    #[error("Link button was not pressed within {timeout_secs}s")]
    PairingTimeout { timeout_secs: u64 },

    #[error("Request timed out")]
    Timeout,

    #[error("Operation cancelled")]
    Cancelled,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Light not found: {identifier}")]
    LightNotFound { identifier: String },

    #[error("Device not found for light {identifier}")]
    DeviceNotFound { identifier: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Bridge API errors (wrapped, not exposed raw) ─────────────────
    #[error("Bridge error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Local storage ────────────────────────────────────────────────
    #[error("Cache error: {0}")]
    Cache(#[from] rusqlite::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<huecolors_api::Error> for CoreError {
    fn from(err: huecolors_api::Error) -> Self {
        match err {
            huecolors_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            huecolors_api::Error::NotPaired => CoreError::NotAuthorized,
            huecolors_api::Error::LinkButtonNotPressed => CoreError::AuthenticationFailed {
                message: "link button not pressed".into(),
            },
            huecolors_api::Error::PairingTimeout { timeout_secs } => {
                CoreError::PairingTimeout { timeout_secs }
            }
            huecolors_api::Error::Cancelled => CoreError::Cancelled,
            huecolors_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        hostname: e
                            .url()
                            .and_then(|u| u.host_str().map(str::to_owned))
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            huecolors_api::Error::InvalidUrl(e) => CoreError::ValidationFailed {
                message: format!("Invalid bridge address: {e}"),
            },
            huecolors_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                hostname: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            huecolors_api::Error::Bridge { message, status } => CoreError::Api {
                message,
                status: Some(status),
            },
            huecolors_api::Error::Pairing { code, description } => {
                CoreError::AuthenticationFailed {
                    message: format!("pairing rejected ({code}): {description}"),
                }
            }
            huecolors_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

use thiserror::Error;

/// Top-level error type for the `huecolors-api` crate.
///
/// Covers every failure mode of the bridge surfaces: discovery, pairing,
/// transport, and the CLIP v2 resource API. `huecolors-core` maps these
/// into user-facing wording.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The bridge rejected the application key (HTTP 401/403).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The request requires an application key but the client has none.
    #[error("Bridge is not paired -- no application key available")]
    NotPaired,

    /// Pairing attempted before the physical link button was pressed.
    #[error("Link button not pressed")]
    LinkButtonNotPressed,

    /// The link button was never pressed within the pairing window.
    #[error("Pairing timed out after {timeout_secs}s -- press the link button on the bridge")]
    PairingTimeout { timeout_secs: u64 },

    /// Pairing was cancelled by the caller.
    #[error("Pairing cancelled")]
    Cancelled,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Bridge API ──────────────────────────────────────────────────
    /// Error reported by the bridge, either as an HTTP failure or inside
    /// the `errors` array of a CLIP v2 envelope.
    #[error("Bridge API error (HTTP {status}): {message}")]
    Bridge { message: String, status: u16 },

    /// Error object returned by the v1 pairing endpoint.
    #[error("Pairing error {code}: {description}")]
    Pairing { code: u16, description: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the bridge no longer accepts our credentials.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::NotPaired)
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::LinkButtonNotPressed => true,
            Self::Bridge { status, .. } => *status == 429 || *status == 503,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Bridge { status: 404, .. } => true,
            _ => false,
        }
    }
}

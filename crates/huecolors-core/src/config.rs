// ── Runtime session configuration ──
//
// Describes how the session talks to the bridge and where it keeps its
// files. Never touches disk; the CLI builds a `HueConfig` from its own
// configuration layers and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use huecolors_api::{AppId, DEFAULT_DISCOVERY_URL};

/// App name the bridge records for our whitelist entry.
pub const DEFAULT_APP_NAME: &str = "HueColors";

/// Swatches extracted from a photo unless configured otherwise.
pub const DEFAULT_MAX_COLORS: usize = 6;

#[derive(Debug, Clone)]
pub struct HueConfig {
    /// Identity presented during pairing.
    pub app_id: AppId,
    /// Discovery service endpoint.
    pub discovery_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Accept the bridge's self-signed certificate.
    pub insecure: bool,
    /// How long to wait for the link button.
    pub pairing_timeout: Duration,
    /// Delay between pairing attempts.
    pub pairing_poll_interval: Duration,
    /// Swatch count for palette extraction.
    pub max_colors: usize,
    /// Directory photos are saved to.
    pub photos_dir: PathBuf,
}

impl Default for HueConfig {
    fn default() -> Self {
        Self {
            app_id: AppId::new(DEFAULT_APP_NAME, "cli"),
            discovery_url: DEFAULT_DISCOVERY_URL.into(),
            timeout: Duration::from_secs(10),
            insecure: true,
            pairing_timeout: Duration::from_secs(30),
            pairing_poll_interval: Duration::from_secs(1),
            max_colors: DEFAULT_MAX_COLORS,
            photos_dir: PathBuf::from("palette"),
        }
    }
}

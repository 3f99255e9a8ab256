//! Domain layer between `huecolors-api` and the CLI.
//!
//! - **[`HueSession`]**: Owns the bridge client, the local [`Cache`], and
//!   the [`PhotoLibrary`]. Every operation publishes its progress through a
//!   [`ResourceCell`] and reports failures on a notice channel.
//!
//! - **[`Cache`]**: SQLite storage for selected bridges and the last known
//!   light state.
//!
//! - **[`palette`]**: Swatch extraction from photos and round-robin
//!   assignment of swatches to lights.
//!
//! - **Domain model** ([`model`]): [`BridgeInfo`], [`LightInfo`], and the
//!   packed [`Rgb`] color with xy conversion.

pub mod config;
pub mod error;
pub mod library;
pub mod lights;
pub mod model;
pub mod palette;
pub mod resource;
pub mod session;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::HueConfig;
pub use error::CoreError;
pub use library::PhotoLibrary;
pub use lights::PaletteOutcome;
pub use model::{BridgeInfo, LightInfo, Rgb, format_identifier};
pub use palette::{Swatch, assign_swatches, extract_palette};
pub use resource::{Resource, ResourceCell};
pub use session::{HueSession, SessionState};
pub use store::Cache;

// Bridge types consumers use directly.
pub use huecolors_api::{AppId, DEFAULT_DISCOVERY_URL, Device, DiscoveredBridge};

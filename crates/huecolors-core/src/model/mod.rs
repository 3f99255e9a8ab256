// ── Domain model ──
//
// Canonical types persisted in the cache and rendered by the CLI.

mod bridge;
mod color;
mod light;

pub use bridge::{BridgeInfo, DEFAULT_BRIDGE_PORT, format_identifier, is_numeric, parse_address};
pub use color::Rgb;
pub use light::LightInfo;

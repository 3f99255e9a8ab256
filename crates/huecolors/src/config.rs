//! CLI configuration: thin wrapper around `huecolors_config`.
//!
//! Adds the resolution step that lets `GlobalOpts` flags override the
//! file and environment layers.

use std::path::PathBuf;

use clap::ValueEnum;

use huecolors_core::HueConfig;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use huecolors_config::{
    Config, config_path, load_config, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Fill `--output` / `--color` from the config file when not given.
pub fn apply_defaults(global: &mut GlobalOpts, cfg: &Config) {
    if global.output.is_none() {
        global.output = from_config("defaults.output", &cfg.defaults.output);
    }
    if global.color.is_none() {
        global.color = from_config("defaults.color", &cfg.defaults.color);
    }
}

fn from_config<T: ValueEnum>(key: &str, value: &str) -> Option<T> {
    T::from_str(value, true)
        .map_err(|_| tracing::warn!(key, value, "ignoring invalid config value"))
        .ok()
}

impl GlobalOpts {
    pub fn output_format(&self) -> OutputFormat {
        self.output.unwrap_or(OutputFormat::Table)
    }

    pub fn colored(&self) -> bool {
        crate::output::should_color(self.color.unwrap_or(ColorMode::Auto))
    }
}

/// Apply flag overrides and build the session config plus cache path.
pub fn resolve(global: &GlobalOpts, cfg: &Config) -> Result<(HueConfig, PathBuf), CliError> {
    let mut cfg = cfg.clone();
    if let Some(timeout) = global.timeout {
        cfg.defaults.timeout = timeout;
    }
    if let Some(ref database) = global.database {
        cfg.paths.database = Some(database.clone());
    }
    if let Some(ref photos) = global.photos_dir {
        cfg.paths.photos = Some(photos.clone());
    }

    let hue = cfg.to_hue_config()?;
    Ok((hue, cfg.database_path()))
}

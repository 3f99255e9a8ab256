//! Configuration for the HueColors CLI.
//!
//! TOML file, `HUECOLORS_` environment overrides, platform paths for the
//! cache database and photo library, and translation to
//! `huecolors_core::HueConfig`. The CLI layers its flag overrides on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use huecolors_core::config::{DEFAULT_APP_NAME, DEFAULT_MAX_COLORS};
use huecolors_core::{AppId, DEFAULT_DISCOVERY_URL, HueConfig};

/// Environment variable prefix. Nested keys use a double underscore,
/// e.g. `HUECOLORS_BRIDGE__PAIRING_TIMEOUT=60`.
pub const ENV_PREFIX: &str = "HUECOLORS_";

const DATABASE_FILE: &str = "huecolors.db";
const PHOTOS_DIR: &str = "palette";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("unknown config key '{key}'")]
    UnknownKey { key: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub bridge: BridgeSection,

    #[serde(default)]
    pub palette: PaletteSection,

    #[serde(default)]
    pub paths: PathsSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    10
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BridgeSection {
    #[serde(default = "default_discovery_url")]
    pub discovery_url: String,

    /// Application name sent during pairing.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Instance name sent during pairing, usually the host name.
    #[serde(default = "default_instance_name")]
    pub instance_name: String,

    /// Seconds to wait for the link button.
    #[serde(default = "default_pairing_timeout")]
    pub pairing_timeout: u64,

    /// Milliseconds between pairing attempts.
    #[serde(default = "default_pairing_poll_interval")]
    pub pairing_poll_interval: u64,

    /// Accept the bridge's self-signed certificate.
    #[serde(default = "default_insecure")]
    pub insecure: bool,
}

impl Default for BridgeSection {
    fn default() -> Self {
        Self {
            discovery_url: default_discovery_url(),
            app_name: default_app_name(),
            instance_name: default_instance_name(),
            pairing_timeout: default_pairing_timeout(),
            pairing_poll_interval: default_pairing_poll_interval(),
            insecure: default_insecure(),
        }
    }
}

fn default_discovery_url() -> String {
    DEFAULT_DISCOVERY_URL.into()
}
fn default_app_name() -> String {
    DEFAULT_APP_NAME.into()
}
fn default_instance_name() -> String {
    "cli".into()
}
fn default_pairing_timeout() -> u64 {
    30
}
fn default_pairing_poll_interval() -> u64 {
    1000
}
fn default_insecure() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PaletteSection {
    #[serde(default = "default_max_colors")]
    pub max_colors: usize,
}

impl Default for PaletteSection {
    fn default() -> Self {
        Self {
            max_colors: default_max_colors(),
        }
    }
}

fn default_max_colors() -> usize {
    DEFAULT_MAX_COLORS
}

/// Overrides for where data lives. Unset means the platform data dir.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PathsSection {
    pub database: Option<PathBuf>,
    pub photos: Option<PathBuf>,
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "huecolors", "huecolors")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Platform data directory holding the cache and the photo library.
pub fn data_dir() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(".local/share"),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

fn home_fallback(base: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(base);
    p.push("huecolors");
    p
}

impl Config {
    pub fn database_path(&self) -> PathBuf {
        self.paths
            .database
            .clone()
            .unwrap_or_else(|| data_dir().join(DATABASE_FILE))
    }

    pub fn photos_dir(&self) -> PathBuf {
        self.paths
            .photos
            .clone()
            .unwrap_or_else(|| data_dir().join(PHOTOS_DIR))
    }
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from the canonical path plus environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load defaults, then `path` if it exists, then `HUECOLORS_` env vars.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it can't be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Editing ─────────────────────────────────────────────────────────

/// Values accepted for `defaults.output`.
pub const OUTPUT_FORMATS: &[&str] = &["table", "json", "json-compact", "yaml", "plain"];

/// Values accepted for `defaults.color`.
pub const COLOR_MODES: &[&str] = &["auto", "always", "never"];

/// Keys accepted by [`Config::set`].
pub const KEYS: &[&str] = &[
    "defaults.output",
    "defaults.color",
    "defaults.timeout",
    "bridge.discovery_url",
    "bridge.app_name",
    "bridge.instance_name",
    "bridge.pairing_timeout",
    "bridge.pairing_poll_interval",
    "bridge.insecure",
    "palette.max_colors",
    "paths.database",
    "paths.photos",
];

impl Config {
    /// Set a dotted key (`section.field`) from its string form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "defaults.output" => self.defaults.output = one_of(key, value, OUTPUT_FORMATS)?,
            "defaults.color" => self.defaults.color = one_of(key, value, COLOR_MODES)?,
            "defaults.timeout" => self.defaults.timeout = parse_field(key, value)?,
            "bridge.discovery_url" => {
                check_url(key, value)?;
                self.bridge.discovery_url = value.into();
            }
            "bridge.app_name" => self.bridge.app_name = value.into(),
            "bridge.instance_name" => self.bridge.instance_name = value.into(),
            "bridge.pairing_timeout" => self.bridge.pairing_timeout = parse_field(key, value)?,
            "bridge.pairing_poll_interval" => {
                self.bridge.pairing_poll_interval = parse_field(key, value)?;
            }
            "bridge.insecure" => self.bridge.insecure = parse_field(key, value)?,
            "palette.max_colors" => self.palette.max_colors = parse_field(key, value)?,
            "paths.database" => self.paths.database = optional_path(value),
            "paths.photos" => self.paths.photos = optional_path(value),
            _ => return Err(ConfigError::UnknownKey { key: key.into() }),
        }
        Ok(())
    }

    /// Build the session configuration.
    pub fn to_hue_config(&self) -> Result<HueConfig, ConfigError> {
        check_url("bridge.discovery_url", &self.bridge.discovery_url)?;
        if self.palette.max_colors == 0 {
            return Err(ConfigError::Validation {
                field: "palette.max_colors".into(),
                reason: "must be at least 1".into(),
            });
        }

        Ok(HueConfig {
            app_id: AppId::new(&self.bridge.app_name, &self.bridge.instance_name),
            discovery_url: self.bridge.discovery_url.clone(),
            timeout: Duration::from_secs(self.defaults.timeout),
            insecure: self.bridge.insecure,
            pairing_timeout: Duration::from_secs(self.bridge.pairing_timeout),
            pairing_poll_interval: Duration::from_millis(self.bridge.pairing_poll_interval),
            max_colors: self.palette.max_colors,
            photos_dir: self.photos_dir(),
        })
    }
}

fn parse_field<T>(field: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::Validation {
        field: field.into(),
        reason: format!("'{value}': {e}"),
    })
}

fn one_of(field: &str, value: &str, allowed: &[&str]) -> Result<String, ConfigError> {
    let normalized = value.trim().to_ascii_lowercase();
    if allowed.contains(&normalized.as_str()) {
        Ok(normalized)
    } else {
        Err(ConfigError::Validation {
            field: field.into(),
            reason: format!("'{value}' is not one of {}", allowed.join(", ")),
        })
    }
}

fn check_url(field: &str, value: &str) -> Result<(), ConfigError> {
    url::Url::parse(value)
        .map(|_| ())
        .map_err(|e| ConfigError::Validation {
            field: field.into(),
            reason: format!("invalid URL '{value}': {e}"),
        })
}

/// An empty value resets the path to the platform default.
fn optional_path(value: &str) -> Option<PathBuf> {
    (!value.is_empty()).then(|| PathBuf::from(value))
}

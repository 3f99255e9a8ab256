//! Clap derive structures for the `huecolors` CLI.
//!
//! Defines the command tree, global flags, and shared value enums. Also
//! compiled into build.rs for man page generation, so nothing here may
//! depend on the rest of the crate.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// huecolors -- color your lights from your photos
#[derive(Debug, Parser)]
#[command(
    name = "huecolors",
    version,
    about = "Control Hue lights and color them from your photos",
    long_about = "Discover and pair with a Hue bridge on the local network, switch and dim\n\
        lights, and apply color palettes extracted from photos.\n\n\
        Bridge credentials and the last known light state are cached locally.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "HUECOLORS_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: from config, else auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds
    #[arg(long, env = "HUECOLORS_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Cache database file
    #[arg(long, env = "HUECOLORS_DATABASE", global = true, value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Photo library directory
    #[arg(long, env = "HUECOLORS_PHOTOS", global = true, value_name = "DIR")]
    pub photos_dir: Option<PathBuf>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Discover, select, and authorize a bridge
    #[command(alias = "b")]
    Bridge(BridgeArgs),

    /// List and control lights
    #[command(alias = "l")]
    Lights(LightsArgs),

    /// Extract palettes from photos and apply them to lights
    #[command(alias = "p")]
    Palette(PaletteArgs),

    /// Manage the photo library
    Photos(PhotosArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Bridge ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct BridgeArgs {
    #[command(subcommand)]
    pub command: BridgeCommand,
}

#[derive(Debug, Subcommand)]
pub enum BridgeCommand {
    /// Find bridges on this network via the discovery service
    Discover,

    /// Select the bridge to use
    ///
    /// Without an address, bridges are discovered and you pick one.
    Select {
        /// IPv4 address of the bridge
        address: Option<String>,
    },

    /// Pair with the selected bridge (press its link button when asked)
    #[command(alias = "pair")]
    Authorize {
        /// Select this bridge first (IPv4 address or base URL)
        #[arg(long)]
        host: Option<String>,
    },

    /// Show the selected bridge and whether it is authorized
    Status,

    /// List bridges stored in the cache
    #[command(alias = "ls")]
    List,

    /// List the devices known to the bridge
    Devices,
}

// ── Lights ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LightsArgs {
    #[command(subcommand)]
    pub command: LightsCommand,
}

#[derive(Debug, Subcommand)]
pub enum LightsCommand {
    /// List lights, refreshing them from the bridge
    #[command(alias = "ls")]
    List {
        /// Show the cache without contacting the bridge
        #[arg(long)]
        cached: bool,
    },

    /// Turn a light on
    On {
        /// Light id, legacy id (/lights/3), or label
        light: String,
    },

    /// Turn a light off
    Off {
        /// Light id, legacy id (/lights/3), or label
        light: String,
    },

    /// Set brightness (1-100); only sent to the bridge while the light is on
    #[command(alias = "dim")]
    Brightness {
        /// Light id, legacy id (/lights/3), or label
        light: String,

        /// Brightness percentage
        #[arg(value_parser = clap::value_parser!(u8).range(1..=100))]
        percent: u8,
    },

    /// Blink a light so you can find it
    Identify {
        /// Light id, legacy id (/lights/3), or label
        light: String,
    },

    /// Forget all cached lights
    Clear,
}

// ── Palette ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PaletteArgs {
    #[command(subcommand)]
    pub command: PaletteCommand,
}

#[derive(Debug, Subcommand)]
pub enum PaletteCommand {
    /// Show the dominant colors of an image
    Extract {
        /// Image file (JPEG or PNG)
        image: PathBuf,

        /// Number of swatches [default: from config]
        #[arg(long, short = 'n')]
        colors: Option<usize>,
    },

    /// Color the lights from an image, round-robin over its swatches
    Apply {
        /// Image file (JPEG or PNG)
        image: PathBuf,

        /// Number of swatches [default: from config]
        #[arg(long, short = 'n')]
        colors: Option<usize>,

        /// Show the assignment without changing any light
        #[arg(long)]
        dry_run: bool,
    },
}

// ── Photos ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PhotosArgs {
    #[command(subcommand)]
    pub command: PhotosCommand,
}

#[derive(Debug, Subcommand)]
pub enum PhotosCommand {
    /// List saved photos, newest first
    #[command(alias = "ls")]
    List,

    /// Copy an image into the library
    Import {
        /// Image file to import
        path: PathBuf,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Display the resolved configuration
    Show,

    /// Print the config file location
    Path,

    /// Set a configuration value
    Set {
        /// Dotted key, e.g. "palette.max_colors"
        key: String,

        /// Value to set (empty resets a path to its default)
        value: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

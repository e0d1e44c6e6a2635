//! Clap derive structures for the `airsync` CLI.

use clap::{Args, Parser, Subcommand, ValueEnum};

use airsync_core::{AccessPointFilter, Band};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// airsync -- live Wi-Fi access point view
#[derive(Debug, Parser)]
#[command(
    name = "airsync",
    version,
    about = "Watch nearby Wi-Fi access points through NetworkManager and wpa_supplicant",
    long_about = "Reconciles NetworkManager access points with wpa_supplicant BSS objects\n\
        into one live view: accurate last-seen times, frequencies and security flags.",
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
    /// Wireless interface name (e.g. wlan0)
    #[arg(long, short = 'i', env = "AIRSYNC_INTERFACE", global = true)]
    pub interface: Option<String>,

    /// NetworkManager device object path (overrides --interface)
    #[arg(long, env = "AIRSYNC_DEVICE", global = true)]
    pub device: Option<String>,

    /// Output format [default: table]
    #[arg(long, short = 'o', env = "AIRSYNC_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

impl GlobalOpts {
    pub fn format(&self) -> OutputFormat {
        self.output.clone().unwrap_or(OutputFormat::Table)
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color.clone().unwrap_or(ColorMode::Auto)
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one BSSID per line (scripting)
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
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
    /// List visible access points and exit
    #[command(alias = "ls")]
    List(FilterArgs),

    /// Print a new listing every time the view changes (Ctrl-C to stop)
    #[command(alias = "w")]
    Watch(FilterArgs),

    /// Ask NetworkManager to rescan
    Scan,

    /// Activate a saved connection profile on the device
    Connect(ConnectArgs),

    /// Inspect configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Filters ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct FilterArgs {
    /// Only this SSID (exact match)
    #[arg(long)]
    pub ssid: Option<String>,

    /// Only this band
    #[arg(long)]
    pub band: Option<BandArg>,

    /// Only networks that require authentication
    #[arg(long, conflicts_with = "open")]
    pub secured: bool,

    /// Only open networks
    #[arg(long)]
    pub open: bool,

    /// Minimum signal strength in percent
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub min_strength: Option<u8>,
}

impl FilterArgs {
    /// Every requested predicate; an empty list matches everything.
    pub fn filters(&self) -> Vec<AccessPointFilter> {
        let mut filters = Vec::new();
        if let Some(ref ssid) = self.ssid {
            filters.push(AccessPointFilter::Ssid(ssid.clone()));
        }
        if let Some(band) = self.band {
            filters.push(AccessPointFilter::Band(band.into()));
        }
        if self.secured {
            filters.push(AccessPointFilter::Secured);
        }
        if self.open {
            filters.push(AccessPointFilter::Open);
        }
        if let Some(min) = self.min_strength {
            filters.push(AccessPointFilter::MinStrength(min));
        }
        filters
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BandArg {
    #[value(name = "2.4")]
    TwoPointFour,
    #[value(name = "5")]
    Five,
    #[value(name = "6")]
    Six,
}

impl From<BandArg> for Band {
    fn from(arg: BandArg) -> Self {
        match arg {
            BandArg::TwoPointFour => Self::TwoPointFour,
            BandArg::Five => Self::Five,
            BandArg::Six => Self::Six,
        }
    }
}

// ── Command arguments ────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConnectArgs {
    /// Connection profile object path
    /// (e.g. /org/freedesktop/NetworkManager/Settings/4)
    pub profile: String,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,
    /// Print the configuration file path
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

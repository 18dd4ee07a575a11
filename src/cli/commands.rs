//! Command definitions for the pomoclock CLI.
//!
//! Uses clap derive macro for argument parsing.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use clap::{Args, Parser, Subcommand, ValueEnum};

// ============================================================================
// CLI Structure
// ============================================================================

/// pomoclock - a Pomodoro timer for the terminal and the tray
#[derive(Parser, Debug)]
#[command(
    name = "pomoclock",
    version,
    about = "Pomodoro timer with a floating overlay, a tray progress icon and a session log",
    long_about = "Run the timer with `pomoclock run`, then control it from any other \
                  terminal with the subcommands below.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the timer in this terminal
    Run(RunArgs),

    /// Start or continue the countdown
    Start,

    /// Pause the countdown
    Pause,

    /// Return to a stopped Work phase
    Reset,

    /// Show current timer status
    Status,

    /// Change the Work and/or Break duration
    Settings(SettingsArgs),

    /// Toggle between the light and dark palette
    Palette,

    /// Lock the screen when a Work phase ends
    AutoLock {
        #[arg(value_enum)]
        state: Switch,
    },

    /// Set the alert volume
    Volume {
        /// Volume in percent (0-100)
        #[arg(value_parser = clap::value_parser!(u32).range(0..=100))]
        percent: u32,
    },

    /// Show, hide or move the floating overlay
    Overlay {
        #[command(subcommand)]
        action: OverlayCommand,
    },

    /// Record or export session themes
    Session {
        #[command(subcommand)]
        action: SessionCommand,
    },

    /// Inspect the stored configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },

    /// Save settings and stop the running timer
    Quit,

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Arguments
// ============================================================================

/// Arguments for the run command
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Disable alert sounds
    #[arg(long)]
    pub no_sound: bool,

    /// Show the floating overlay from the start
    #[arg(long)]
    pub overlay: bool,
}

/// Arguments for the settings command
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = true)]
pub struct SettingsArgs {
    /// Work duration in minutes (1-120)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=120))]
    pub work: Option<u32>,

    /// Break duration in minutes (1-60)
    #[arg(short, long = "break", value_parser = clap::value_parser!(u32).range(1..=60))]
    pub break_time: Option<u32>,
}

/// On/off argument.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    pub fn is_on(self) -> bool {
        self == Switch::On
    }
}

/// Overlay subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum OverlayCommand {
    /// Show the overlay if hidden, hide it if shown
    Toggle,
    /// Move the overlay back to its default position
    Reset,
    /// Move the overlay to a screen position in pixels
    #[command(allow_negative_numbers = true)]
    Move { x: i32, y: i32 },
}

/// Session subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SessionCommand {
    /// Set the session theme shown during Work (an empty label clears it)
    Save {
        /// Free-text label
        label: String,
    },
    /// Export recorded themes to CSV or Markdown
    Export(ExportArgs),
}

/// Arguments for the session export command
#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Start of the range, `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS` (default: 7 days ago)
    #[arg(long, value_parser = parse_range_start)]
    pub from: Option<DateTime<Local>>,

    /// End of the range, inclusive (default: now)
    #[arg(long, value_parser = parse_range_end)]
    pub to: Option<DateTime<Local>>,

    /// Output file; `.md` writes Markdown, anything else CSV
    #[arg(short, long)]
    pub output: Option<std::path::PathBuf>,
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ConfigCommand {
    /// Print the stored settings and data paths
    Show,
}

// ============================================================================
// Validation Functions
// ============================================================================

const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a local date/time. A bare date resolves to `time_of_day`.
fn parse_local(s: &str, time_of_day: NaiveTime) -> Result<DateTime<Local>, String> {
    let naive = NaiveDateTime::parse_from_str(s, DATE_TIME_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(s, DATE_FORMAT).map(|d| d.and_time(time_of_day)))
        .map_err(|_| format!("'{}' is not YYYY-MM-DD or YYYY-MM-DD HH:MM:SS", s))?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| format!("'{}' does not exist in the local time zone", s))
}

/// A bare date starts at midnight.
fn parse_range_start(s: &str) -> Result<DateTime<Local>, String> {
    parse_local(s, NaiveTime::MIN)
}

/// A bare date ends at its last second.
fn parse_range_end(s: &str) -> Result<DateTime<Local>, String> {
    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).ok_or("invalid end of day")?;
    parse_local(s, end_of_day)
}

// ============================================================================
// Tests
// ============================================================================

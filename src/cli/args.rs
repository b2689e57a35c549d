//! Command-line argument definitions for the telemetry tool
//!
//! Defines the CLI using the clap derive API. Verbosity flags are global so they can be
//! given before or after the subcommand.

use crate::app::models::TelegramFormat;
use crate::app::services::plus_telegram::TelegramVariant;
use crate::{Error, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Largest batch the simulate command will generate
const MAX_SIMULATED_TELEGRAMS: usize = 10_000;

/// CLI arguments for the station telemetry tool
///
/// Decodes raw station telegrams, generates synthetic ones, and polls cloud-backed
/// stations into an in-memory store.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "station-telemetry",
    version,
    about = "Decode and normalize automatic weather station telemetry",
    long_about = "Decodes plus- and comma-delimited station telegrams and three generations of \
                  cloud vendor API responses into one canonical observation and health record, \
                  with timestamp sanity checks and station status derivation."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Only show errors. Overrides verbose settings.
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Decode one raw telegram and print the records as JSON
    Decode(DecodeArgs),
    /// Generate synthetic plus telegrams with plausible readings
    Simulate(SimulateArgs),
    /// Poll configured cloud stations and promote buffered telegrams
    Poll(PollArgs),
}

/// Wire format selector for the decode command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// `+`-delimited telegram
    Plus,
    /// `,`-delimited telegram
    Comma,
}

impl From<FormatArg> for TelegramFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Plus => TelegramFormat::Plus,
            FormatArg::Comma => TelegramFormat::Comma,
        }
    }
}

#[derive(Debug, Clone, Parser)]
pub struct DecodeArgs {
    /// Telegram wire format
    #[arg(short = 'f', long = "format", value_enum, default_value = "plus")]
    pub format: FormatArg,

    /// Station the telegram belongs to (plus telegrams carry no id of their own)
    #[arg(short = 's', long = "station-id", value_name = "ID")]
    pub station_id: Option<i64>,

    /// Station UTC offset in minutes east, used for plus-telegram timestamps
    #[arg(long = "utc-offset-minutes", value_name = "MINUTES", allow_hyphen_values = true)]
    pub utc_offset_minutes: Option<i32>,

    /// Print compact single-line JSON
    #[arg(long = "compact")]
    pub compact: bool,

    /// The raw telegram text
    #[arg(value_name = "TELEGRAM")]
    pub telegram: String,
}

#[derive(Debug, Clone, Parser)]
pub struct SimulateArgs {
    /// Layout variant, by field count (19, 20, 23 or 24)
    #[arg(long = "variant", value_name = "FIELDS", default_value_t = 23)]
    pub variant: usize,

    /// Number of telegrams to generate
    #[arg(short = 'n', long = "count", value_name = "COUNT", default_value_t = 1)]
    pub count: usize,

    /// Station UTC offset in minutes east
    #[arg(long = "utc-offset-minutes", value_name = "MINUTES", allow_hyphen_values = true)]
    pub utc_offset_minutes: Option<i32>,
}

#[derive(Debug, Clone, Parser)]
pub struct PollArgs {
    /// Path to the YAML configuration file
    ///
    /// If not specified, the default config path under the user config directory is
    /// used when it exists.
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Run a single cycle and exit
    #[arg(long = "once")]
    pub once: bool,

    /// Seconds between cycles when running continuously
    #[arg(long = "interval", value_name = "SECONDS", default_value_t = 300)]
    pub interval_secs: u64,

    /// Override the HTTP timeout from the configuration
    #[arg(long = "timeout", value_name = "SECONDS")]
    pub timeout_secs: Option<u64>,

    /// Disable the randomized delay between stations
    #[arg(long = "no-pacing")]
    pub no_pacing: bool,
}

impl Args {
    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }
}

impl SimulateArgs {
    /// The layout variant named by `--variant`
    pub fn telegram_variant(&self) -> Result<TelegramVariant> {
        TelegramVariant::from_field_count(self.variant).ok_or_else(|| {
            Error::configuration(format!(
                "Unknown variant {} (expected 19, 20, 23 or 24)",
                self.variant
            ))
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.telegram_variant()?;
        if self.count == 0 {
            return Err(Error::configuration("Count must be greater than 0"));
        }
        if self.count > MAX_SIMULATED_TELEGRAMS {
            return Err(Error::configuration(format!(
                "Count cannot exceed {}",
                MAX_SIMULATED_TELEGRAMS
            )));
        }
        Ok(())
    }
}

impl PollArgs {
    pub fn validate(&self) -> Result<()> {
        if let Some(config_file) = &self.config_file {
            if !config_file.exists() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }
        if !self.once && self.interval_secs == 0 {
            return Err(Error::configuration(
                "Interval must be greater than 0 seconds",
            ));
        }
        Ok(())
    }
}

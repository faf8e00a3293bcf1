//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// evgather - Modular event-number frame gathering pipeline
#[derive(Parser, Debug)]
#[command(
    name = "evgather",
    author,
    version,
    about = "Event-number frame gathering pipeline",
    long_about = "Re-synchronizes frame streams from multiple sources by the modular \n\
                  event number stamped into each frame.\n\n\
                  Builds sources from configuration, gathers per-event frame sets \n\
                  through a sliding event window, and dispatches complete sets to \n\
                  configured sinks."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "EVGATHER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "EVGATHER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the gathering pipeline
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "rig.toml", env = "EVGATHER_CONFIG")]
    pub config: PathBuf,

    /// Override gather loop concurrency mode from configuration
    #[arg(long, value_enum, env = "EVGATHER_CONCURRENCY")]
    pub concurrency: Option<ConcurrencyArg>,

    /// Override poll interval in milliseconds from configuration
    #[arg(long, env = "EVGATHER_POLL_INTERVAL_MS")]
    pub poll_interval_ms: Option<u64>,

    /// Maximum number of gathered sets to produce (0 = unlimited)
    #[arg(long, default_value = "0", env = "EVGATHER_MAX_SETS")]
    pub max_sets: u64,

    /// Pipeline timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "EVGATHER_TIMEOUT")]
    pub timeout: u64,

    /// Validate configuration and exit without running pipeline
    #[arg(long)]
    pub dry_run: bool,

    /// Channel buffer size for internal queues
    #[arg(long, default_value = "100", env = "EVGATHER_BUFFER_SIZE")]
    pub buffer_size: usize,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9000", env = "EVGATHER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "rig.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "rig.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show detailed source information
    #[arg(long)]
    pub sources: bool,

    /// Show sink configuration
    #[arg(long)]
    pub sinks: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

/// Gather loop concurrency mode (CLI override)
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ConcurrencyArg {
    /// One task polls every source round-robin
    SingleThreaded,
    /// One worker task per source, shared window
    MultiThreaded,
}

impl From<ConcurrencyArg> for contracts::ConcurrencyMode {
    fn from(arg: ConcurrencyArg) -> Self {
        match arg {
            ConcurrencyArg::SingleThreaded => Self::SingleThreaded,
            ConcurrencyArg::MultiThreaded => Self::MultiThreaded,
        }
    }
}

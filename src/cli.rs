//! CLI arguments and subcommands for herakles-netmon.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "off" => Some(LogLevel::Off),
            "error" => Some(LogLevel::Error),
            "warn" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Snapshot output format
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Four-line block per tick
    Text,
    /// One line per tick
    Line,
    /// One JSON object per tick
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Line => "line",
            OutputFormat::Json => "json",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "text" => Some(OutputFormat::Text),
            "line" => Some(OutputFormat::Line),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "herakles-netmon",
    about = "Live throughput, latency and usage monitor for the active network interface",
    long_about = "Live throughput, latency and usage monitor for the active network interface.\n\n\
                  Samples the first up, non-loopback interface once per interval and prints \
                  download/upload rates, round-trip latency to a reference host and the bytes \
                  transferred over a trailing window.",
    author = "Michael Moll <exporter@herakles.now> - Herakles",
    version = "0.1.0",
    long_version = concat!("0.1.0 (", env!("VERGEN_GIT_SHA"), ")"),
    propagate_version = true,
    after_help = "Project: https://github.com/cansp-dev/herakles-netmon — More info: https://www.herakles.now — Support: exporter@herakles.now"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Sampling interval in milliseconds
    #[arg(short = 'i', long)]
    pub interval_ms: Option<u64>,

    /// Number of ticks in the usage window
    #[arg(short = 'w', long)]
    pub window_ticks: Option<usize>,

    /// Latency probe target (host or IP)
    #[arg(long)]
    pub target: Option<String>,

    /// Latency probe timeout in milliseconds
    #[arg(long)]
    pub probe_timeout_ms: Option<u64>,

    /// Monitor only this interface
    #[arg(long)]
    pub interface: Option<String>,

    /// Skip virtual interfaces (bridges, veth, tun) during selection
    #[arg(long)]
    pub exclude_virtual: bool,

    /// Re-run interface selection every N ticks (0 = only when none is active)
    #[arg(long)]
    pub reselect_every_ticks: Option<u64>,

    /// Snapshot output format
    #[arg(short = 'o', long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Stop after N ticks
    #[arg(short = 'n', long)]
    pub ticks: Option<u64>,

    /// Log level (overrides the config file, default: info)
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List network interfaces and the one that would be monitored
    Interfaces {
        /// Show raw flags and counters
        #[arg(long)]
        verbose: bool,
    },

    /// Run latency probes against the configured target
    Probe {
        /// Number of probes
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },

    /// Generate configuration files
    Config {
        /// Output file path ("-" for stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,

        /// Include comments and examples
        #[arg(long)]
        commented: bool,
    },

    /// Check runtime requirements and permissions
    CheckRequirements,
}

impl Commands {
    /// Subcommands that report through the tracing subscriber.
    pub fn wants_logging(&self) -> bool {
        matches!(self, Commands::CheckRequirements)
    }
}

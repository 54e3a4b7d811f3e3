//! CLI arguments and subcommands for mem-tracker.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "mem-tracker",
    about = "Kernel and per-process memory tracker",
    long_about = "Kernel and per-process memory tracker.\n\n\
                  Polls /proc/mem_tracker for aggregate kernel memory usage and /proc/<pid>/status \
                  for per-process resident memory, keeps a rolling 30-sample history and raises an \
                  alert when usage crosses a threshold. Send SIGUSR1 to pause or resume sampling.",
    author = "Michael Moll <exporter@herakles.now> - Herakles",
    version = "0.1.0",
    propagate_version = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log level (default: config file value, else warn)
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

    /// Sampling interval in milliseconds
    #[arg(short = 'i', long)]
    pub interval_ms: Option<u64>,

    /// Alert threshold in percent of total kernel memory
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Kernel memory summary source
    #[arg(long)]
    pub kernel_source: Option<PathBuf>,

    /// Process root directory
    #[arg(long)]
    pub proc_root: Option<PathBuf>,

    /// Number of processes to show per snapshot
    #[arg(short = 'n', long)]
    pub top_n: Option<usize>,

    /// Parallel scan threads (0 = auto, 1 = sequential)
    #[arg(long)]
    pub parallelism: Option<usize>,

    /// Write the latest snapshot as JSON to this file on every tick
    #[arg(long)]
    pub json_export: Option<PathBuf>,

    /// Write Prometheus metrics to this file on every tick
    #[arg(long)]
    pub textfile: Option<PathBuf>,

    /// Disable console output
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Start with sampling paused (resume with SIGUSR1)
    #[arg(long)]
    pub start_paused: bool,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate configuration and data sources
    Check,

    /// Take a fixed number of samples and print them
    Sample {
        /// Number of samples
        #[arg(short = 'n', long, default_value_t = 1)]
        iterations: usize,

        /// Omit the process table
        #[arg(long)]
        no_processes: bool,
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
}

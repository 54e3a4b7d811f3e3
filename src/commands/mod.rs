//! CLI command implementations for mem-tracker.
//!
//! This module provides implementations for all CLI subcommands:
//! - `check`: Data source and configuration validation
//! - `sample`: Fixed number of samples printed to stdout
//! - `config`: Configuration file generation

pub mod check;
pub mod config;
pub mod sample;

// Re-export command functions
pub use check::command_check;
pub use config::command_config;
pub use sample::command_sample;

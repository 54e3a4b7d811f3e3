//! Configuration management for mem-tracker.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.

use mem_tracker::alert::DEFAULT_THRESHOLD_PERCENT;
use mem_tracker::kernel::DEFAULT_KERNEL_SOURCE;
use mem_tracker::process::DEFAULT_PROC_ROOT;
use mem_tracker::ringbuffer::DEFAULT_HISTORY_LEN;
use mem_tracker::sampler::{SamplerSettings, DEFAULT_TOP_N};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::cli::{Args, ConfigFormat};

// Default configuration constants
pub const DEFAULT_INTERVAL_MS: u64 = 1000;

/// Effective configuration. Every field is optional so partial files merge
/// over the defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Sources
    #[serde(alias = "kernel-source")]
    pub kernel_source: Option<PathBuf>,
    #[serde(alias = "proc-root")]
    pub proc_root: Option<PathBuf>,

    // Sampling
    #[serde(alias = "interval-ms")]
    pub interval_ms: Option<u64>,
    #[serde(alias = "history-len")]
    pub history_len: Option<usize>,
    #[serde(alias = "top-n")]
    pub top_n: Option<usize>,
    #[serde(alias = "threshold-percent")]
    pub threshold_percent: Option<f64>,
    pub parallelism: Option<usize>,

    // Output
    pub console: Option<bool>,
    #[serde(alias = "json-export-path")]
    pub json_export_path: Option<PathBuf>,
    #[serde(alias = "textfile-path")]
    pub textfile_path: Option<PathBuf>,

    // Logging
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kernel_source: Some(PathBuf::from(DEFAULT_KERNEL_SOURCE)),
            proc_root: Some(PathBuf::from(DEFAULT_PROC_ROOT)),
            interval_ms: Some(DEFAULT_INTERVAL_MS),
            history_len: Some(DEFAULT_HISTORY_LEN),
            top_n: Some(DEFAULT_TOP_N),
            threshold_percent: Some(DEFAULT_THRESHOLD_PERCENT),
            parallelism: None,
            console: Some(true),
            json_export_path: None,
            textfile_path: None,
            log_level: Some("warn".into()),
        }
    }
}

impl Config {
    pub fn kernel_source(&self) -> PathBuf {
        self.kernel_source
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_KERNEL_SOURCE))
    }

    pub fn proc_root(&self) -> PathBuf {
        self.proc_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROC_ROOT))
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.unwrap_or(DEFAULT_INTERVAL_MS))
    }

    /// Sequential scanning only when exactly one thread is requested.
    pub fn parallel_scan(&self) -> bool {
        self.parallelism != Some(1)
    }

    pub fn sampler_settings(&self) -> SamplerSettings {
        SamplerSettings {
            history_len: self.history_len.unwrap_or(DEFAULT_HISTORY_LEN),
            top_n: self.top_n.unwrap_or(DEFAULT_TOP_N),
            threshold_percent: self.threshold_percent.unwrap_or(DEFAULT_THRESHOLD_PERCENT),
        }
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if cfg.interval_ms == Some(0) {
        return Err("interval_ms must be greater than 0".into());
    }
    if cfg.history_len == Some(0) {
        return Err("history_len must be greater than 0".into());
    }
    if cfg.top_n == Some(0) {
        return Err("top_n must be greater than 0".into());
    }
    if let Some(t) = cfg.threshold_percent {
        if !(0.0..=100.0).contains(&t) {
            return Err(format!(
                "Invalid threshold_percent {}, expected a value between 0 and 100",
                t
            )
            .into());
        }
    }

    for path in [&cfg.json_export_path, &cfg.textfile_path]
        .into_iter()
        .flatten()
    {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                return Err(format!("Output directory not found: {}", parent.display()).into());
            }
        }
    }

    Ok(())
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(path) = &args.kernel_source {
        config.kernel_source = Some(path.clone());
    }
    if let Some(path) = &args.proc_root {
        config.proc_root = Some(path.clone());
    }
    if args.interval_ms.is_some() {
        config.interval_ms = args.interval_ms;
    }
    if args.threshold.is_some() {
        config.threshold_percent = args.threshold;
    }
    if args.top_n.is_some() {
        config.top_n = args.top_n;
    }
    if args.parallelism.is_some() {
        config.parallelism = args.parallelism;
    }
    if let Some(path) = &args.json_export {
        config.json_export_path = Some(path.clone());
    }
    if let Some(path) = &args.textfile {
        config.textfile_path = Some(path.clone());
    }
    if args.quiet {
        config.console = Some(false);
    }

    Ok(config)
}

/// Configuration loading with multiple format support
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            // Try default locations
            let defaults = [
                "/etc/mem-tracker/mem-tracker.yaml",
                "/etc/mem-tracker/mem-tracker.yml",
                "/etc/mem-tracker/mem-tracker.json",
                "./mem-tracker.yaml",
                "./mem-tracker.yml",
                "./mem-tracker.json",
            ];

            match defaults.iter().find(|p| Path::new(p).exists()) {
                Some(p) => PathBuf::from(p),
                None => return Ok(Config::default()),
            }
        }
    };

    let content = fs::read_to_string(&path)
        .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
    let config = parse_config(&content, path.extension().and_then(|s| s.to_str()))?;
    info!("Loaded configuration from: {}", path.display());
    Ok(config)
}

/// Parses config text; the extension picks the format, YAML by default.
pub fn parse_config(
    content: &str,
    extension: Option<&str>,
) -> Result<Config, Box<dyn std::error::Error>> {
    let config: Config = match extension {
        Some("json") => serde_json::from_str(content)?,
        Some("toml") => toml::from_str(content)?,
        _ => serde_yaml::from_str(content)?,
    };
    Ok(config)
}

/// Renders configuration in the requested format
pub fn render_config(
    config: &Config,
    format: &ConfigFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    let output = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };
    Ok(output)
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", render_config(config, &format)?);
    Ok(())
}

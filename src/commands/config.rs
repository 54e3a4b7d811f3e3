//! Config command implementation.
//!
//! Generates configuration files in various formats.

use std::fs;
use std::path::PathBuf;

use crate::cli::ConfigFormat;
use crate::config::{render_config, Config};

/// Generates configuration files.
pub fn command_config(
    output: Option<PathBuf>,
    format: ConfigFormat,
    commented: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let output = match output {
        Some(path) => path,
        None => PathBuf::from("mem-tracker.yaml"),
    };

    let mut content = render_config(&config, &format)?;
    if commented && matches!(format, ConfigFormat::Yaml) {
        content = add_config_comments(content);
    }

    if output.to_string_lossy() == "-" {
        print!("{}", content);
    } else {
        fs::write(&output, content)?;
        println!("✅ Configuration written to: {}", output.display());
    }

    Ok(())
}

/// Adds comments to YAML configuration.
fn add_config_comments(yaml: String) -> String {
    let comments = r#"# mem-tracker Configuration
# ==========================
#
# Sources
# -------
# kernel_source: /proc/mem_tracker  # Summary file exported by the mem_tracker kernel module
# proc_root: /proc                  # Directory holding one numeric entry per process
#
# Sampling
# --------
# interval_ms: 1000            # Time between samples
# history_len: 30              # Number of usage percentages kept for the history graph
# top_n: 20                    # Processes shown per snapshot, largest first
# threshold_percent: 80        # Alert when kernel usage rises above this value
# parallelism: null            # Scan threads (null/0 = auto, 1 = sequential)
#
# Output
# ------
# console: true                # Print every snapshot to stdout
# json_export_path: null       # Write the latest snapshot as JSON on every tick
# textfile_path: null          # Write Prometheus metrics on every tick
#
# Logging
# -------
# log_level: "warn"            # off, error, warn, info, debug, trace
"#;

    format!("{comments}\n{yaml}")
}

//! Memory parsing utilities for reading process resident memory from /proc.
//!
//! This module parses the `Name:` and `VmRSS:` fields of
//! `/proc/<pid>/status`.

use std::fs;
use std::io;
use std::path::Path;

/// Fields of interest from a `/proc/<pid>/status` record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusFields {
    pub name: String,
    pub vmrss_kb: u64,
}

/// Reads and parses `/proc/<pid>/status`.
///
/// I/O errors are returned unchanged so the caller can tell a process that
/// exited (`NotFound`) from one it may not read.
pub fn read_status(proc_path: &Path) -> Result<StatusFields, io::Error> {
    let content = fs::read_to_string(proc_path.join("status"))?;
    Ok(parse_status(&content))
}

/// Parses status text. Kernel threads have no `VmRSS:` line and report 0.
pub fn parse_status(content: &str) -> StatusFields {
    let mut fields = StatusFields::default();

    for line in content.lines() {
        if let Some(v) = line.strip_prefix("Name:") {
            fields.name = v.trim().to_string();
        } else if let Some(v) = line.strip_prefix("VmRSS:") {
            fields.vmrss_kb = parse_rss_kb(v);
            // Name always precedes VmRSS
            break;
        }
    }

    fields
}

/// Parses a `VmRSS:` value such as `"   123456 kB"`, substituting 0 on failure.
pub fn parse_rss_kb(v: &str) -> u64 {
    let v = v.trim();
    v.strip_suffix(" kB")
        .unwrap_or(v)
        .trim()
        .parse()
        .unwrap_or(0)
}

//! Kernel memory summary reader.
//!
//! The `mem_tracker` kernel module exposes a two-line pseudo-file:
//!
//! ```text
//! Used: 5123456
//! Total: 16318412
//! ```
//!
//! Values are kilobytes. Fields are taken by line position (first line is
//! used, second is total); the key text before the colon is not checked.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::SourceError;

/// Default location of the kernel module's summary file.
pub const DEFAULT_KERNEL_SOURCE: &str = "/proc/mem_tracker";

/// One reading of aggregate kernel memory usage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MemorySample {
    pub used: u64,
    pub total: u64,
    pub percent: f64,
}

impl MemorySample {
    /// Builds a sample, guarding against a zero total.
    pub fn new(used: u64, total: u64) -> Self {
        let percent = if total > 0 {
            (used as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        Self {
            used,
            total,
            percent,
        }
    }

    /// Sample reported when the source cannot be read.
    pub fn degraded() -> Self {
        Self {
            used: 0,
            total: 1,
            percent: 0.0,
        }
    }
}

/// Anything that can produce a memory sample on demand.
///
/// Implementations must not fail; a broken source yields
/// [`MemorySample::degraded`].
pub trait MemorySource: Send {
    fn read(&self) -> MemorySample;
}

/// Reads the kernel module's summary file.
#[derive(Debug, Clone)]
pub struct KernelMemoryReader {
    path: PathBuf,
}

impl KernelMemoryReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and parses the source, keeping the failure cause.
    pub fn try_read(&self) -> Result<MemorySample, SourceError> {
        let content = fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        let (used, total) = parse_kernel_memory(&content)?;
        Ok(MemorySample::new(used, total))
    }
}

impl Default for KernelMemoryReader {
    fn default() -> Self {
        Self::new(DEFAULT_KERNEL_SOURCE)
    }
}

impl MemorySource for KernelMemoryReader {
    fn read(&self) -> MemorySample {
        match self.try_read() {
            Ok(sample) => sample,
            Err(e) => {
                debug!("Kernel memory source unavailable, reporting 0%: {}", e);
                MemorySample::degraded()
            }
        }
    }
}

/// Parses the summary text into `(used_kb, total_kb)`.
pub fn parse_kernel_memory(content: &str) -> Result<(u64, u64), SourceError> {
    let mut lines = content.lines();
    let used_line = lines.next().ok_or(SourceError::MissingLines(0))?;
    let total_line = lines.next().ok_or(SourceError::MissingLines(1))?;

    let used = parse_field(used_line, 1)?;
    let total = parse_field(total_line, 2)?;
    Ok((used, total))
}

/// Extracts the integer after the first colon, dropping any unit annotation.
fn parse_field(line: &str, line_no: usize) -> Result<u64, SourceError> {
    let (_, value) = line
        .split_once(':')
        .ok_or(SourceError::MissingSeparator { line: line_no })?;
    let value = value.trim();
    value
        .split_whitespace()
        .next()
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| SourceError::InvalidNumber {
            line: line_no,
            value: value.to_string(),
        })
}

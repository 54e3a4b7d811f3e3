//! Process scanning utilities for discovering processes and their resident
//! memory from /proc.
//!
//! A scan enumerates the numeric directories under the process root, reads
//! each `status` record and orders the result by resident memory.

use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::process::memory::read_status;

/// Default process root.
pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Process entry representing a directory in /proc filesystem.
#[derive(Debug, Clone)]
pub struct ProcEntry {
    pub pid: u32,
    pub proc_path: PathBuf,
}

/// A live process and its resident memory at scan time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessEntry {
    pub pid: u32,
    pub name: String,
    pub memory_kb: u64,
}

impl ProcessEntry {
    pub fn new(pid: u32, name: impl Into<String>, memory_kb: u64) -> Self {
        Self {
            pid,
            name: name.into(),
            memory_kb,
        }
    }
}

/// Anything that can list processes ordered by resident memory, largest
/// first. Implementations must not fail.
pub trait ProcessSource: Send {
    fn scan(&self) -> Vec<ProcessEntry>;
}

/// Scans a /proc-style directory tree.
#[derive(Debug, Clone)]
pub struct ProcessMemoryScanner {
    root: PathBuf,
    parallel: bool,
}

impl ProcessMemoryScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            parallel: true,
        }
    }

    /// Reads status records on the rayon pool (default) or on the calling thread.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Default for ProcessMemoryScanner {
    fn default() -> Self {
        Self::new(DEFAULT_PROC_ROOT)
    }
}

impl ProcessSource for ProcessMemoryScanner {
    fn scan(&self) -> Vec<ProcessEntry> {
        let procs = collect_proc_entries(&self.root);
        let mut entries: Vec<ProcessEntry> = if self.parallel {
            procs.par_iter().filter_map(read_process_entry).collect()
        } else {
            procs.iter().filter_map(read_process_entry).collect()
        };

        sort_by_memory(&mut entries);
        debug!(
            "Scanned {} of {} process entries under {}",
            entries.len(),
            procs.len(),
            self.root.display()
        );
        entries
    }
}

/// Scans the process root for directories with numeric names, in ascending
/// pid order.
pub fn collect_proc_entries(root: &Path) -> Vec<ProcEntry> {
    let mut out = Vec::new();
    if let Ok(entries) = fs::read_dir(root) {
        for entry in entries.flatten() {
            let p = entry.path();
            let name = match p.file_name().and_then(|s| s.to_str()) {
                Some(v) => v,
                None => continue,
            };
            if name.is_empty() || !name.chars().all(|c| c.is_ascii_digit()) {
                continue;
            }
            let pid: u32 = match name.parse() {
                Ok(v) => v,
                Err(_) => continue,
            };
            out.push(ProcEntry { pid, proc_path: p });
        }
    }
    out.sort_unstable_by_key(|e| e.pid);
    out
}

/// Reads one process's status. Exited processes and unnamed entries yield None.
pub fn read_process_entry(entry: &ProcEntry) -> Option<ProcessEntry> {
    match read_status(&entry.proc_path) {
        Ok(fields) if fields.name.is_empty() => None,
        Ok(fields) => Some(ProcessEntry {
            pid: entry.pid,
            name: fields.name,
            memory_kb: fields.vmrss_kb,
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => {
            debug!(
                "Error reading {}/status: {}",
                entry.proc_path.display(),
                e
            );
            None
        }
    }
}

/// Stable sort by resident memory, largest first.
pub fn sort_by_memory(entries: &mut [ProcessEntry]) {
    entries.sort_by(|a, b| b.memory_kb.cmp(&a.memory_kb));
}

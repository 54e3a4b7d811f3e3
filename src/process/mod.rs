//! Process-related modules for discovering processes and their resident memory.
//!
//! This module provides:
//! - `memory`: `Name:`/`VmRSS:` parsing from /proc/<pid>/status
//! - `scanner`: Process discovery, scanning and ordering

pub mod memory;
pub mod scanner;

// Re-export commonly used types
pub use memory::{parse_rss_kb, parse_status, read_status, StatusFields};
pub use scanner::{
    collect_proc_entries, sort_by_memory, ProcEntry, ProcessEntry, ProcessMemoryScanner,
    ProcessSource, DEFAULT_PROC_ROOT,
};

//! mem-tracker library
//!
//! Polls aggregate kernel memory usage (from the `mem_tracker` kernel module's
//! `/proc/mem_tracker` file) and per-process resident memory (from
//! `/proc/<pid>/status`), keeps a rolling usage history, raises an
//! edge-triggered alert when usage crosses a threshold and hands a snapshot
//! of all of it to registered observers once per tick.
//!
//! # Features
//!
//! - **Never-failing readers**: a missing or malformed source degrades to a
//!   zero-usage sample; vanished processes are skipped
//! - **Rolling history**: fixed-capacity ringbuffer, oldest sample evicted first
//! - **Edge-triggered alerts**: one event per upward threshold crossing
//! - **Pausable**: a shared flag freezes history, alert state and last snapshot
//!
//! # Usage
//!
//! ```rust,no_run
//! use mem_tracker::{
//!     KernelMemoryReader, ProcessMemoryScanner, SamplerLoop, SamplerObserver,
//!     SamplerSettings, Snapshot,
//! };
//!
//! struct Print;
//!
//! impl SamplerObserver for Print {
//!     fn on_snapshot(&mut self, s: &Snapshot) {
//!         println!("{:.2}% used, {} processes", s.percent, s.processes.len());
//!     }
//! }
//!
//! let mut sampler = SamplerLoop::new(
//!     KernelMemoryReader::default(),
//!     ProcessMemoryScanner::default(),
//!     SamplerSettings::default(),
//! )
//! .with_observer(Print);
//!
//! sampler.tick();
//! ```

pub mod alert;
pub mod console;
pub mod error;
pub mod export;
pub mod kernel;
pub mod metrics;
pub mod process;
pub mod ringbuffer;
pub mod runner;
pub mod sampler;

// Re-export main types for convenience
pub use alert::{AlertEvent, AlertKind, AlertState, AlertStatus};
pub use console::ConsoleObserver;
pub use error::{ExportError, SourceError};
pub use export::{JsonExportObserver, TextfileObserver};
pub use kernel::{KernelMemoryReader, MemorySample, MemorySource};
pub use process::{ProcessEntry, ProcessMemoryScanner, ProcessSource};
pub use ringbuffer::Ringbuffer;
pub use sampler::{PauseHandle, SamplerLoop, SamplerObserver, SamplerSettings, Snapshot, TickOutcome};

//! Plain-text rendering of snapshots for terminals.
//!
//! Renders the kernel usage line, a text gauge, the last-30-seconds history as
//! a sparkline and the top process table.

use std::fmt::Write as FmtWrite;
use std::io::{self, Write};
use tracing::warn;

use crate::alert::AlertEvent;
use crate::sampler::{SamplerObserver, Snapshot};

const GAUGE_WIDTH: usize = 40;
const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Formats an integer with thousands separators, e.g. `16318412` -> `16,318,412`.
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// `[#########---------]` style bar for a 0-100 percentage.
pub fn render_gauge(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// One block character per history value, scaled to 0-100.
pub fn render_sparkline(history: &[f64]) -> String {
    history
        .iter()
        .map(|p| {
            let idx = ((p.clamp(0.0, 100.0) / 100.0) * (SPARK_LEVELS.len() - 1) as f64).round();
            SPARK_LEVELS[idx as usize]
        })
        .collect()
}

/// Renders a full snapshot as text.
pub fn render_snapshot(snapshot: &Snapshot) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Used: {} KB / Total: {} KB ({:.2}%)",
        format_thousands(snapshot.used),
        format_thousands(snapshot.total),
        snapshot.percent
    );
    let _ = writeln!(
        out,
        "{} {:>6.2}%  [{}]",
        render_gauge(snapshot.percent, GAUGE_WIDTH),
        snapshot.percent,
        snapshot.alert
    );
    let _ = writeln!(out, "History: {}", render_sparkline(&snapshot.history));
    let _ = writeln!(out);
    let _ = writeln!(out, "{:>8}  {:<24} {:>14}", "PID", "Name", "Memory (KB)");
    for p in &snapshot.processes {
        let _ = writeln!(
            out,
            "{:>8}  {:<24} {:>14}",
            p.pid,
            p.name,
            format_thousands(p.memory_kb)
        );
    }

    out
}

/// Prints each snapshot to stdout.
pub struct ConsoleObserver {
    show_processes: bool,
}

impl ConsoleObserver {
    pub fn new(show_processes: bool) -> Self {
        Self { show_processes }
    }
}

impl SamplerObserver for ConsoleObserver {
    fn on_snapshot(&mut self, snapshot: &Snapshot) {
        let text = if self.show_processes {
            render_snapshot(snapshot)
        } else {
            render_snapshot(&Snapshot {
                processes: Vec::new(),
                ..snapshot.clone()
            })
        };

        let stdout = io::stdout();
        let mut lock = stdout.lock();
        if let Err(e) = writeln!(lock, "{}", text).and_then(|_| lock.flush()) {
            warn!("Failed to write snapshot to stdout: {}", e);
        }
    }

    fn on_alert(&mut self, alert: &AlertEvent) {
        println!("⚠️  Threshold Alert: {}", alert);
    }
}

//! Prometheus metrics definitions for mem-tracker.
//!
//! The metrics mirror each snapshot and are written out by the textfile
//! exporter for node_exporter's textfile collector.

use prometheus::{Gauge, GaugeVec, IntCounter, Opts, Registry};

use crate::alert::{AlertEvent, AlertStatus};
use crate::sampler::Snapshot;

/// Collection of Prometheus metrics fed from sampler snapshots.
#[derive(Clone)]
pub struct MemoryMetrics {
    // ========== Kernel Memory Metrics ==========
    pub kernel_used_kb: Gauge,
    pub kernel_total_kb: Gauge,
    pub kernel_used_percent: Gauge,

    // ========== Alert Metrics ==========
    pub threshold_percent: Gauge,
    pub alert_triggered: Gauge,
    pub alerts_total: IntCounter,

    // ========== Process Metrics ==========
    pub process_resident_kb: GaugeVec, // labels: pid, name

    // ========== Sampler Metrics ==========
    pub samples_total: IntCounter,
}

impl MemoryMetrics {
    /// Creates and registers all Prometheus metrics with the registry.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let kernel_used_kb = Gauge::new(
            "mem_tracker_kernel_used_kb",
            "Used kernel memory in kilobytes",
        )?;
        let kernel_total_kb = Gauge::new(
            "mem_tracker_kernel_total_kb",
            "Total kernel memory in kilobytes",
        )?;
        let kernel_used_percent = Gauge::new(
            "mem_tracker_kernel_used_percent",
            "Used kernel memory in percent of total (0-100)",
        )?;
        let threshold_percent = Gauge::new(
            "mem_tracker_threshold_percent",
            "Configured alert threshold in percent",
        )?;
        let alert_triggered = Gauge::new(
            "mem_tracker_alert_triggered",
            "Whether usage is currently at or above the threshold (1) or not (0)",
        )?;
        let alerts_total = IntCounter::new(
            "mem_tracker_alerts_total",
            "Number of threshold crossings since start",
        )?;
        let process_resident_kb = GaugeVec::new(
            Opts::new(
                "mem_tracker_process_resident_kb",
                "Resident memory (VmRSS) of the top processes in kilobytes",
            ),
            &["pid", "name"],
        )?;
        let samples_total = IntCounter::new(
            "mem_tracker_samples_total",
            "Number of samples taken since start",
        )?;

        registry.register(Box::new(kernel_used_kb.clone()))?;
        registry.register(Box::new(kernel_total_kb.clone()))?;
        registry.register(Box::new(kernel_used_percent.clone()))?;
        registry.register(Box::new(threshold_percent.clone()))?;
        registry.register(Box::new(alert_triggered.clone()))?;
        registry.register(Box::new(alerts_total.clone()))?;
        registry.register(Box::new(process_resident_kb.clone()))?;
        registry.register(Box::new(samples_total.clone()))?;

        Ok(Self {
            kernel_used_kb,
            kernel_total_kb,
            kernel_used_percent,
            threshold_percent,
            alert_triggered,
            alerts_total,
            process_resident_kb,
            samples_total,
        })
    }

    pub fn set_threshold(&self, threshold_percent: f64) {
        self.threshold_percent.set(threshold_percent);
    }

    pub fn record_alert(&self, alert: &AlertEvent) {
        self.threshold_percent.set(alert.threshold);
        self.alerts_total.inc();
    }

    /// Replaces all gauges with the snapshot's values.
    pub fn update(&self, snapshot: &Snapshot) {
        self.kernel_used_kb.set(snapshot.used as f64);
        self.kernel_total_kb.set(snapshot.total as f64);
        self.kernel_used_percent.set(snapshot.percent);
        self.alert_triggered.set(match snapshot.alert {
            AlertStatus::Triggered => 1.0,
            AlertStatus::Normal => 0.0,
        });

        // Drop series of processes that left the top-N
        self.process_resident_kb.reset();
        for p in &snapshot.processes {
            let pid = p.pid.to_string();
            self.process_resident_kb
                .with_label_values(&[pid.as_str(), p.name.as_str()])
                .set(p.memory_kb as f64);
        }

        self.samples_total.inc();
    }
}

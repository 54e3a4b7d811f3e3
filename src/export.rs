//! File exporters for sampler snapshots.
//!
//! - `JsonExportObserver`: latest snapshot as pretty JSON, including the
//!   usage history, for later plotting.
//! - `TextfileObserver`: Prometheus text format for node_exporter's
//!   textfile collector.
//!
//! Both rewrite their file on every snapshot via a temporary file and a
//! rename, so readers never see a partial write. Write failures are logged
//! and do not affect sampling.

use prometheus::{Encoder, Registry, TextEncoder};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::alert::AlertEvent;
use crate::error::ExportError;
use crate::metrics::MemoryMetrics;
use crate::sampler::{SamplerObserver, Snapshot};

/// Writes `content` to `path` through a sibling temporary file.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<(), ExportError> {
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    fs::write(&tmp, content).map_err(|source| ExportError::Io {
        path: tmp.clone(),
        source,
    })?;
    fs::rename(&tmp, path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes each snapshot as JSON.
pub struct JsonExportObserver {
    path: PathBuf,
}

impl JsonExportObserver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn export(&self, snapshot: &Snapshot) -> Result<(), ExportError> {
        let json = serde_json::to_vec_pretty(snapshot)?;
        write_atomic(&self.path, &json)
    }
}

impl SamplerObserver for JsonExportObserver {
    fn on_snapshot(&mut self, snapshot: &Snapshot) {
        match self.export(snapshot) {
            Ok(()) => debug!("Snapshot written to {}", self.path.display()),
            Err(e) => warn!("Failed to export snapshot: {}", e),
        }
    }
}

/// Mirrors snapshots into Prometheus metrics and writes them as a `.prom`
/// file.
pub struct TextfileObserver {
    path: PathBuf,
    registry: Registry,
    metrics: MemoryMetrics,
}

impl TextfileObserver {
    pub fn new(path: impl Into<PathBuf>, threshold_percent: f64) -> Result<Self, ExportError> {
        let registry = Registry::new();
        let metrics = MemoryMetrics::new(&registry)?;
        metrics.set_threshold(threshold_percent);
        Ok(Self {
            path: path.into(),
            registry,
            metrics,
        })
    }

    pub fn metrics(&self) -> &MemoryMetrics {
        &self.metrics
    }

    /// Encodes the current registry contents.
    pub fn render(&self) -> Result<Vec<u8>, ExportError> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(buffer)
    }

    fn write(&self) -> Result<(), ExportError> {
        let buffer = self.render()?;
        write_atomic(&self.path, &buffer)
    }
}

impl SamplerObserver for TextfileObserver {
    fn on_snapshot(&mut self, snapshot: &Snapshot) {
        self.metrics.update(snapshot);
        if let Err(e) = self.write() {
            warn!("Failed to write metrics textfile: {}", e);
        }
    }

    fn on_alert(&mut self, alert: &AlertEvent) {
        self.metrics.record_alert(alert);
    }
}

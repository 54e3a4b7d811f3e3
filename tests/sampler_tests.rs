//! Integration tests for the sampling pipeline.
//!
//! These tests build a fake kernel summary file and process tree in a
//! temporary directory and drive the real readers through `SamplerLoop`.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use mem_tracker::runner::run_n;
use mem_tracker::{
    AlertEvent, AlertStatus, JsonExportObserver, KernelMemoryReader, ProcessMemoryScanner,
    SamplerLoop, SamplerObserver, SamplerSettings, Snapshot, TextfileObserver, TickOutcome,
};
use tempfile::{tempdir, TempDir};

#[derive(Clone, Default)]
struct Collected {
    snapshots: Arc<Mutex<Vec<Snapshot>>>,
    alerts: Arc<Mutex<Vec<AlertEvent>>>,
}

impl SamplerObserver for Collected {
    fn on_snapshot(&mut self, snapshot: &Snapshot) {
        self.snapshots.lock().unwrap().push(snapshot.clone());
    }

    fn on_alert(&mut self, alert: &AlertEvent) {
        self.alerts.lock().unwrap().push(alert.clone());
    }
}

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempdir().expect("Failed to create temp dir");
        fs::create_dir_all(dir.path().join("proc")).expect("Failed to create proc root");
        Self { dir }
    }

    fn kernel_source(&self) -> std::path::PathBuf {
        self.dir.path().join("mem_tracker")
    }

    fn proc_root(&self) -> std::path::PathBuf {
        self.dir.path().join("proc")
    }

    fn set_kernel(&self, used: u64, total: u64) {
        fs::write(
            self.kernel_source(),
            format!("Used: {} kB\nTotal: {} kB\n", used, total),
        )
        .expect("Failed to write kernel source");
    }

    fn add_process(&self, pid: u32, name: &str, rss_kb: Option<u64>) {
        let dir = self.proc_root().join(pid.to_string());
        fs::create_dir_all(&dir).expect("Failed to create process dir");
        let mut status = format!("Name:\t{}\nUmask:\t0022\nState:\tS (sleeping)\n", name);
        if let Some(rss) = rss_kb {
            status.push_str(&format!("VmRSS:\t{} kB\n", rss));
        }
        status.push_str("Threads:\t1\n");
        fs::write(dir.join("status"), status).expect("Failed to write status");
    }

    fn remove_status(&self, pid: u32) {
        fs::remove_file(self.proc_root().join(pid.to_string()).join("status"))
            .expect("Failed to remove status");
    }

    fn sampler(&self, settings: SamplerSettings) -> (SamplerLoop, Collected) {
        let collected = Collected::default();
        let sampler = SamplerLoop::new(
            KernelMemoryReader::new(self.kernel_source()),
            ProcessMemoryScanner::new(self.proc_root()),
            settings,
        )
        .with_observer(collected.clone());
        (sampler, collected)
    }
}

fn last(collected: &Collected) -> Snapshot {
    collected
        .snapshots
        .lock()
        .unwrap()
        .last()
        .cloned()
        .expect("at least one snapshot")
}

#[test]
fn test_snapshot_from_real_sources() {
    let fx = Fixture::new();
    fx.set_kernel(5_123_456, 16_318_412);
    fx.add_process(1234, "firefox", Some(812_345));
    fx.add_process(1, "systemd", Some(12_000));
    fx.add_process(2, "kthreadd", None);
    fs::create_dir_all(fx.proc_root().join("self")).expect("Failed to create dir");

    let (mut sampler, collected) = fx.sampler(SamplerSettings::default());
    assert_eq!(sampler.tick(), TickOutcome::Sampled);

    let snap = last(&collected);
    assert_eq!(snap.used, 5_123_456);
    assert_eq!(snap.total, 16_318_412);
    assert!((snap.percent - 31.396).abs() < 0.01);
    assert_eq!(snap.history.len(), 1);
    assert_eq!(snap.alert, AlertStatus::Normal);

    let order: Vec<(u32, &str, u64)> = snap
        .processes
        .iter()
        .map(|p| (p.pid, p.name.as_str(), p.memory_kb))
        .collect();
    assert_eq!(
        order,
        vec![(1234, "firefox", 812_345), (1, "systemd", 12_000), (2, "kthreadd", 0)]
    );
}

#[test]
fn test_missing_kernel_source_degrades() {
    let fx = Fixture::new();
    fx.add_process(1, "init", Some(100));

    let (mut sampler, collected) = fx.sampler(SamplerSettings::default());
    sampler.tick();

    let snap = last(&collected);
    assert_eq!((snap.used, snap.total, snap.percent), (0, 1, 0.0));
    assert_eq!(snap.history, vec![0.0]);
    assert_eq!(snap.processes.len(), 1);
}

#[test]
fn test_malformed_kernel_source_degrades() {
    let fx = Fixture::new();
    fs::write(fx.kernel_source(), "Used: lots\nTotal: 10\n").expect("write");

    let (mut sampler, collected) = fx.sampler(SamplerSettings::default());
    sampler.tick();

    assert_eq!(last(&collected).sample().total, 1);
}

#[test]
fn test_vanished_process_is_skipped() {
    let fx = Fixture::new();
    fx.set_kernel(10, 100);
    fx.add_process(10, "short-lived", Some(500));
    fx.add_process(11, "daemon", Some(300));

    let (mut sampler, collected) = fx.sampler(SamplerSettings::default());
    sampler.tick();
    assert_eq!(last(&collected).processes.len(), 2);

    fx.remove_status(10);
    sampler.tick();
    let snap = last(&collected);
    assert_eq!(snap.processes.len(), 1);
    assert_eq!(snap.processes[0].name, "daemon");
}

#[test]
fn test_alert_fires_once_per_crossing() {
    let fx = Fixture::new();
    let (mut sampler, collected) = fx.sampler(SamplerSettings::default());

    let expected = [
        (70, AlertStatus::Normal),
        (75, AlertStatus::Normal),
        (82, AlertStatus::Triggered),
        (90, AlertStatus::Triggered),
        (85, AlertStatus::Triggered),
        (60, AlertStatus::Normal),
        (95, AlertStatus::Triggered),
    ];
    for (used, status) in expected {
        fx.set_kernel(used, 100);
        sampler.tick();
        assert_eq!(last(&collected).alert, status, "at {}%", used);
    }

    let alerts = collected.alerts.lock().unwrap();
    assert_eq!(alerts.len(), 2);
    assert!((alerts[0].percent - 82.0).abs() < 1e-9);
    assert!((alerts[1].percent - 95.0).abs() < 1e-9);
}

#[test]
fn test_history_keeps_last_thirty() {
    let fx = Fixture::new();
    let (mut sampler, collected) = fx.sampler(SamplerSettings::default());

    for used in 1..=31 {
        fx.set_kernel(used, 100);
        sampler.tick();
    }

    let snap = last(&collected);
    assert_eq!(snap.history.len(), 30);
    assert!((snap.history[0] - 2.0).abs() < 1e-9);
    assert!((snap.history[29] - 31.0).abs() < 1e-9);
    assert_eq!(sampler.samples_taken(), 31);
}

#[test]
fn test_pause_keeps_last_snapshot() {
    let fx = Fixture::new();
    fx.set_kernel(40, 100);
    let (mut sampler, collected) = fx.sampler(SamplerSettings::default());
    sampler.tick();

    let pause = sampler.pause_handle();
    pause.set_paused(true);
    fx.set_kernel(90, 100);
    assert_eq!(sampler.tick(), TickOutcome::Paused);
    assert_eq!(sampler.tick(), TickOutcome::Paused);

    assert_eq!(collected.snapshots.lock().unwrap().len(), 1);
    assert_eq!(sampler.history().len(), 1);
    assert!(!sampler.alert_state().is_triggered());

    assert!(!pause.toggle());
    sampler.tick();
    assert_eq!(last(&collected).alert, AlertStatus::Triggered);
    let history = sampler.history();
    assert_eq!(history.len(), 2);
    assert!((history[1] - 90.0).abs() < 1e-9);
}

#[test]
fn test_top_n_limits_processes() {
    let fx = Fixture::new();
    fx.set_kernel(1, 100);
    for pid in 1..=5u32 {
        fx.add_process(pid, &format!("proc{}", pid), Some(pid as u64 * 100));
    }

    let settings = SamplerSettings {
        top_n: 2,
        ..SamplerSettings::default()
    };
    let (mut sampler, collected) = fx.sampler(settings);
    sampler.tick();

    let pids: Vec<u32> = last(&collected).processes.iter().map(|p| p.pid).collect();
    assert_eq!(pids, vec![5, 4]);
}

#[test]
fn test_file_exporters_write_every_tick() {
    let fx = Fixture::new();
    fx.set_kernel(85, 100);
    fx.add_process(42, "worker", Some(2048));

    let json_path = fx.dir.path().join("snapshot.json");
    let prom_path = fx.dir.path().join("mem_tracker.prom");

    let mut sampler = SamplerLoop::new(
        KernelMemoryReader::new(fx.kernel_source()),
        ProcessMemoryScanner::new(fx.proc_root()).with_parallel(false),
        SamplerSettings::default(),
    )
    .with_observer(JsonExportObserver::new(&json_path))
    .with_observer(TextfileObserver::new(&prom_path, 80.0).expect("metrics registry"));
    sampler.tick();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_path).expect("read json")).expect("json");
    assert_eq!(json["used"], 85);
    assert_eq!(json["alert"], "triggered");
    assert_eq!(json["processes"][0]["name"], "worker");

    let prom = fs::read_to_string(&prom_path).expect("read textfile");
    assert!(prom.contains("mem_tracker_kernel_used_kb 85"));
    assert!(prom.contains("mem_tracker_alerts_total 1"));
    assert!(!Path::new(&format!("{}.tmp", prom_path.display())).exists());
}

#[tokio::test]
async fn test_run_n_ticks_on_interval() {
    let fx = Fixture::new();
    fx.set_kernel(25, 100);
    let (sampler, collected) = fx.sampler(SamplerSettings::default());

    let sampler = run_n(sampler, Duration::from_millis(5), 3).await;

    assert_eq!(sampler.samples_taken(), 3);
    assert_eq!(collected.snapshots.lock().unwrap().len(), 3);
    assert_eq!(sampler.history(), vec![25.0, 25.0, 25.0]);
}

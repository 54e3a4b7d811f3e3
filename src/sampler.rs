//! The sampling loop: reads both sources once per tick, folds the kernel
//! usage into the rolling history, evaluates the threshold alert and hands a
//! snapshot to every registered observer.
//!
//! The loop owns no timer. A runner (see [`crate::runner`]) or a test calls
//! [`SamplerLoop::tick`] on whatever cadence it likes; ticks never overlap
//! because `tick` takes `&mut self`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::alert::{AlertEvent, AlertState, AlertStatus, DEFAULT_THRESHOLD_PERCENT};
use crate::kernel::{MemorySample, MemorySource};
use crate::process::{ProcessEntry, ProcessSource};
use crate::ringbuffer::{Ringbuffer, DEFAULT_HISTORY_LEN};

/// Default number of processes carried in each snapshot.
pub const DEFAULT_TOP_N: usize = 20;

/// Construction-time settings of the loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerSettings {
    pub history_len: usize,
    pub top_n: usize,
    pub threshold_percent: f64,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            history_len: DEFAULT_HISTORY_LEN,
            top_n: DEFAULT_TOP_N,
            threshold_percent: DEFAULT_THRESHOLD_PERCENT,
        }
    }
}

/// Everything one tick produced. Observers get a copy, never live state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub taken_at: DateTime<Utc>,
    pub used: u64,
    pub total: u64,
    pub percent: f64,
    pub history: Vec<f64>,
    pub processes: Vec<ProcessEntry>,
    pub alert: AlertStatus,
}

impl Snapshot {
    pub fn sample(&self) -> MemorySample {
        MemorySample {
            used: self.used,
            total: self.total,
            percent: self.percent,
        }
    }
}

/// Consumer of sampler output, typically a presentation layer or exporter.
pub trait SamplerObserver: Send {
    fn on_snapshot(&mut self, snapshot: &Snapshot);

    /// Called before `on_snapshot` on the tick that crossed the threshold.
    fn on_alert(&mut self, _alert: &AlertEvent) {}
}

/// Shared pause flag. Clones control the same loop.
#[derive(Debug, Clone, Default)]
pub struct PauseHandle(Arc<AtomicBool>);

impl PauseHandle {
    pub fn new(paused: bool) -> Self {
        Self(Arc::new(AtomicBool::new(paused)))
    }

    pub fn is_paused(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set_paused(&self, paused: bool) {
        self.0.store(paused, Ordering::Relaxed);
    }

    /// Flips the flag and returns the new value.
    pub fn toggle(&self) -> bool {
        !self.0.fetch_xor(true, Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Sampled,
    Paused,
}

pub struct SamplerLoop {
    memory: Box<dyn MemorySource>,
    processes: Box<dyn ProcessSource>,
    history: Ringbuffer<f64>,
    alert: AlertState,
    top_n: usize,
    pause: PauseHandle,
    observers: Vec<Box<dyn SamplerObserver>>,
    last_snapshot: Option<Snapshot>,
    samples_taken: u64,
}

impl SamplerLoop {
    pub fn new<M, P>(memory: M, processes: P, settings: SamplerSettings) -> Self
    where
        M: MemorySource + 'static,
        P: ProcessSource + 'static,
    {
        Self {
            memory: Box::new(memory),
            processes: Box::new(processes),
            history: Ringbuffer::new(settings.history_len),
            alert: AlertState::new(settings.threshold_percent),
            top_n: settings.top_n,
            pause: PauseHandle::default(),
            observers: Vec::new(),
            last_snapshot: None,
            samples_taken: 0,
        }
    }

    pub fn add_observer<O: SamplerObserver + 'static>(&mut self, observer: O) {
        self.observers.push(Box::new(observer));
    }

    pub fn with_observer<O: SamplerObserver + 'static>(mut self, observer: O) -> Self {
        self.add_observer(observer);
        self
    }

    /// Handle for the presentation layer to pause and resume sampling.
    pub fn pause_handle(&self) -> PauseHandle {
        self.pause.clone()
    }

    pub fn is_paused(&self) -> bool {
        self.pause.is_paused()
    }

    /// Usage history, oldest first.
    pub fn history(&self) -> Vec<f64> {
        self.history.get_history()
    }

    pub fn alert_state(&self) -> &AlertState {
        &self.alert
    }

    pub fn last_snapshot(&self) -> Option<&Snapshot> {
        self.last_snapshot.as_ref()
    }

    pub fn samples_taken(&self) -> u64 {
        self.samples_taken
    }

    /// Runs one sampling step unless paused.
    #[instrument(skip(self), level = "debug")]
    pub fn tick(&mut self) -> TickOutcome {
        if self.pause.is_paused() {
            debug!("Sampler paused, skipping tick");
            return TickOutcome::Paused;
        }

        let sample = self.memory.read();
        self.history.push(sample.percent);

        let alert = self.alert.evaluate(sample.percent);
        if let Some(event) = &alert {
            warn!("Threshold Alert: {}", event);
            for observer in self.observers.iter_mut() {
                observer.on_alert(event);
            }
        }

        let mut processes = self.processes.scan();
        processes.truncate(self.top_n);

        let snapshot = Snapshot {
            taken_at: Utc::now(),
            used: sample.used,
            total: sample.total,
            percent: sample.percent,
            history: self.history.get_history(),
            processes,
            alert: self.alert.status(),
        };
        self.samples_taken += 1;

        debug!(
            "Sample {}: used={} KB total={} KB ({:.2}%), {} processes",
            self.samples_taken,
            snapshot.used,
            snapshot.total,
            snapshot.percent,
            snapshot.processes.len()
        );

        for observer in self.observers.iter_mut() {
            observer.on_snapshot(&snapshot);
        }
        self.last_snapshot = Some(snapshot);

        TickOutcome::Sampled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays a fixed list of percentages (total = 10_000 KB).
    struct ScriptedMemory(Mutex<VecDeque<f64>>);

    impl ScriptedMemory {
        fn new(percents: &[f64]) -> Self {
            Self(Mutex::new(percents.iter().copied().collect()))
        }
    }

    impl MemorySource for ScriptedMemory {
        fn read(&self) -> MemorySample {
            let percent = self.0.lock().unwrap().pop_front().unwrap_or(0.0);
            MemorySample::new((percent * 100.0) as u64, 10_000)
        }
    }

    struct FixedProcesses(Vec<ProcessEntry>);

    impl ProcessSource for FixedProcesses {
        fn scan(&self) -> Vec<ProcessEntry> {
            self.0.clone()
        }
    }

    #[derive(Default, Clone)]
    struct Recorder {
        snapshots: Arc<Mutex<Vec<Snapshot>>>,
        alerts: Arc<Mutex<Vec<AlertEvent>>>,
    }

    impl SamplerObserver for Recorder {
        fn on_snapshot(&mut self, snapshot: &Snapshot) {
            self.snapshots.lock().unwrap().push(snapshot.clone());
        }

        fn on_alert(&mut self, alert: &AlertEvent) {
            self.alerts.lock().unwrap().push(alert.clone());
        }
    }

    fn many_processes(n: u32) -> Vec<ProcessEntry> {
        (1..=n)
            .map(|pid| ProcessEntry::new(pid, format!("proc{}", pid), 1000 - pid as u64))
            .collect()
    }

    fn sampler(percents: &[f64], recorder: &Recorder) -> SamplerLoop {
        SamplerLoop::new(
            ScriptedMemory::new(percents),
            FixedProcesses(many_processes(3)),
            SamplerSettings::default(),
        )
        .with_observer(recorder.clone())
    }

    #[test]
    fn test_tick_emits_snapshot() {
        let recorder = Recorder::default();
        let mut sampler = sampler(&[25.0], &recorder);

        assert_eq!(sampler.tick(), TickOutcome::Sampled);

        let snapshots = recorder.snapshots.lock().unwrap();
        assert_eq!(snapshots.len(), 1);
        let snap = &snapshots[0];
        assert_eq!(snap.used, 2500);
        assert_eq!(snap.total, 10_000);
        assert!((snap.percent - 25.0).abs() < 1e-9);
        assert_eq!(snap.history, vec![snap.percent]);
        assert_eq!(snap.processes.len(), 3);
        assert_eq!(snap.alert, AlertStatus::Normal);
        assert_eq!(sampler.last_snapshot(), Some(snap));
        assert_eq!(sampler.samples_taken(), 1);
    }

    #[test]
    fn test_history_window_slides() {
        let percents: Vec<f64> = (1..=31).map(|i| i as f64).collect();
        let recorder = Recorder::default();
        let mut sampler = sampler(&percents, &recorder);

        for _ in 0..31 {
            sampler.tick();
            assert!(sampler.history().len() <= DEFAULT_HISTORY_LEN);
        }

        let history = sampler.history();
        assert_eq!(history.len(), 30);
        assert!(!history.contains(&1.0));
        for (value, expected) in history.iter().zip(2..=31) {
            assert!((value - expected as f64).abs() < 1e-9);
        }
        let last = recorder.snapshots.lock().unwrap().last().cloned().unwrap();
        assert_eq!(last.history, history);
    }

    #[test]
    fn test_alert_fires_once_per_crossing() {
        let recorder = Recorder::default();
        let mut sampler = sampler(&[70.0, 75.0, 82.0, 90.0, 85.0, 60.0], &recorder);

        let mut alerts_after_tick = Vec::new();
        for _ in 0..6 {
            sampler.tick();
            alerts_after_tick.push(recorder.alerts.lock().unwrap().len());
        }

        assert_eq!(alerts_after_tick, vec![0, 0, 1, 1, 1, 1]);
        let alerts = recorder.alerts.lock().unwrap();
        assert!((alerts[0].percent - 82.0).abs() < 1e-9);
        assert_eq!(alerts[0].threshold, 80.0);
        assert!(!sampler.alert_state().is_triggered());

        let statuses: Vec<AlertStatus> = recorder
            .snapshots
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.alert)
            .collect();
        assert_eq!(
            statuses,
            vec![
                AlertStatus::Normal,
                AlertStatus::Normal,
                AlertStatus::Triggered,
                AlertStatus::Triggered,
                AlertStatus::Triggered,
                AlertStatus::Normal,
            ]
        );
    }

    #[test]
    fn test_processes_truncated_to_top_n() {
        let recorder = Recorder::default();
        let mut sampler = SamplerLoop::new(
            ScriptedMemory::new(&[10.0]),
            FixedProcesses(many_processes(50)),
            SamplerSettings::default(),
        )
        .with_observer(recorder.clone());

        sampler.tick();

        let snap = sampler.last_snapshot().unwrap();
        assert_eq!(snap.processes.len(), DEFAULT_TOP_N);
        assert_eq!(snap.processes[0].pid, 1);
        assert_eq!(snap.processes[19].pid, 20);
    }

    #[test]
    fn test_pause_freezes_state() {
        let recorder = Recorder::default();
        let mut sampler = sampler(&[50.0, 85.0, 90.0, 95.0], &recorder);
        let pause = sampler.pause_handle();

        sampler.tick();
        sampler.tick();

        let history = sampler.history();
        let alert = sampler.alert_state().clone();
        let snapshot = sampler.last_snapshot().cloned();

        assert!(pause.toggle());
        assert_eq!(sampler.tick(), TickOutcome::Paused);
        assert_eq!(sampler.tick(), TickOutcome::Paused);

        assert_eq!(sampler.history(), history);
        assert_eq!(sampler.alert_state(), &alert);
        assert_eq!(sampler.last_snapshot().cloned(), snapshot);
        assert_eq!(recorder.snapshots.lock().unwrap().len(), 2);
        assert_eq!(sampler.samples_taken(), 2);

        // Resuming picks up with the next scripted value
        assert!(!pause.toggle());
        assert_eq!(sampler.tick(), TickOutcome::Sampled);
        assert_eq!(sampler.history().len(), 3);
        assert!((sampler.history()[2] - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_pause_handle_shared() {
        let handle = PauseHandle::new(false);
        let other = handle.clone();
        other.set_paused(true);
        assert!(handle.is_paused());
        assert!(!handle.toggle());
        assert!(!other.is_paused());
    }

    #[test]
    fn test_custom_settings() {
        let recorder = Recorder::default();
        let mut sampler = SamplerLoop::new(
            ScriptedMemory::new(&[10.0, 20.0, 30.0, 40.0]),
            FixedProcesses(many_processes(5)),
            SamplerSettings {
                history_len: 2,
                top_n: 1,
                threshold_percent: 35.0,
            },
        )
        .with_observer(recorder.clone());

        for _ in 0..4 {
            sampler.tick();
        }

        assert_eq!(sampler.history().len(), 2);
        assert_eq!(sampler.last_snapshot().unwrap().processes.len(), 1);
        assert_eq!(recorder.alerts.lock().unwrap().len(), 1);
    }
}

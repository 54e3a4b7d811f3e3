//! Edge-triggered threshold alerting.
//!
//! The alert fires once when usage rises to or above the threshold and
//! re-arms silently as soon as usage drops below it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Default alert threshold in percent.
pub const DEFAULT_THRESHOLD_PERCENT: f64 = 80.0;

/// Alert state machine position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Normal,
    Triggered,
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Triggered => write!(f, "triggered"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    ThresholdCrossed,
}

/// Raised on the Normal -> Triggered transition only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertEvent {
    pub kind: AlertKind,
    pub percent: f64,
    pub threshold: f64,
    pub raised_at: DateTime<Utc>,
}

impl fmt::Display for AlertEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Kernel memory usage crossed {}%! Current: {:.2}%",
            self.threshold, self.percent
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlertState {
    threshold: f64,
    triggered: bool,
}

impl AlertState {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            triggered: false,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered
    }

    pub fn status(&self) -> AlertStatus {
        if self.triggered {
            AlertStatus::Triggered
        } else {
            AlertStatus::Normal
        }
    }

    /// Feeds one sample. Returns an event only on the rising edge.
    pub fn evaluate(&mut self, percent: f64) -> Option<AlertEvent> {
        if percent >= self.threshold {
            if self.triggered {
                return None;
            }
            self.triggered = true;
            Some(AlertEvent {
                kind: AlertKind::ThresholdCrossed,
                percent,
                threshold: self.threshold,
                raised_at: Utc::now(),
            })
        } else {
            self.triggered = false;
            None
        }
    }
}

impl Default for AlertState {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD_PERCENT)
    }
}

//! Fixed-interval driver for the sampling loop.
//!
//! A single task owns the [`SamplerLoop`] and awaits each tick to completion
//! before waiting for the next interval, so ticks are strictly serialized.
//! Intervals missed by a slow tick are delayed rather than replayed in a burst.

use std::future::Future;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use crate::sampler::{SamplerLoop, TickOutcome};

/// Default sampling interval.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Counters reported when the runner stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub sampled: u64,
    pub paused: u64,
}

/// Ticks the sampler every `interval` until `shutdown` resolves.
///
/// The first tick happens immediately. Returns the loop so callers can
/// inspect its final state.
pub async fn run<F>(
    mut sampler: SamplerLoop,
    interval: Duration,
    shutdown: F,
) -> (SamplerLoop, RunSummary)
where
    F: Future<Output = ()>,
{
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut summary = RunSummary::default();

    tokio::pin!(shutdown);

    info!("Sampler started with {:?} interval", interval);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                debug!("Shutdown requested, stopping sampler");
                break;
            }
            _ = ticker.tick() => {
                match sampler.tick() {
                    TickOutcome::Sampled => summary.sampled += 1,
                    TickOutcome::Paused => summary.paused += 1,
                }
            }
        }
    }

    info!(
        "Sampler stopped after {} samples ({} paused ticks)",
        summary.sampled, summary.paused
    );
    (sampler, summary)
}

/// Ticks the sampler `count` times, `interval` apart. Used by one-shot
/// commands.
pub async fn run_n(mut sampler: SamplerLoop, interval: Duration, count: usize) -> SamplerLoop {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    for _ in 0..count {
        ticker.tick().await;
        sampler.tick();
    }
    sampler
}

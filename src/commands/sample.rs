//! Sample command implementation.
//!
//! Takes a fixed number of samples with the configured sources and prints
//! each snapshot.

use mem_tracker::runner::run_n;
use mem_tracker::{ConsoleObserver, KernelMemoryReader, ProcessMemoryScanner, SamplerLoop};

use crate::config::Config;

/// Runs `iterations` ticks one interval apart and prints every snapshot.
pub async fn command_sample(
    iterations: usize,
    no_processes: bool,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let sampler = SamplerLoop::new(
        KernelMemoryReader::new(config.kernel_source()),
        ProcessMemoryScanner::new(config.proc_root()).with_parallel(config.parallel_scan()),
        config.sampler_settings(),
    )
    .with_observer(ConsoleObserver::new(!no_processes));

    let sampler = run_n(sampler, config.interval(), iterations).await;

    if let Some(snapshot) = sampler.last_snapshot() {
        println!(
            "📋 {} samples taken, alert status: {}",
            sampler.samples_taken(),
            snapshot.alert
        );
    }

    Ok(())
}

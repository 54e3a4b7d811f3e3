//! mem-tracker - version 0.1.0
//!
//! Kernel and per-process memory tracker with tracing logging.
//! This is the main entry point that starts the sampler and handles subcommands.

mod cli;
mod commands;
mod config;
mod startup_checks;

use clap::{Parser, ValueEnum};
use tokio::signal;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info, warn};

use cli::{Args, Commands, LogLevel};
use commands::{command_check, command_config, command_sample};
use config::{resolve_config, show_config, validate_effective_config, Config};
use mem_tracker::runner;
use mem_tracker::{
    ConsoleObserver, JsonExportObserver, KernelMemoryReader, PauseHandle, ProcessMemoryScanner,
    SamplerLoop, TextfileObserver,
};

/// Initializes tracing logging subsystem. CLI level wins over the config
/// file value; warn otherwise.
fn setup_logging(config: &Config, args: &Args) {
    let level = args.log_level.clone().unwrap_or_else(|| {
        config
            .log_level
            .as_deref()
            .and_then(|s| LogLevel::from_str(s, true).ok())
            .unwrap_or(LogLevel::Warn)
    });

    let max_level = match level {
        LogLevel::Off => LevelFilter::OFF,
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Trace => LevelFilter::TRACE,
    };

    // Snapshots go to stdout, so logs go to stderr.
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    info!("Logging initialized with level: {:?}", level);
}

/// Helper function to load and validate configuration.
/// Exits the process with error code 1 if validation fails.
fn load_validated_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let config = resolve_config(args)?;
    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }
    Ok(config)
}

/// Builds the sampler and registers the observers the config asks for.
fn build_sampler(config: &Config) -> Result<SamplerLoop, Box<dyn std::error::Error>> {
    let settings = config.sampler_settings();
    let mut sampler = SamplerLoop::new(
        KernelMemoryReader::new(config.kernel_source()),
        ProcessMemoryScanner::new(config.proc_root()).with_parallel(config.parallel_scan()),
        settings,
    );

    if config.console.unwrap_or(true) {
        sampler.add_observer(ConsoleObserver::new(true));
    }
    if let Some(path) = &config.json_export_path {
        info!("Exporting snapshots as JSON to {}", path.display());
        sampler.add_observer(JsonExportObserver::new(path.clone()));
    }
    if let Some(path) = &config.textfile_path {
        info!("Exporting Prometheus metrics to {}", path.display());
        sampler.add_observer(TextfileObserver::new(
            path.clone(),
            settings.threshold_percent,
        )?);
    }

    Ok(sampler)
}

/// Toggles the pause flag on every SIGUSR1.
fn spawn_pause_toggle(pause: PauseHandle) {
    #[cfg(unix)]
    tokio::spawn(async move {
        let mut usr1 = match signal::unix::signal(signal::unix::SignalKind::user_defined1()) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to install SIGUSR1 handler, pause toggle disabled: {}", e);
                return;
            }
        };

        while usr1.recv().await.is_some() {
            if pause.toggle() {
                info!("Received SIGUSR1, sampling paused");
            } else {
                info!("Received SIGUSR1, sampling resumed");
            }
        }
    });

    #[cfg(not(unix))]
    let _ = pause;
}

/// Main application entry point.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Early config resolution for show/check modes
    if args.show_config || args.check_config {
        let config = resolve_config(&args)?;

        if args.check_config {
            if let Err(e) = validate_effective_config(&config) {
                eprintln!("❌ Configuration invalid: {}", e);
                std::process::exit(1);
            }
            println!("✅ Configuration is valid");
            return Ok(());
        }

        return show_config(&config, args.config_format.clone());
    }

    // Handle subcommands
    if let Some(command) = &args.command {
        if let Commands::Config {
            output,
            format,
            commented,
        } = command
        {
            return command_config(output.clone(), format.clone(), *commented);
        }

        let config = load_validated_config(&args)?;
        setup_logging(&config, &args);

        return match command {
            Commands::Check => command_check(&config),
            Commands::Sample {
                iterations,
                no_processes,
            } => command_sample(*iterations, *no_processes, &config).await,
            Commands::Config { .. } => unreachable!("Config handled above"),
        };
    }

    let config = load_validated_config(&args)?;
    setup_logging(&config, &args);

    info!("Starting mem-tracker");

    if let Err(e) =
        startup_checks::validate_requirements(&config.kernel_source(), &config.proc_root())
    {
        error!("❌ Startup validation failed: {}", e);
        error!("   mem-tracker will start but may report degraded values!");
    }

    // Configure parallel processing
    if let Some(threads) = config.parallelism {
        if threads > 0 {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build_global()
                .unwrap_or_else(|e| error!("Failed to set rayon thread pool: {}", e));
            debug!("Rayon thread pool configured with {} threads", threads);
        }
    }

    let sampler = build_sampler(&config)?;

    let pause = sampler.pause_handle();
    if args.start_paused {
        pause.set_paused(true);
        info!("Sampling starts paused, send SIGUSR1 to resume");
    }
    spawn_pause_toggle(pause);

    // Setup graceful shutdown signal handlers
    let shutdown_signal = async {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut s) => {
                    s.recv().await;
                }
                Err(e) => {
                    error!("Failed to install SIGTERM handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received SIGINT (Ctrl+C), shutting down gracefully...");
            }
            _ = terminate => {
                info!("Received SIGTERM, shutting down gracefully...");
            }
        }
    };

    let (sampler, summary) = runner::run(sampler, config.interval(), shutdown_signal).await;

    info!(
        "mem-tracker stopped gracefully: {} samples, {} paused ticks, alert {}",
        summary.sampled,
        summary.paused,
        sampler.alert_state().status()
    );
    Ok(())
}

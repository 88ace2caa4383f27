//! herakles-netmon - version 0.1.0
//!
//! Live network monitor with tracing logging.
//! This is the main entry point that wires the sampler and handles subcommands.

mod cli;
mod commands;
mod config;
mod startup_checks;

use clap::Parser;
use herakles_netmon::{
    format, InterfaceSelector, PingProbe, PollingLoop, RollingUsageAccumulator, Snapshot,
    StatsSampler, SysfsNetSource,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::Notify;
use tracing::{error, info, warn, Level};

use cli::{Args, Commands, LogLevel, OutputFormat};
use commands::{command_config, command_interfaces, command_probe};
use config::{
    config_warnings, resolve_config, show_config, validate_effective_config, Config,
};

/// Initializes tracing logging subsystem with the effective log level.
fn setup_logging(config: &Config) {
    let log_level = match config.log_level() {
        LogLevel::Off => return,
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    };

    // stdout carries the snapshots, logs go to stderr
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    info!("Logging initialized with level: {:?}", config.log_level());

    for warning in config_warnings(config) {
        warn!("⚠️  {}", warning);
    }
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

/// Prints one snapshot in the configured format.
fn print_snapshot(snapshot: &Snapshot, output: OutputFormat) {
    match output {
        OutputFormat::Text => println!("{}\n", format::render_text(snapshot)),
        OutputFormat::Line => println!("{}", format::render_line(snapshot)),
        OutputFormat::Json => match serde_json::to_string(snapshot) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Failed to serialize snapshot: {}", e),
        },
    }
}

/// Resolves once Ctrl+C or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
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
            for warning in config_warnings(&config) {
                eprintln!("⚠️  {}", warning);
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
        if command.wants_logging() {
            setup_logging(&config);
        }

        return match command {
            Commands::Interfaces { verbose } => command_interfaces(*verbose, &config),
            Commands::Probe { count } => command_probe(*count, &config),
            Commands::CheckRequirements => {
                println!("🔍 Checking Runtime Requirements");
                println!("================================\n");

                match startup_checks::validate_requirements(config.ping_program()) {
                    Ok(_) => {
                        println!("\n✅ All requirements met - ready to monitor!");
                        std::process::exit(0);
                    }
                    Err(e) => {
                        eprintln!("\n❌ Requirements check failed: {}", e);
                        std::process::exit(1);
                    }
                }
            }
            Commands::Config { .. } => unreachable!("Config handled above"),
        };
    }

    let config = load_validated_config(&args)?;

    setup_logging(&config);

    info!("Starting herakles-netmon");

    if let Err(e) = startup_checks::validate_requirements(config.ping_program()) {
        error!("❌ Startup validation failed: {}", e);
        error!("   The monitor will start but may not function correctly!");
        // Continue anyway - don't fail hard
    }

    // One instance of each component, wired together here
    let source = Arc::new(SysfsNetSource::new());
    let selector = InterfaceSelector::new(source.clone(), config.selection_policy());
    let sampler = StatsSampler::new(
        source,
        Box::new(PingProbe::with_program(config.ping_program())),
        RollingUsageAccumulator::new(config.window_ticks()),
        config.sampler_config(),
    );

    info!(
        "Sampling every {} ms, usage window {} ticks, probing {}",
        config.interval().as_millis(),
        config.window_ticks(),
        config.probe_target()
    );

    let output = config.output_format();
    let tick_limit = args.ticks;
    let delivered = Arc::new(AtomicU64::new(0));
    let limit_reached = Arc::new(Notify::new());

    let mut poller = {
        let delivered = Arc::clone(&delivered);
        let limit_reached = Arc::clone(&limit_reached);
        PollingLoop::start(config.polling_config(), selector, sampler, move |snapshot| {
            print_snapshot(&snapshot, output);

            let count = delivered.fetch_add(1, Ordering::Relaxed) + 1;
            if tick_limit.is_some_and(|limit| count >= limit) {
                limit_reached.notify_one();
            }
        })
    };

    tokio::select! {
        _ = shutdown_signal() => {}
        _ = limit_reached.notified() => {
            info!("Tick limit of {} reached", tick_limit.unwrap_or_default());
        }
    }

    poller.stop().await;

    for line in poller.stats().render_summary().lines() {
        info!("{}", line);
    }

    info!("herakles-netmon stopped gracefully");
    Ok(())
}

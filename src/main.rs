//! PageHands - Conversational page automation orchestrator
//!
//! Main entry point for the PageHands CLI and host bridge.

mod cli;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::BufReader;
use tracing::{error, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use pagehands::{build_orchestrator, BridgeBus, FileSettingsStore, HostBridge, LineWriter};
use pagehands_config::{Config, ConfigLoader, ConfigValidator, LoggingConfig};
use pagehands_protocols::tool::ToolRegistry;

use cli::{Cli, Commands, ConfigAction};

fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    // Stdout carries the host protocol; console logs go to stderr.
    let console = fmt::layer()
        .with_target(true)
        .with_ansi(true)
        .with_writer(std::io::stderr);

    let file = if logging.file {
        let log_dir = PathBuf::from(ConfigLoader::expand_path(&logging.dir));
        std::fs::create_dir_all(&log_dir)?;

        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("pagehands")
            .filename_suffix("log")
            .max_log_files(30)
            .build(&log_dir)?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        // Flushes buffered lines on exit.
        static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
            std::sync::OnceLock::new();
        let _ = GUARD.set(guard);

        Some(fmt::layer().with_writer(non_blocking).with_ansi(false).boxed())
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(file)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = ConfigLoader::load_or_default(cli.config.as_deref())?;

    match cli.command {
        None => {
            init_tracing(&config.logging)?;
            run(config, None, BridgeBus::DEFAULT_TIMEOUT).await
        }
        Some(Commands::Run {
            settings,
            executor_timeout,
        }) => {
            init_tracing(&config.logging)?;
            run(config, settings, Duration::from_secs(executor_timeout)).await
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::Validate => validate(&config),
            ConfigAction::Show => {
                let mut shown = config.clone();
                shown.provider = shown.provider.redacted();
                println!("{}", toml::to_string_pretty(&shown)?);
                Ok(())
            }
        },
        Some(Commands::Tools { format }) => {
            let registry = ToolRegistry::builtin();
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(registry.definitions())?);
            } else {
                println!("{:<16} DESCRIPTION", "TOOL");
                for tool in registry.definitions() {
                    println!("{:<16} {}", tool.name, tool.description);
                }
            }
            Ok(())
        }
    }
}

async fn run(
    config: Config,
    settings_path: Option<PathBuf>,
    executor_timeout: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let validation = ConfigValidator::validate(&config)?;
    for warning in &validation.warnings {
        warn!("{}: {}", warning.path, warning.message);
    }
    if !validation.is_valid() {
        for e in &validation.errors {
            error!("{}: {}", e.path, e.message);
        }
        return Err("invalid configuration".into());
    }

    let settings_path = settings_path.unwrap_or_else(FileSettingsStore::default_path);
    info!(settings = %settings_path.display(), "Starting PageHands");
    let settings = Arc::new(FileSettingsStore::new(settings_path, config.provider.clone()));

    let writer = Arc::new(LineWriter::new(tokio::io::stdout()));
    let bus = Arc::new(BridgeBus::new(writer.clone()).with_timeout(executor_timeout));
    let orchestrator = Arc::new(build_orchestrator(&config, bus.clone(), settings).await?);

    let cleaner = orchestrator.cleaner().spawn();
    let bridge = HostBridge::new(orchestrator, bus, writer);

    tokio::select! {
        result = bridge.serve(BufReader::new(tokio::io::stdin())) => result?,
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
    }

    cleaner.abort();
    info!("PageHands stopped");
    Ok(())
}

fn validate(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let result = ConfigValidator::validate(config)?;
    for warning in &result.warnings {
        println!("warning: {}: {}", warning.path, warning.message);
    }
    for e in &result.errors {
        println!("error: {}: {}", e.path, e.message);
    }
    if result.is_valid() {
        println!("Configuration is valid");
        Ok(())
    } else {
        Err(format!("{} configuration error(s)", result.errors.len()).into())
    }
}

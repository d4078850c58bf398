//! trellis - lazy component container with hierarchical commands
//!
//! Main entry point for the trellis CLI.

mod cli;
mod commands;
mod components;
mod register;

use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use trellis_config::{ConfigLoader, ConfigValidator, LoggingConfig};

use crate::cli::Cli;
use crate::components::{Output, Settings};
use crate::register::build_container;

fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&logging.level))?;

    let file_layer = if logging.file {
        let log_dir = logging.log_directory();
        std::fs::create_dir_all(&log_dir)?;

        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("trellis")
            .filename_suffix("log")
            .max_log_files(30)
            .build(&log_dir)?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        // Keep the writer alive for the program duration
        static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
            std::sync::OnceLock::new();
        let _ = GUARD.set(guard);

        Some(fmt::layer().with_writer(non_blocking).with_ansi(false))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        // Console goes to stderr so command output stays clean
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(true)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let source = cli.config.clone().or_else(|| {
        let default = ConfigLoader::default_path();
        default.exists().then_some(default)
    });
    let mut config = ConfigLoader::load_or_default(source.as_deref())?;
    config.container.override_required_modules |= cli.override_modules;
    config.container.include_dev_commands |= cli.include_dev;

    let mut validation = ConfigValidator::validate(&config)?;
    let warnings = std::mem::take(&mut validation.warnings);
    if let Some(err) = validation.into_error() {
        return Err(err.into());
    }

    init_tracing(&config.logging)?;
    for warning in &warnings {
        warn!("{}: {}", warning.path, warning.message);
    }

    info!("Starting trellis v{}", env!("CARGO_PKG_VERSION"));
    let container = build_container(Settings::new(config, source), Arc::new(Output::stdout()))?;

    let (name, args) = cli.command_line();
    let result = container.execute_command(&name, args).await;

    if let Err(e) = container.dispose() {
        warn!("Failed to dispose container: {}", e);
    }

    if let Err(e) = result {
        error!("Command {} failed: {}", name, e);
        return Err(e.into());
    }
    Ok(())
}

//! # grblpad
//!  Jog a GRBL machine from a Launchpad Pro, with the machine position mirrored on the grid
//!

mod config;

use grblpad_core::{Coordinator, Grbl, CHANNEL_DEPTH};
use grblpad_launchpad::Launchpad;
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt};

use config::{Config, LOG_VAR};

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Controller error: {0}")]
    Controller(#[from] grblpad_core::Error),
    #[error("Launchpad error: {0}")]
    Launchpad(#[from] grblpad_launchpad::Error),
}

fn setup_logging() {
    let env_log = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var(LOG_VAR)
        .from_env_lossy();
    let format_layer = tracing_subscriber::fmt::layer().compact();
    tracing_subscriber::registry()
        .with(env_log)
        .with(format_layer)
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Can't listen for Ctrl-C, running until the controller disconnects: {e}");
        std::future::pending::<()>().await
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AppError> {
    setup_logging();
    let config = Config::from_env()?;

    tracing::info!("Establishing serial connection to GRBL on {}", config.port);
    let port = grblpad_core::open(&config.port, config.baud).await?;
    let (grbl, lines) = Grbl::new(port);

    tracing::info!("Establishing MIDI connection to {}", config.midi_keyword);
    let (requests, request_receiver) = tokio::sync::mpsc::channel(CHANNEL_DEPTH);
    let launchpad = Launchpad::connect(&config.midi_keyword, requests)?;

    Coordinator::new(grbl, launchpad)
        .run(lines, request_receiver, shutdown_signal())
        .await?;
    Ok(())
}

//! # motion-sensord — HTTP motion sensor daemon
//!
//! Composition root that wires all adapters together and serves triggers.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Initialize tracing
//! - Build the event bus and the shared repeater client
//! - Validate and start every configured sensor
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

use motion_app::event_bus::InProcessEventBus;
use motion_sensord::config::Config;
use motion_sensord::platform::Platform;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Event bus
    let event_bus = InProcessEventBus::new(256);
    let mut events = event_bus.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => tracing::info!(
                    sensor = %event.sensor,
                    motion_detected = event.motion_detected,
                    "motion state changed"
                ),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event logger lagged behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Sensors
    let mut platform = Platform::start(&config, &event_bus).await?;
    if platform.is_empty() {
        tracing::warn!("no motion sensor is running, check the configuration");
    }

    shutdown_signal().await;
    tracing::info!("shutdown requested");
    platform.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

//! Arena Duel headless runner
//!
//! Runs a single round in real time without a renderer:
//! - Loads configuration from the environment (and `.env`)
//! - Drives the round session at the configured frame rate
//! - Logs HP changes, periodic snapshots and the final outcome

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use arena_duel::config::Config;
use arena_duel::game::{RoundRunner, RoundSession, TracingObserver};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level);

    let seed = config.seed.unwrap_or_else(|| rand::thread_rng().next_u64());
    info!("Starting Arena Duel");
    info!(
        device = ?config.device,
        width = config.arena_width,
        height = config.arena_height,
        round_seconds = config.round_seconds,
        autoplay = config.autoplay,
        seed,
        "Match setup"
    );

    let mut session = RoundSession::new(config.match_setup(), ChaCha8Rng::seed_from_u64(seed));
    let runner = RoundRunner::new(config.fps, config.snapshot_every);
    let mut observer = TracingObserver::default();

    match runner.run(&mut session, &mut observer, shutdown_signal()).await {
        Some(outcome) => info!(outcome = %outcome.label(), "Match finished"),
        None => info!("Match abandoned"),
    }

    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "Failed to listen for Ctrl+C");
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
                tracing::warn!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, stopping round");
        }
        _ = terminate => {
            info!("Received terminate signal, stopping round");
        }
    }
}

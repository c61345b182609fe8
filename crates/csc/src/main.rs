//! `wst-csc` -- weather station telemetry daemon.
//!
//! Accepts the station's TCP connection (per the applied settings profile),
//! publishes its telemetry on the in-process bus, and takes operator
//! commands over a JSON-lines TCP listener.
//!
//! # Environment variables
//!
//! | Variable                  | Required | Default     | Description                         |
//! |---------------------------|----------|-------------|-------------------------------------|
//! | `COMMAND_HOST`            | no       | `127.0.0.1` | Command listener bind address       |
//! | `COMMAND_PORT`            | no       | `8124`      | Command listener port               |
//! | `CONFIG_DIR`              | no       | `config`    | Directory with settings profiles    |
//! | `TELEMETRY_INTERVAL_SECS` | no       | `1`         | Seconds between acquisition cycles  |
//! | `SIMULATION_MODE`         | no       | `0`         | 0 = real station, 1 = simulated     |

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wst_csc::{server, Csc, CscConfig};
use wst_events::EventBus;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wst_csc=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CscConfig::from_env();
    wst_core::config::check_simulation_mode(config.simulation_mode)
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    tracing::info!(
        command_host = %config.command_host,
        command_port = config.command_port,
        config_dir = %config.config_dir.display(),
        simulation_mode = config.simulation_mode,
        "Starting weather station CSC",
    );

    let bus = Arc::new(EventBus::default());
    let (csc, remote) = Csc::new(config.clone(), Arc::clone(&bus));

    let addr = format!("{}:{}", config.command_host, config.command_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Cannot bind command listener on {addr}"))?;
    tracing::info!(%addr, "Command listener ready");
    tokio::spawn(server::serve(listener, remote));

    csc.run().await;
    Ok(())
}

use std::path::PathBuf;
use std::time::Duration;

/// Daemon configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development; station
/// specifics live in the settings profiles (see
/// [`StationConfig`](wst_core::config::StationConfig)), not here.
#[derive(Debug, Clone)]
pub struct CscConfig {
    /// Command listener bind address (default: `127.0.0.1`).
    pub command_host: String,
    /// Command listener port (default: `8124`).
    pub command_port: u16,
    /// Directory holding the settings profiles (default: `config`).
    pub config_dir: PathBuf,
    /// Interval between telemetry acquisition cycles (default: 1 s).
    pub telemetry_interval: Duration,
    /// Simulation mode the daemon starts with (default: `0`).
    pub simulation_mode: u8,
}

impl CscConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default     |
    /// |---------------------------|-------------|
    /// | `COMMAND_HOST`            | `127.0.0.1` |
    /// | `COMMAND_PORT`            | `8124`      |
    /// | `CONFIG_DIR`              | `config`    |
    /// | `TELEMETRY_INTERVAL_SECS` | `1`         |
    /// | `SIMULATION_MODE`         | `0`         |
    pub fn from_env() -> Self {
        let command_host =
            std::env::var("COMMAND_HOST").unwrap_or_else(|_| "127.0.0.1".into());

        let command_port: u16 = std::env::var("COMMAND_PORT")
            .unwrap_or_else(|_| "8124".into())
            .parse()
            .expect("COMMAND_PORT must be a valid u16");

        let config_dir = PathBuf::from(std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".into()));

        let telemetry_interval_secs: u64 = std::env::var("TELEMETRY_INTERVAL_SECS")
            .unwrap_or_else(|_| "1".into())
            .parse()
            .expect("TELEMETRY_INTERVAL_SECS must be a valid u64");

        let simulation_mode: u8 = std::env::var("SIMULATION_MODE")
            .unwrap_or_else(|_| "0".into())
            .parse()
            .expect("SIMULATION_MODE must be a valid u8");

        Self {
            command_host,
            command_port,
            config_dir,
            telemetry_interval: Duration::from_secs(telemetry_interval_secs),
            simulation_mode,
        }
    }
}

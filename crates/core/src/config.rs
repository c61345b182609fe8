//! Station configuration profiles.
//!
//! A profile is a JSON file in the configuration directory, selected by the
//! settings label carried on the `start` command. Profiles are validated on
//! load; a profile that fails validation rejects the `start` command instead
//! of surfacing later as a connection error.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;

/// Simulation modes the component accepts: 0 = real station, 1 = simulated.
pub const VALID_SIMULATION_MODES: [u8; 2] = [0, 1];

/// Settings label used when the `start` command does not name one.
pub const DEFAULT_SETTINGS_LABEL: &str = "default";

/// Which station controller a profile selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerKind {
    /// Vaisala AWS310 automatic weather station (ASCII over TCP).
    Aws310,
}

impl fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerKind::Aws310 => f.write_str("aws310"),
        }
    }
}

/// A validated station configuration profile.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StationConfig {
    /// Controller implementation to instantiate.
    pub kind: ControllerKind,

    /// Address the station connects to (the component listens).
    #[validate(length(min = 1, message = "host must not be empty"))]
    pub host: String,

    /// TCP port the station connects to.
    #[validate(range(min = 1, message = "port must be non-zero"))]
    pub port: u16,

    /// Maximum frame size accepted from the station, in bytes.
    #[validate(range(min = 1, max = 1_048_576, message = "buffer_size out of range"))]
    pub buffer_size: usize,

    /// Seconds to wait for a complete frame before giving up an acquisition.
    #[validate(range(min = 1, max = 600, message = "timeout_secs out of range"))]
    pub timeout_secs: u64,
}

impl StationConfig {
    /// Load and validate the profile named by `label` from `config_dir`.
    ///
    /// An empty label falls back to [`DEFAULT_SETTINGS_LABEL`].
    pub fn load_profile(config_dir: &Path, label: &str) -> Result<Self, CoreError> {
        let label = if label.is_empty() {
            DEFAULT_SETTINGS_LABEL
        } else {
            label
        };
        let path = config_dir.join(format!("{label}.json"));

        let raw = std::fs::read_to_string(&path).map_err(|e| {
            CoreError::Config(format!("Cannot read profile {}: {e}", path.display()))
        })?;

        let config: StationConfig = serde_json::from_str(&raw).map_err(|e| {
            CoreError::Config(format!("Malformed profile {}: {e}", path.display()))
        })?;

        config
            .validate()
            .map_err(|e| CoreError::Validation(format!("Profile {label}: {e}")))?;

        Ok(config)
    }
}

/// Reject simulation modes the component does not implement.
pub fn check_simulation_mode(mode: u8) -> Result<(), CoreError> {
    if VALID_SIMULATION_MODES.contains(&mode) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Simulation mode {mode} not in {VALID_SIMULATION_MODES:?}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn valid_config() -> StationConfig {
        StationConfig {
            kind: ControllerKind::Aws310,
            host: "0.0.0.0".into(),
            port: 4001,
            buffer_size: 8192,
            timeout_secs: 120,
        }
    }

    #[test]
    fn valid_profile_passes_validation() {
        valid_config().validate().expect("profile should validate");
    }

    #[test]
    fn zero_port_rejected() {
        let mut config = valid_config();
        config.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn oversized_buffer_rejected() {
        let mut config = valid_config();
        config.buffer_size = 2 * 1024 * 1024;
        assert!(config.validate().is_err());
    }

    #[test]
    fn simulation_mode_bounds() {
        check_simulation_mode(0).unwrap();
        check_simulation_mode(1).unwrap();
        assert_matches!(check_simulation_mode(2), Err(CoreError::Validation(_)));
    }

    #[test]
    fn load_profile_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let raw = serde_json::to_string(&valid_config()).unwrap();
        std::fs::write(dir.path().join("site.json"), raw).unwrap();

        let config = StationConfig::load_profile(dir.path(), "site").unwrap();
        assert_eq!(config.kind, ControllerKind::Aws310);
        assert_eq!(config.port, 4001);
    }

    #[test]
    fn empty_label_uses_default_profile() {
        let dir = tempfile::tempdir().unwrap();
        let raw = serde_json::to_string(&valid_config()).unwrap();
        std::fs::write(dir.path().join("default.json"), raw).unwrap();

        StationConfig::load_profile(dir.path(), "").expect("default profile should load");
    }

    #[test]
    fn missing_profile_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        assert_matches!(
            StationConfig::load_profile(dir.path(), "nope"),
            Err(CoreError::Config(_))
        );
    }
}

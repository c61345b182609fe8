//! The controller seam between the CSC and a concrete weather station.

use async_trait::async_trait;

use wst_core::config::{ControllerKind, StationConfig};
use wst_core::topics::WeatherReport;

use crate::aws310::Aws310Controller;
use crate::error::StationError;
use crate::sim::SimulatedStation;

/// Minimum surface a weather station controller must provide.
///
/// The CSC calls `start` while going ENABLED, then `acquire` once per
/// telemetry cycle, and `stop` on the way back to DISABLED. Implementations
/// keep the raw context of their last failure available through
/// `error_report` so the FAULT path can log something an operator can act on.
#[async_trait]
pub trait StationController: Send {
    /// Controller kind, for logs.
    fn kind(&self) -> &'static str;

    /// Bring the station link up.
    async fn start(&mut self) -> Result<(), StationError>;

    /// Tear the station link down. Idempotent.
    async fn stop(&mut self) -> Result<(), StationError>;

    /// Wait for the next complete report from the station.
    ///
    /// A [recoverable](StationError::is_recoverable) error means this cycle
    /// produced nothing but the link is still usable.
    async fn acquire(&mut self) -> Result<WeatherReport, StationError>;

    /// Raw context of the last failure (e.g. the frame that did not parse).
    fn error_report(&self) -> &str;

    /// Clear the stored failure context.
    fn clear_error(&mut self);
}

/// Instantiate the controller a profile selects.
///
/// Simulation mode 1 always yields the simulator, whatever the profile's
/// controller kind; the profile is still required so that leaving simulation
/// is a config-only change.
pub fn create_controller(config: &StationConfig, simulation_mode: u8) -> Box<dyn StationController> {
    if simulation_mode == 1 {
        return Box::new(SimulatedStation::new());
    }
    match config.kind {
        ControllerKind::Aws310 => Box::new(Aws310Controller::new(config.clone())),
    }
}

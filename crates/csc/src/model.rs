//! Controller selection and lifecycle.
//!
//! The model owns whichever [`StationController`] the applied settings
//! profile selected. It is shared between the command loop (setup, start,
//! stop) and the telemetry loop (acquire) behind an async mutex.

use wst_core::config::StationConfig;
use wst_core::topics::WeatherReport;
use wst_station::{create_controller, StationController, StationError};

#[derive(Default)]
pub struct Model {
    controller: Option<Box<dyn StationController>>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instantiate the controller for a validated profile.
    ///
    /// Replaces any previously configured controller (re-running `start`
    /// with different settings is legal from STANDBY).
    pub fn setup(&mut self, config: &StationConfig, simulation_mode: u8) {
        if self.controller.is_some() {
            tracing::warn!("Controller already set, replacing");
        }
        let controller = create_controller(config, simulation_mode);
        tracing::info!(kind = controller.kind(), simulation_mode, "Model configured");
        self.controller = Some(controller);
    }

    /// Drop the configured controller (DISABLED → STANDBY).
    pub fn unset(&mut self) {
        self.controller = None;
    }

    pub fn is_configured(&self) -> bool {
        self.controller.is_some()
    }

    pub async fn start_controller(&mut self) -> Result<(), StationError> {
        self.controller_mut()?.start().await
    }

    pub async fn stop_controller(&mut self) -> Result<(), StationError> {
        match self.controller.as_mut() {
            Some(controller) => controller.stop().await,
            // Nothing configured, nothing to stop.
            None => Ok(()),
        }
    }

    /// Wait for the next report from the station.
    pub async fn acquire(&mut self) -> Result<WeatherReport, StationError> {
        self.controller_mut()?.acquire().await
    }

    /// Raw context of the controller's last failure, empty when none.
    pub fn error_report(&self) -> &str {
        self.controller
            .as_ref()
            .map(|c| c.error_report())
            .unwrap_or("")
    }

    pub fn clear_error(&mut self) {
        if let Some(controller) = self.controller.as_mut() {
            controller.clear_error();
        }
    }

    fn controller_mut(&mut self) -> Result<&mut Box<dyn StationController>, StationError> {
        self.controller.as_mut().ok_or(StationError::NotStarted)
    }
}

//! Weather station controllers.
//!
//! A controller owns the link to one physical (or simulated) weather station
//! and turns its raw output into [`WeatherReport`](wst_core::WeatherReport)s:
//!
//! - [`StationController`] — the async seam the CSC drives.
//! - [`wire`] — parser for the AWS310 ASCII frame format.
//! - [`Aws310Controller`] — TCP controller for the Vaisala AWS310 station
//!   (the station dials in and pushes frames).
//! - [`SimulatedStation`] — canned-frame controller for simulation mode and
//!   tests.

pub mod aws310;
pub mod controller;
pub mod error;
pub mod sim;
pub mod wire;

pub use aws310::Aws310Controller;
pub use controller::{create_controller, StationController};
pub use error::StationError;
pub use sim::SimulatedStation;

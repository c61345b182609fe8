//! The weather station CSC.
//!
//! Drives one [`StationController`](wst_station::StationController) through
//! the standard summary-state machine and publishes its telemetry:
//!
//! - [`Csc`] — state machine, telemetry loop, heartbeat, fault handling.
//! - [`Remote`] — cloneable command handle (what an operator console or the
//!   command listener holds).
//! - [`server`] — JSON-lines TCP command listener used by the daemon.
//! - [`CscConfig`] — daemon configuration from environment variables.

pub mod command;
pub mod config;
pub mod csc;
pub mod model;
pub mod server;

pub use command::{AckError, Remote};
pub use config::CscConfig;
pub use csc::Csc;
pub use model::Model;

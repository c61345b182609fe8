//! Shared types for the weather station CSC.
//!
//! This crate holds everything the other workspace crates agree on:
//!
//! - [`state`] — the summary-state machine and external commands.
//! - [`topics`] — the telemetry topic structs and the per-cycle
//!   [`WeatherReport`](topics::WeatherReport) aggregate.
//! - [`config`] — station configuration profiles and validation.
//! - [`error_codes`] — well-known error codes published on FAULT.

pub mod config;
pub mod error;
pub mod error_codes;
pub mod state;
pub mod topics;
pub mod types;

pub use error::CoreError;
pub use state::{Command, SummaryState};
pub use topics::WeatherReport;

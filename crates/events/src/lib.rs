//! Publish/subscribe surface of the weather station CSC.
//!
//! In the full control system these messages ride the observatory message
//! bus; here they are fanned out in-process:
//!
//! - [`EventBus`] — broadcast hub shared as `Arc<EventBus>`.
//! - [`CscEvent`] — component events (`summaryState`, `errorCode`,
//!   `logMessage`, `heartbeat`).
//! - [`TelemetryFrame`] — one tagged frame per telemetry topic.

pub mod bus;

pub use bus::{CscEvent, EventBus, EventDetail, LogLevel, TelemetryFrame};

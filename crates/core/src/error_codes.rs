//! Well-known error codes published in the `errorCode` event.
//!
//! These values are part of the component's external contract: operators and
//! alerting rules key off them, so they must not be renumbered.

/// Error in the telemetry loop.
///
/// Published when acquiring or publishing weather data fails in a way the
/// loop cannot recover from; the component enters FAULT.
pub const TELEMETRY_LOOP_ERROR: i32 = 7801;

/// Error starting the station controller.
///
/// Published when `start()` on the controller fails during the enable
/// command; the component enters FAULT.
pub const CONTROLLER_START_ERROR: i32 = 7802;

/// Error stopping the station controller.
///
/// Published when `stop()` on the controller fails during the disable
/// command; the component enters FAULT.
pub const CONTROLLER_STOP_ERROR: i32 = 7803;

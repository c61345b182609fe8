//! In-process event bus backed by `tokio::sync::broadcast` channels.
//!
//! [`EventBus`] carries two independent streams: component events (state
//! changes, error codes, heartbeat) and telemetry frames. Subscribers on one
//! stream never see traffic from the other, matching the event/telemetry
//! split of the topic schema.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use wst_core::topics::{
    AirPressure, AirTemperature, DewPoint, Precipitation, RelativeHumidity, SnowDepth,
    SoilTemperature, SolarNetRadiation, Weather, WeatherReport, WindDirection, WindGustDirection,
    WindSpeed,
};
use wst_core::types::Timestamp;
use wst_core::SummaryState;

// ---------------------------------------------------------------------------
// CscEvent
// ---------------------------------------------------------------------------

/// Severity carried by `logMessage` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// Payload of a component event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum EventDetail {
    /// Published on every state change, and once at startup.
    SummaryState { state: SummaryState },

    /// Published when the component enters FAULT with a diagnosable cause.
    ErrorCode {
        code: i32,
        report: String,
        traceback: String,
    },

    /// Free-form operator-facing log line mirrored onto the bus.
    LogMessage { level: LogLevel, message: String },

    /// Liveness beacon, published on a fixed interval in every state.
    Heartbeat,
}

/// A component event with its publication time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CscEvent {
    #[serde(flatten)]
    pub detail: EventDetail,
    pub timestamp: Timestamp,
}

impl CscEvent {
    pub fn new(detail: EventDetail) -> Self {
        Self {
            detail,
            timestamp: Utc::now(),
        }
    }

    pub fn summary_state(state: SummaryState) -> Self {
        Self::new(EventDetail::SummaryState { state })
    }

    pub fn error_code(code: i32, report: impl Into<String>, traceback: impl Into<String>) -> Self {
        Self::new(EventDetail::ErrorCode {
            code,
            report: report.into(),
            traceback: traceback.into(),
        })
    }

    pub fn log_message(level: LogLevel, message: impl Into<String>) -> Self {
        Self::new(EventDetail::LogMessage {
            level,
            message: message.into(),
        })
    }

    pub fn heartbeat() -> Self {
        Self::new(EventDetail::Heartbeat)
    }
}

// ---------------------------------------------------------------------------
// TelemetryFrame
// ---------------------------------------------------------------------------

/// One telemetry topic sample, tagged with its topic name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "topic", rename_all = "camelCase")]
pub enum TelemetryFrame {
    Weather(Weather),
    WindDirection(WindDirection),
    WindGustDirection(WindGustDirection),
    WindSpeed(WindSpeed),
    AirTemperature(AirTemperature),
    RelativeHumidity(RelativeHumidity),
    DewPoint(DewPoint),
    SnowDepth(SnowDepth),
    SolarNetRadiation(SolarNetRadiation),
    AirPressure(AirPressure),
    Precipitation(Precipitation),
    SoilTemperature(SoilTemperature),
}

impl TelemetryFrame {
    /// Topic name as published on the bus.
    pub fn topic_name(&self) -> &'static str {
        match self {
            TelemetryFrame::Weather(_) => "weather",
            TelemetryFrame::WindDirection(_) => "windDirection",
            TelemetryFrame::WindGustDirection(_) => "windGustDirection",
            TelemetryFrame::WindSpeed(_) => "windSpeed",
            TelemetryFrame::AirTemperature(_) => "airTemperature",
            TelemetryFrame::RelativeHumidity(_) => "relativeHumidity",
            TelemetryFrame::DewPoint(_) => "dewPoint",
            TelemetryFrame::SnowDepth(_) => "snowDepth",
            TelemetryFrame::SolarNetRadiation(_) => "solarNetRadiation",
            TelemetryFrame::AirPressure(_) => "airPressure",
            TelemetryFrame::Precipitation(_) => "precipitation",
            TelemetryFrame::SoilTemperature(_) => "soilTemperature",
        }
    }

    /// Fan a full acquisition cycle out into one frame per topic, in the
    /// canonical topic order.
    pub fn from_report(report: &WeatherReport) -> Vec<TelemetryFrame> {
        vec![
            TelemetryFrame::Weather(report.weather.clone()),
            TelemetryFrame::WindDirection(report.wind_direction.clone()),
            TelemetryFrame::WindGustDirection(report.wind_gust_direction.clone()),
            TelemetryFrame::WindSpeed(report.wind_speed.clone()),
            TelemetryFrame::AirTemperature(report.air_temperature.clone()),
            TelemetryFrame::RelativeHumidity(report.relative_humidity.clone()),
            TelemetryFrame::DewPoint(report.dew_point.clone()),
            TelemetryFrame::SnowDepth(report.snow_depth.clone()),
            TelemetryFrame::SolarNetRadiation(report.solar_net_radiation.clone()),
            TelemetryFrame::AirPressure(report.air_pressure.clone()),
            TelemetryFrame::Precipitation(report.precipitation.clone()),
            TelemetryFrame::SoilTemperature(report.soil_temperature.clone()),
        ]
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for each broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out bus for events and telemetry.
///
/// Wraps two [`broadcast::Sender`]s so any number of subscribers can
/// independently follow either stream. Designed to be shared via
/// `Arc<EventBus>`.
pub struct EventBus {
    events: broadcast::Sender<CscEvent>,
    telemetry: broadcast::Sender<TelemetryFrame>,
}

impl EventBus {
    /// Create a bus with a specific per-channel capacity.
    ///
    /// When a buffer is full the oldest un-consumed messages are dropped and
    /// slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity);
        let (telemetry, _) = broadcast::channel(capacity);
        Self { events, telemetry }
    }

    /// Publish a component event. Zero subscribers is not an error.
    pub fn publish_event(&self, event: CscEvent) {
        let _ = self.events.send(event);
    }

    /// Publish a telemetry frame. Zero subscribers is not an error.
    pub fn publish_telemetry(&self, frame: TelemetryFrame) {
        let _ = self.telemetry.send(frame);
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<CscEvent> {
        self.events.subscribe()
    }

    pub fn subscribe_telemetry(&self) -> broadcast::Receiver<TelemetryFrame> {
        self.telemetry.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

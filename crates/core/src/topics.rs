//! Telemetry topic payloads.
//!
//! One struct per published topic. Field names on the wire match the topic
//! schema exactly (`avg2M`, `paAvg1M`, ...); the `weather` summary topic
//! keeps its historical snake_case field names.
//!
//! All quantities are `f64`; a quantity the station did not report in the
//! current frame is NaN, never zero. `sensor_name` is empty when the station
//! does not identify the sensor.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Topic names, in publication order.
pub const TOPIC_NAMES: [&str; 12] = [
    "weather",
    "windDirection",
    "windGustDirection",
    "windSpeed",
    "airTemperature",
    "relativeHumidity",
    "dewPoint",
    "snowDepth",
    "solarNetRadiation",
    "airPressure",
    "precipitation",
    "soilTemperature",
];

/// Condensed weather summary (1-minute averages).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Weather {
    pub ambient_temp: f64,
    pub humidity: f64,
    pub pressure: f64,
}

/// Wind direction in degrees.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindDirection {
    pub value: f64,
    pub avg2_m: f64,
    pub max2_m: f64,
    pub min2_m: f64,
    pub avg10_m: f64,
    pub max10_m: f64,
    pub sensor_name: String,
}

/// Wind gust direction in degrees.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindGustDirection {
    pub value10_m: f64,
    pub sensor_name: String,
}

/// Wind speed in m/s.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindSpeed {
    pub value: f64,
    pub avg2_m: f64,
    pub max2_m: f64,
    pub min2_m: f64,
    pub avg10_m: f64,
    pub max10_m: f64,
    pub sensor_name: String,
}

/// Air temperature in degrees Celsius.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirTemperature {
    pub avg1_m: f64,
    pub avg24_h: f64,
    pub max24_h: f64,
    pub min24_h: f64,
    pub sensor_name: String,
}

/// Relative humidity in percent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelativeHumidity {
    pub avg1_m: f64,
    pub avg24_h: f64,
    pub max24_h: f64,
    pub min24_h: f64,
    pub sensor_name: String,
}

/// Dew point in degrees Celsius.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DewPoint {
    pub avg1_m: f64,
    pub sensor_name: String,
}

/// Snow depth in cm.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnowDepth {
    pub avg1_m: f64,
    pub avg24_h: f64,
    pub max24_h: f64,
    pub min24_h: f64,
    pub sensor_name: String,
}

/// Net solar radiation in W/m^2.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolarNetRadiation {
    pub avg1_m: f64,
    pub avg24_h: f64,
    pub max24_h: f64,
    pub min24_h: f64,
    pub sensor_name: String,
}

/// Air pressure in hPa, plus 3-hour tendency.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirPressure {
    pub pa_avg1_m: f64,
    pub patr_value3_h: f64,
    pub pate_value3_h: f64,
    pub sensor_name: String,
}

/// Precipitation accumulation in mm and intensity in mm/h.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Precipitation {
    pub pr_sum1_m: f64,
    pub pr_sum1_h: f64,
    pub prf_sum1_m: f64,
    pub sensor_name: String,
}

/// Soil temperature in degrees Celsius.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoilTemperature {
    pub avg1_m: f64,
    pub avg24_h: f64,
    pub max24_h: f64,
    pub min24_h: f64,
    pub sensor_name: String,
}

/// One full acquisition cycle: a sample of every topic plus the time the
/// frame was read from the station.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    pub weather: Weather,
    pub wind_direction: WindDirection,
    pub wind_gust_direction: WindGustDirection,
    pub wind_speed: WindSpeed,
    pub air_temperature: AirTemperature,
    pub relative_humidity: RelativeHumidity,
    pub dew_point: DewPoint,
    pub snow_depth: SnowDepth,
    pub solar_net_radiation: SolarNetRadiation,
    pub air_pressure: AirPressure,
    pub precipitation: Precipitation,
    pub soil_temperature: SoilTemperature,
    pub acquired_at: Timestamp,
}

impl WeatherReport {
    /// A report with every quantity NaN and empty sensor names.
    ///
    /// The report builder starts from this and overwrites whatever the
    /// station frame actually carried.
    pub fn empty(acquired_at: Timestamp) -> Self {
        const NAN: f64 = f64::NAN;
        Self {
            weather: Weather {
                ambient_temp: NAN,
                humidity: NAN,
                pressure: NAN,
            },
            wind_direction: WindDirection {
                value: NAN,
                avg2_m: NAN,
                max2_m: NAN,
                min2_m: NAN,
                avg10_m: NAN,
                max10_m: NAN,
                sensor_name: String::new(),
            },
            wind_gust_direction: WindGustDirection {
                value10_m: NAN,
                sensor_name: String::new(),
            },
            wind_speed: WindSpeed {
                value: NAN,
                avg2_m: NAN,
                max2_m: NAN,
                min2_m: NAN,
                avg10_m: NAN,
                max10_m: NAN,
                sensor_name: String::new(),
            },
            air_temperature: AirTemperature {
                avg1_m: NAN,
                avg24_h: NAN,
                max24_h: NAN,
                min24_h: NAN,
                sensor_name: String::new(),
            },
            relative_humidity: RelativeHumidity {
                avg1_m: NAN,
                avg24_h: NAN,
                max24_h: NAN,
                min24_h: NAN,
                sensor_name: String::new(),
            },
            dew_point: DewPoint {
                avg1_m: NAN,
                sensor_name: String::new(),
            },
            snow_depth: SnowDepth {
                avg1_m: NAN,
                avg24_h: NAN,
                max24_h: NAN,
                min24_h: NAN,
                sensor_name: String::new(),
            },
            solar_net_radiation: SolarNetRadiation {
                avg1_m: NAN,
                avg24_h: NAN,
                max24_h: NAN,
                min24_h: NAN,
                sensor_name: String::new(),
            },
            air_pressure: AirPressure {
                pa_avg1_m: NAN,
                patr_value3_h: NAN,
                pate_value3_h: NAN,
                sensor_name: String::new(),
            },
            precipitation: Precipitation {
                pr_sum1_m: NAN,
                pr_sum1_h: NAN,
                prf_sum1_m: NAN,
                sensor_name: String::new(),
            },
            soil_temperature: SoilTemperature {
                avg1_m: NAN,
                avg24_h: NAN,
                max24_h: NAN,
                min24_h: NAN,
                sensor_name: String::new(),
            },
            acquired_at,
        }
    }
}

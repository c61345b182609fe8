//! Parser for the AWS310 ASCII wire format.
//!
//! The station pushes frames shaped like:
//!
//! ```text
//! SMS 0(S:AWS310_LSST;
//! D:190204;
//! ...
//! WS|AVG|PT2M||1|mps|:0.1;
//! WD|VALUE|||1|deg|:301;
//! ...
//! SNH|MIN|PT24H||1|cm|:11873.7)D621
//! ```
//!
//! The payload sits between `(` and `)`; anything after `)` is a checksum
//! and is ignored. Inside, `;`-separated entries are either header fields
//! (`S:AWS310_LSST`, no pipes) or measurement records with seven
//! pipe-separated columns: quantity, statistic, aggregation period, a
//! reserved column, sensor index, unit, and `:value`.
//!
//! Parsing is deliberately lenient: header entries and records with unknown
//! statistics are skipped, and a value that does not parse becomes NaN. A
//! frame yielding zero records is an error carrying the raw input so the
//! controller can retain it for diagnostics.

use wst_core::topics::WeatherReport;
use wst_core::types::Timestamp;

/// A frame that produced no measurement records at all.
#[derive(Debug, thiserror::Error)]
#[error("No measurement records in frame")]
pub struct EmptyFrame {
    pub raw: String,
}

/// Statistic column of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statistic {
    Value,
    Avg,
    Max,
    Min,
    Sum,
}

impl Statistic {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "VALUE" => Some(Statistic::Value),
            "AVG" => Some(Statistic::Avg),
            "MAX" => Some(Statistic::Max),
            "MIN" => Some(Statistic::Min),
            "SUM" => Some(Statistic::Sum),
            _ => None,
        }
    }
}

/// One measurement record from a frame.
#[derive(Debug, Clone)]
pub struct Record {
    /// Quantity code, e.g. `WS`, `TA`, `SNH`.
    pub name: String,
    pub statistic: Statistic,
    /// ISO-8601 duration of the aggregation window, e.g. `PT2M`; empty for
    /// most instantaneous records.
    pub period: String,
    /// Sensor index column, verbatim (the station is not consistent here).
    pub sensor: String,
    pub unit: String,
    pub value: f64,
}

/// Extract the payload between the first `(` and the following `)`.
///
/// Returns `None` when the stream holds no complete frame.
pub fn extract_payload(stream: &str) -> Option<&str> {
    let start = stream.find('(')? + 1;
    let end = start + stream[start..].find(')')?;
    Some(&stream[start..end])
}

/// Parse a value column leniently.
///
/// The leading `:` is dropped, then everything from the first character
/// outside `0-9 . + -` onward is discarded. Unparseable input is NaN.
pub fn parse_value(raw: &str) -> f64 {
    let raw = raw.trim().trim_start_matches(':');
    let end = raw
        .find(|c: char| !c.is_ascii_digit() && c != '.' && c != '+' && c != '-')
        .unwrap_or(raw.len());
    raw[..end].parse().unwrap_or(f64::NAN)
}

/// Parse a frame payload into its measurement records.
pub fn parse_frame(payload: &str) -> Result<Vec<Record>, EmptyFrame> {
    let mut records = Vec::new();

    for entry in payload.split(';') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let columns: Vec<&str> = entry.split('|').collect();
        if columns.len() != 7 {
            // Header field (station id, date, position, ...).
            continue;
        }
        let statistic = match Statistic::parse(columns[1]) {
            Some(s) => s,
            None => {
                tracing::debug!(entry, "Skipping record with unknown statistic");
                continue;
            }
        };
        records.push(Record {
            name: columns[0].to_string(),
            statistic,
            period: columns[2].to_string(),
            sensor: columns[4].to_string(),
            unit: columns[5].to_string(),
            value: parse_value(columns[6]),
        });
    }

    if records.is_empty() {
        return Err(EmptyFrame {
            raw: payload.to_string(),
        });
    }
    Ok(records)
}

/// Mean of all records matching (name, statistic, period), ignoring NaN.
///
/// Multi-sensor stations report the same quantity once per sensor; the
/// published topic carries the average of the live sensors. `VALUE` records
/// match regardless of period (some stations stamp them, some do not).
/// NaN when no matching record has a finite value.
fn mean(records: &[Record], name: &str, statistic: Statistic, period: &str) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for record in records {
        if record.name != name || record.statistic != statistic {
            continue;
        }
        if statistic != Statistic::Value && record.period != period {
            continue;
        }
        if record.value.is_finite() {
            sum += record.value;
            count += 1;
        }
    }
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Build a full [`WeatherReport`] from the records of one frame.
///
/// Quantities absent from the frame stay NaN.
pub fn build_report(records: &[Record], acquired_at: Timestamp) -> WeatherReport {
    use Statistic::*;

    let v = |name: &str, statistic: Statistic, period: &str| mean(records, name, statistic, period);

    let mut report = WeatherReport::empty(acquired_at);

    report.weather.ambient_temp = v("TA", Avg, "PT1M");
    report.weather.humidity = v("RH", Avg, "PT1M");
    report.weather.pressure = v("PA", Avg, "PT1M");

    report.wind_direction.value = v("WD", Value, "");
    report.wind_direction.avg2_m = v("WD", Avg, "PT2M");
    report.wind_direction.max2_m = v("WD", Max, "PT2M");
    report.wind_direction.min2_m = v("WD", Min, "PT2M");
    report.wind_direction.avg10_m = v("WD", Avg, "PT10M");
    report.wind_direction.max10_m = v("WD", Max, "PT10M");

    report.wind_gust_direction.value10_m = v("WGD", Value, "");

    report.wind_speed.value = v("WS", Value, "");
    report.wind_speed.avg2_m = v("WS", Avg, "PT2M");
    report.wind_speed.max2_m = v("WS", Max, "PT2M");
    report.wind_speed.min2_m = v("WS", Min, "PT2M");
    report.wind_speed.avg10_m = v("WS", Avg, "PT10M");
    report.wind_speed.max10_m = v("WS", Max, "PT10M");

    report.air_temperature.avg1_m = v("TA", Avg, "PT1M");
    report.air_temperature.avg24_h = v("TA", Avg, "PT24H");
    report.air_temperature.max24_h = v("TA", Max, "PT24H");
    report.air_temperature.min24_h = v("TA", Min, "PT24H");

    report.relative_humidity.avg1_m = v("RH", Avg, "PT1M");
    report.relative_humidity.avg24_h = v("RH", Avg, "PT24H");
    report.relative_humidity.max24_h = v("RH", Max, "PT24H");
    report.relative_humidity.min24_h = v("RH", Min, "PT24H");

    report.dew_point.avg1_m = v("TD", Avg, "PT1M");

    report.snow_depth.avg1_m = v("SNH", Avg, "PT1M");
    report.snow_depth.avg24_h = v("SNH", Avg, "PT24H");
    report.snow_depth.max24_h = v("SNH", Max, "PT24H");
    report.snow_depth.min24_h = v("SNH", Min, "PT24H");

    report.solar_net_radiation.avg1_m = v("SRN", Avg, "PT1M");
    report.solar_net_radiation.avg24_h = v("SRN", Avg, "PT24H");
    report.solar_net_radiation.max24_h = v("SRN", Max, "PT24H");
    report.solar_net_radiation.min24_h = v("SRN", Min, "PT24H");

    report.air_pressure.pa_avg1_m = v("PA", Avg, "PT1M");
    report.air_pressure.patr_value3_h = v("PATR", Value, "");
    report.air_pressure.pate_value3_h = v("PATE", Value, "");

    report.precipitation.pr_sum1_m = v("PR", Sum, "PT1M");
    report.precipitation.pr_sum1_h = v("PR", Sum, "PT1H");
    report.precipitation.prf_sum1_m = v("PRF", Sum, "PT1M");

    report.soil_temperature.avg1_m = v("TS", Avg, "PT1M");
    report.soil_temperature.avg24_h = v("TS", Avg, "PT24H");
    report.soil_temperature.max24_h = v("TS", Max, "PT24H");
    report.soil_temperature.min24_h = v("TS", Min, "PT24H");

    report
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;

    use crate::sim::SAMPLE_STREAM;

    use super::*;

    #[test]
    fn extract_payload_strips_prefix_and_checksum() {
        let payload = extract_payload("SMS 0(A;B)D621\n").unwrap();
        assert_eq!(payload, "A;B");
    }

    #[test]
    fn extract_payload_incomplete_frame() {
        assert!(extract_payload("SMS 0(A;B").is_none());
        assert!(extract_payload("no frame here").is_none());
    }

    #[test]
    fn parse_value_lenient() {
        assert_eq!(parse_value(":301"), 301.0);
        assert_eq!(parse_value(":0.1"), 0.1);
        assert_eq!(parse_value(":-8"), -8.0);
        assert_eq!(parse_value(":12.5extra"), 12.5);
        assert!(parse_value(":").is_nan());
        assert!(parse_value("junk").is_nan());
    }

    #[test]
    fn parse_frame_skips_header_fields() {
        let payload = "S:AWS310_LSST;\nD:190204;\nWS|AVG|PT2M||1|mps|:0.1;\n";
        let records = parse_frame(payload).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "WS");
        assert_eq!(records[0].statistic, Statistic::Avg);
        assert_eq!(records[0].period, "PT2M");
        assert_eq!(records[0].unit, "mps");
        assert_eq!(records[0].value, 0.1);
    }

    #[test]
    fn frame_without_records_is_an_error() {
        let err = parse_frame("S:AWS310_LSST;\nD:190204").unwrap_err();
        assert!(err.raw.contains("AWS310_LSST"));
        assert_matches!(parse_frame(""), Err(EmptyFrame { .. }));
    }

    #[test]
    fn mean_averages_across_sensors_and_ignores_nan() {
        let payload = "TA|AVG|PT1M||1|degC|:22.2;TA|AVG|PT1M||2|degC|:22.1;\
                       TD|AVG|PT1M||1|degC|:bad;TD|AVG|PT1M||2|degC|:13.7;";
        let records = parse_frame(payload).unwrap();
        let report = build_report(&records, Utc::now());
        assert!((report.weather.ambient_temp - 22.15).abs() < 1e-9);
        // The unparseable sensor 1 reading drops out of the average.
        assert!((report.dew_point.avg1_m - 13.7).abs() < 1e-9);
    }

    #[test]
    fn full_sample_stream_builds_a_complete_report() {
        let payload = extract_payload(SAMPLE_STREAM).unwrap();
        let records = parse_frame(payload).unwrap();
        let report = build_report(&records, Utc::now());

        assert!((report.weather.ambient_temp - 22.15).abs() < 1e-9);
        assert!((report.weather.humidity - 59.0).abs() < 1e-9);
        assert!((report.weather.pressure - 1002.35).abs() < 1e-9);

        assert!((report.wind_direction.value - 219.5).abs() < 1e-9); // (301 + 138) / 2
        assert!((report.wind_gust_direction.value10_m - 93.0).abs() < 1e-9); // (186 + 0) / 2
        assert!((report.air_pressure.patr_value3_h - -0.8).abs() < 1e-9);
        assert!((report.precipitation.pr_sum1_h - 0.0).abs() < 1e-9);
        assert!((report.snow_depth.min24_h - 11873.7).abs() < 1e-9);
        assert!((report.soil_temperature.avg24_h - 22.3).abs() < 1e-9);
    }

    #[test]
    fn missing_quantities_stay_nan() {
        let records = parse_frame("WS|AVG|PT2M||1|mps|:0.1;").unwrap();
        let report = build_report(&records, Utc::now());
        assert!(report.snow_depth.avg1_m.is_nan());
        assert!(report.weather.pressure.is_nan());
        assert!((report.wind_speed.avg2_m - 0.1).abs() < 1e-9);
    }
}

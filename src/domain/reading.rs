// Sensor reading domain model and series identity
use std::fmt;

/// A single sensor observation as delivered by a data source.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub origin: String,
    pub sensor_id: i64,
    pub value: f64,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
}

impl Reading {
    pub fn new(origin: impl Into<String>, sensor_id: i64, value: f64, timestamp: i64) -> Self {
        Self {
            origin: origin.into(),
            sensor_id,
            value,
            timestamp,
        }
    }
}

/// Stable identity of a series: `"<origin>:<sensor_id>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeriesKey(String);

impl SeriesKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the series key for a reading.
///
/// The sensor id is always the text after the last `:`, so distinct
/// (origin, sensor_id) pairs never collide even if the origin contains `:`.
pub fn resolve(reading: &Reading) -> SeriesKey {
    SeriesKey(format!("{}:{}", reading.origin, reading.sensor_id))
}

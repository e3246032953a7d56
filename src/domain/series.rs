// Series domain models
use super::classification::Category;
use super::reading::{Reading, SeriesKey};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub timestamp: i64,
    pub value: f64,
    pub category: Option<Category>,
}

impl Point {
    pub fn new(timestamp: i64, value: f64, category: Option<Category>) -> Self {
        Self {
            timestamp,
            value,
            category,
        }
    }

    pub fn from_reading(reading: &Reading, category: Option<Category>) -> Self {
        Self::new(reading.timestamp, reading.value, category)
    }

    /// Timestamp as UTC wall-clock time, if representable.
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}

/// Points for one origin/sensor pair, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub key: SeriesKey,
    pub label: String,
    pub points: Vec<Point>,
}

impl Series {
    /// A series always starts with the point that created it.
    pub fn new(key: SeriesKey, first: Point) -> Self {
        let label = key.to_string();
        Self {
            key,
            label,
            points: vec![first],
        }
    }

    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }
}

/// Read-only copy of a store's series, in creation order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeriesSnapshot {
    pub series: Vec<Series>,
}

impl SeriesSnapshot {
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }

    pub fn find(&self, label: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.label == label)
    }
}

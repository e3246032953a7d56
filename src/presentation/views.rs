// JSON views of feed snapshots served by the read API
use crate::domain::series::{Point, Series};
use crate::presentation::snapshot_board::BoardEntry;
use serde::Serialize;

/// Color of points that carry no category.
pub const DEFAULT_SERIES_COLOR: &str = "rgba(88, 166, 245, 0.2)";

#[derive(Debug, Serialize)]
pub struct FeedSummary {
    pub name: String,
    pub series: usize,
    pub points: usize,
    pub updated_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SnapshotView {
    pub feed: String,
    pub updated_at: Option<String>,
    pub series: Vec<SeriesView>,
}

#[derive(Debug, Serialize)]
pub struct SeriesView {
    pub key: String,
    pub label: String,
    pub color: String,
    pub points: Vec<PointView>,
}

#[derive(Debug, Serialize)]
pub struct PointView {
    pub timestamp: i64,
    pub time: Option<String>,
    pub value: f64,
    pub category: Option<String>,
    pub color: String,
}

pub fn summarize(name: String, entry: &BoardEntry) -> FeedSummary {
    FeedSummary {
        name,
        series: entry.snapshot.series.len(),
        points: entry.snapshot.point_count(),
        updated_at: entry.updated_at.map(|t| t.to_rfc3339()),
    }
}

pub fn snapshot_to_view(feed: String, entry: BoardEntry) -> SnapshotView {
    SnapshotView {
        feed,
        updated_at: entry.updated_at.map(|t| t.to_rfc3339()),
        series: entry.snapshot.series.into_iter().map(series_to_view).collect(),
    }
}

fn series_to_view(series: Series) -> SeriesView {
    SeriesView {
        key: series.key.as_str().to_string(),
        label: series.label,
        color: DEFAULT_SERIES_COLOR.to_string(),
        points: series.points.into_iter().map(point_to_view).collect(),
    }
}

fn point_to_view(point: Point) -> PointView {
    let time = point.time().map(|t| t.to_rfc3339());
    let (category, color) = match point.category {
        Some(category) => (Some(category.name), category.color),
        None => (None, DEFAULT_SERIES_COLOR.to_string()),
    };

    PointView {
        timestamp: point.timestamp,
        time,
        value: point.value,
        category,
        color,
    }
}

// HTTP request handlers
use crate::presentation::app_state::AppState;
use crate::presentation::views::{snapshot_to_view, summarize, FeedSummary, SnapshotView};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List all feeds with their current series and point counts
pub async fn list_feeds(State(state): State<Arc<AppState>>) -> Json<Vec<FeedSummary>> {
    let summaries = state
        .board
        .entries()
        .into_iter()
        .map(|(name, entry)| summarize(name, &entry))
        .collect();
    Json(summaries)
}

/// Latest snapshot of one feed
pub async fn feed_snapshot(
    Path(name): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<SnapshotView>, StatusCode> {
    match state.board.get(&name) {
        Some(entry) => Ok(Json(snapshot_to_view(name, entry))),
        None => {
            tracing::debug!("Snapshot requested for unknown feed {}", name);
            Err(StatusCode::NOT_FOUND)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::renderer::Renderer;
    use crate::application::series_store::SeriesStore;
    use crate::domain::classification::RuleSet;
    use crate::domain::reading::Reading;
    use crate::presentation::snapshot_board::SnapshotBoard;
    use crate::presentation::views::DEFAULT_SERIES_COLOR;

    fn state() -> State<Arc<AppState>> {
        let board =
            SnapshotBoard::with_feeds(vec!["humidity".to_string(), "temperatures".to_string()]);

        let mut store = SeriesStore::new();
        let rules = RuleSet::temperature();
        let mut working = store.begin_snapshot_replace();
        working.extend(
            &[
                Reading::new("kitchen", 1, 12.0, 1_600_000_000),
                Reading::new("attic", 2, 36.5, 1_600_000_000),
            ],
            Some(&rules),
        );
        store.commit_snapshot_replace(working);
        board.update("temperatures", store.snapshot());

        State(Arc::new(AppState {
            board: Arc::new(board),
        }))
    }

    #[tokio::test]
    async fn test_health_check() {
        assert_eq!(health_check().await, "ok");
    }

    #[tokio::test]
    async fn test_list_feeds() {
        let Json(feeds) = list_feeds(state()).await;

        assert_eq!(feeds.len(), 2);
        assert_eq!(feeds[0].name, "humidity");
        assert_eq!(feeds[0].series, 0);
        assert!(feeds[0].updated_at.is_none());
        assert_eq!(feeds[1].name, "temperatures");
        assert_eq!(feeds[1].series, 2);
        assert_eq!(feeds[1].points, 2);
        assert!(feeds[1].updated_at.is_some());
    }

    #[tokio::test]
    async fn test_feed_snapshot() {
        let Json(view) = feed_snapshot(Path("temperatures".to_string()), state())
            .await
            .unwrap();

        assert_eq!(view.feed, "temperatures");
        assert_eq!(view.series.len(), 2);

        let kitchen = &view.series[0];
        assert_eq!(kitchen.label, "kitchen:1");
        assert_eq!(kitchen.color, DEFAULT_SERIES_COLOR);
        assert_eq!(kitchen.points[0].category.as_deref(), Some("cold"));
        assert_eq!(kitchen.points[0].color, "rgba(88, 166, 245, 0.2)");
        assert_eq!(kitchen.points[0].time.as_deref(), Some("2020-09-13T12:26:40+00:00"));

        let attic = &view.series[1];
        assert_eq!(attic.points[0].category.as_deref(), Some("critical"));
        assert_eq!(attic.points[0].color, "rgba(245, 15, 15, 0.2)");

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["series"][1]["points"][0]["value"], 36.5);
    }

    #[tokio::test]
    async fn test_unclassified_points_use_series_color() {
        let state = state();
        let mut store = SeriesStore::new();
        store.append_merge(&[Reading::new("kitchen", 1, 55.0, 1)], None);
        state.0.board.update("humidity", store.snapshot());

        let Json(view) = feed_snapshot(Path("humidity".to_string()), state).await.unwrap();
        assert!(view.series[0].points[0].category.is_none());
        assert_eq!(view.series[0].points[0].color, DEFAULT_SERIES_COLOR);
    }

    #[tokio::test]
    async fn test_unknown_feed_is_not_found() {
        let result = feed_snapshot(Path("pressure".to_string()), state()).await;
        assert_eq!(result.unwrap_err(), StatusCode::NOT_FOUND);
    }
}

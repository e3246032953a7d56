// Application state for HTTP handlers
use crate::presentation::snapshot_board::SnapshotBoard;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub board: Arc<SnapshotBoard>,
}

// Renderer trait - Receives series snapshots after each refresh
use crate::domain::series::SeriesSnapshot;

pub trait Renderer: Send + Sync {
    /// Push the latest snapshot of a feed. Never read back by the core.
    fn update(&self, feed: &str, snapshot: SeriesSnapshot);
}

// Renderer that keeps the latest snapshot of every feed for the read API
use crate::application::renderer::Renderer;
use crate::domain::series::SeriesSnapshot;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Clone, Default)]
pub struct BoardEntry {
    pub snapshot: SeriesSnapshot,
    /// `None` until the feed completes its first successful cycle.
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
pub struct SnapshotBoard {
    feeds: RwLock<BTreeMap<String, BoardEntry>>,
}

impl SnapshotBoard {
    /// Board with empty entries for feeds that have not refreshed yet.
    pub fn with_feeds(names: impl IntoIterator<Item = String>) -> Self {
        let feeds = names
            .into_iter()
            .map(|name| (name, BoardEntry::default()))
            .collect();
        Self {
            feeds: RwLock::new(feeds),
        }
    }

    pub fn get(&self, feed: &str) -> Option<BoardEntry> {
        self.feeds
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(feed)
            .cloned()
    }

    /// All feeds, ordered by name.
    pub fn entries(&self) -> Vec<(String, BoardEntry)> {
        self.feeds
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, entry)| (name.clone(), entry.clone()))
            .collect()
    }
}

impl Renderer for SnapshotBoard {
    fn update(&self, feed: &str, snapshot: SeriesSnapshot) {
        let entry = BoardEntry {
            snapshot,
            updated_at: Some(Utc::now()),
        };
        self.feeds
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(feed.to_string(), entry);
    }
}

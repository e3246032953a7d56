// Data source trait for fetching sensor readings
use crate::domain::reading::Reading;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// What a feed asks the sensor API for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    pub endpoint: String,
    /// Maximum number of readings returned.
    pub limit: Option<u32>,
    /// Only the latest N readings per sensor.
    pub latest: Option<u32>,
    /// Ask for human-readable origin labels instead of node ids.
    pub named: bool,
}

impl FeedQuery {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            limit: None,
            latest: None,
            named: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to sensor API failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("sensor API returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode sensor API response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetch validated readings for a feed.
    async fn fetch(&self, query: &FeedQuery) -> Result<Vec<Reading>, FetchError>;
}

// Polling scheduler - Drives periodic fetch-and-refresh cycles per feed
use crate::application::data_source::{DataSource, FeedQuery, FetchError};
use crate::application::renderer::Renderer;
use crate::application::series_store::SeriesStore;
use crate::domain::classification::RuleSet;
use crate::domain::reading::Reading;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// How a feed's fetched readings are merged into its store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshDiscipline {
    /// Rebuild the whole series set every cycle (bar charts).
    Replace,
    /// Only ever add points (scatter charts).
    Append,
}

#[derive(Debug, Error)]
#[error("unknown refresh discipline '{0}', expected 'replace' or 'append'")]
pub struct UnknownDiscipline(String);

impl FromStr for RefreshDiscipline {
    type Err = UnknownDiscipline;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "replace" => Ok(Self::Replace),
            "append" => Ok(Self::Append),
            other => Err(UnknownDiscipline(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Feed {
    pub name: String,
    pub query: FeedQuery,
    pub discipline: RefreshDiscipline,
    pub interval: Duration,
    /// Upper bound on a single fetch; defaults to the interval.
    pub fetch_timeout: Option<Duration>,
    /// Classify points with these rules; `None` leaves them uncategorized.
    pub rules: Option<RuleSet>,
}

impl Feed {
    pub fn new(name: impl Into<String>, query: FeedQuery, discipline: RefreshDiscipline) -> Self {
        Self {
            name: name.into(),
            query,
            discipline,
            interval: DEFAULT_POLL_INTERVAL,
            fetch_timeout: None,
            rules: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = Some(rules);
        self
    }

    fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout.unwrap_or(self.interval)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeedHandle(u64);

struct FeedTask {
    name: String,
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

/// Runs every registered feed in its own task.
///
/// Each task owns the feed's `SeriesStore`, so stores are never shared
/// between feeds and no locking is needed around them.
pub struct PollingScheduler {
    source: Arc<dyn DataSource>,
    renderer: Arc<dyn Renderer>,
    root: CancellationToken,
    tasks: HashMap<FeedHandle, FeedTask>,
    next_id: u64,
}

impl PollingScheduler {
    pub fn new(source: Arc<dyn DataSource>, renderer: Arc<dyn Renderer>) -> Self {
        Self {
            source,
            renderer,
            root: CancellationToken::new(),
            tasks: HashMap::new(),
            next_id: 0,
        }
    }

    /// Start polling a feed. The first cycle runs immediately.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn register_feed(&mut self, feed: Feed) -> FeedHandle {
        let handle = FeedHandle(self.next_id);
        self.next_id += 1;

        let cancel = self.root.child_token();
        let name = feed.name.clone();

        tracing::info!(
            feed = %name,
            discipline = ?feed.discipline,
            interval = ?feed.interval,
            classified = feed.rules.is_some(),
            "Registering feed"
        );

        let worker = FeedWorker {
            feed,
            store: SeriesStore::new(),
            source: self.source.clone(),
            renderer: self.renderer.clone(),
            cancel: cancel.clone(),
        };
        let join = tokio::spawn(worker.run());

        self.tasks.insert(handle, FeedTask { name, cancel, join });
        handle
    }

    /// Stop future cycles of a feed. Returns false for an unknown handle.
    ///
    /// A fetch already in flight is allowed to finish, but its result is
    /// discarded.
    pub fn cancel(&mut self, handle: &FeedHandle) -> bool {
        match self.tasks.remove(handle) {
            Some(task) => {
                tracing::info!(feed = %task.name, "Cancelling feed");
                task.cancel.cancel();
                true
            }
            None => false,
        }
    }

    pub fn feed_count(&self) -> usize {
        self.tasks.len()
    }

    /// Cancel every feed and wait for their tasks to finish.
    pub async fn shutdown(mut self) {
        self.root.cancel();
        let joins = self.tasks.drain().map(|(_, task)| task.join);
        for result in futures::future::join_all(joins).await {
            if let Err(e) = result {
                tracing::error!("Feed task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for PollingScheduler {
    fn drop(&mut self) {
        self.root.cancel();
    }
}

struct FeedWorker {
    feed: Feed,
    store: SeriesStore,
    source: Arc<dyn DataSource>,
    renderer: Arc<dyn Renderer>,
    cancel: CancellationToken,
}

impl FeedWorker {
    async fn run(mut self) {
        let interval = self.feed.interval.max(MIN_POLL_INTERVAL);
        let start = Instant::now();
        let mut deadline = start;

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = time::sleep_until(deadline) => {}
            }

            self.cycle().await;

            // Ticks that passed while the cycle was running are skipped.
            deadline = next_deadline(start, interval, deadline, Instant::now());
        }

        tracing::debug!(feed = %self.feed.name, "Feed stopped");
    }

    async fn cycle(&mut self) {
        let timeout = self.feed.fetch_timeout();
        let result = match time::timeout(timeout, self.source.fetch(&self.feed.query)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(timeout)),
        };

        if self.cancel.is_cancelled() {
            tracing::debug!(
                feed = %self.feed.name,
                "Discarding fetch completed after cancellation"
            );
            return;
        }

        match result {
            Ok(readings) => self.apply(&readings),
            Err(e) => {
                tracing::warn!(
                    feed = %self.feed.name,
                    "Fetch failed, keeping previous series: {}",
                    e
                );
            }
        }
    }

    fn apply(&mut self, readings: &[Reading]) {
        let rules = self.feed.rules.as_ref();

        match self.feed.discipline {
            RefreshDiscipline::Replace => {
                let mut working = self.store.begin_snapshot_replace();
                working.extend(readings, rules);
                tracing::debug!(
                    feed = %self.feed.name,
                    "Replacing series set with {} series from {} readings",
                    working.len(),
                    readings.len()
                );
                self.store.commit_snapshot_replace(working);
            }
            RefreshDiscipline::Append => {
                self.store.append_merge(readings, rules);
                tracing::debug!(
                    feed = %self.feed.name,
                    "Appended {} readings, store holds {} series",
                    readings.len(),
                    self.store.len()
                );
            }
        }

        self.renderer.update(&self.feed.name, self.store.snapshot());
    }
}

/// Next tick on the grid `start + k * interval` after a cycle that began at
/// `previous`. A cycle that ends exactly on the following tick still runs it;
/// ticks that passed while the cycle was running are skipped.
fn next_deadline(
    start: Instant,
    interval: Duration,
    previous: Instant,
    now: Instant,
) -> Instant {
    let period = interval.as_nanos();
    let elapsed = now.saturating_duration_since(start).as_nanos();
    let periods = elapsed.div_ceil(period);
    let on_grid = start + Duration::from_nanos((periods * period) as u64);
    on_grid.max(previous + interval)
}

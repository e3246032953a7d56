use crate::application::data_source::FeedQuery;
use crate::application::polling_scheduler::{Feed, RefreshDiscipline, UnknownDiscipline};
use crate::domain::classification::RuleSet;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    #[serde(default)]
    pub server: ServerSettings,
    pub sensor_api: SensorApiSettings,
    #[serde(default)]
    pub feeds: Vec<FeedConfig>,
    #[serde(default)]
    pub rule_sets: HashMap<String, RuleSet>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SensorApiSettings {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    pub name: String,
    pub endpoint: String,
    pub discipline: String,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    pub fetch_timeout_secs: Option<u64>,
    pub limit: Option<u32>,
    pub latest: Option<u32>,
    #[serde(default = "default_named")]
    pub named: bool,
    /// Name of the rule set used to classify this feed's values.
    pub rules: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("feed '{0}' is declared more than once")]
    DuplicateFeed(String),
    #[error("feed '{feed}': {source}")]
    Discipline {
        feed: String,
        source: UnknownDiscipline,
    },
    #[error("feed '{feed}' references unknown rule set '{rules}'")]
    UnknownRuleSet { feed: String, rules: String },
    #[error("feed '{0}' must have a non-zero interval")]
    ZeroInterval(String),
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_interval_secs() -> u64 {
    10
}

fn default_named() -> bool {
    true
}

impl DashboardConfig {
    /// Look up a rule set; `temperature` is built in unless overridden.
    pub fn rule_set(&self, name: &str) -> Option<RuleSet> {
        self.rule_sets
            .get(name)
            .cloned()
            .or_else(|| (name == "temperature").then(RuleSet::temperature))
    }

    pub fn build_feeds(&self) -> Result<Vec<Feed>, ConfigError> {
        let mut seen = HashSet::new();
        self.feeds
            .iter()
            .map(|feed| {
                if !seen.insert(feed.name.as_str()) {
                    return Err(ConfigError::DuplicateFeed(feed.name.clone()));
                }
                feed.to_feed(self)
            })
            .collect()
    }
}

impl FeedConfig {
    pub fn to_feed(&self, config: &DashboardConfig) -> Result<Feed, ConfigError> {
        if self.interval_secs == 0 {
            return Err(ConfigError::ZeroInterval(self.name.clone()));
        }

        let discipline: RefreshDiscipline =
            self.discipline.parse().map_err(|source| ConfigError::Discipline {
                feed: self.name.clone(),
                source,
            })?;

        let mut query = FeedQuery::new(self.endpoint.clone());
        query.limit = self.limit;
        query.latest = self.latest;
        query.named = self.named;

        let mut feed = Feed::new(self.name.clone(), query, discipline)
            .with_interval(Duration::from_secs(self.interval_secs));

        if let Some(secs) = self.fetch_timeout_secs {
            feed = feed.with_fetch_timeout(Duration::from_secs(secs));
        }

        if let Some(name) = &self.rules {
            let rules = config.rule_set(name).ok_or_else(|| ConfigError::UnknownRuleSet {
                feed: self.name.clone(),
                rules: name.clone(),
            })?;
            feed = feed.with_rules(rules);
        }

        Ok(feed)
    }
}

pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard"))
        .add_source(config::Environment::with_prefix("DASHBOARD").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

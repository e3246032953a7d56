// Series store - Owns the series of a single feed
use crate::domain::classification::{classify, Category, RuleSet};
use crate::domain::reading::{resolve, Reading, SeriesKey};
use crate::domain::series::{Point, Series, SeriesSnapshot};
use std::collections::HashMap;

/// Keyed series collection that remembers creation order.
#[derive(Debug, Clone, Default, PartialEq)]
struct SeriesSet {
    index: HashMap<SeriesKey, usize>,
    series: Vec<Series>,
}

impl SeriesSet {
    fn push(&mut self, reading: &Reading, category: Option<Category>) {
        let key = resolve(reading);
        let point = Point::from_reading(reading, category);

        match self.index.get(&key) {
            Some(&idx) => self.series[idx].push(point),
            None => {
                self.index.insert(key.clone(), self.series.len());
                self.series.push(Series::new(key, point));
            }
        }
    }
}

/// Series accumulated for the next snapshot-replace commit.
#[derive(Debug, Default)]
pub struct WorkingSet {
    set: SeriesSet,
}

impl WorkingSet {
    pub fn push(&mut self, reading: &Reading, category: Option<Category>) {
        self.set.push(reading, category);
    }

    /// Push every reading, classifying values when a rule set is given.
    pub fn extend(&mut self, readings: &[Reading], rules: Option<&RuleSet>) {
        for reading in readings {
            self.push(reading, category_for(reading, rules));
        }
    }

    pub fn len(&self) -> usize {
        self.set.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.series.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct SeriesStore {
    set: SeriesSet,
}

impl SeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_snapshot_replace(&self) -> WorkingSet {
        WorkingSet::default()
    }

    /// Make the working set the entire visible state of the store.
    pub fn commit_snapshot_replace(&mut self, working: WorkingSet) {
        self.set = working.set;
    }

    /// Append each reading to its series, creating series on first sight.
    pub fn append_merge(&mut self, readings: &[Reading], rules: Option<&RuleSet>) {
        for reading in readings {
            self.set.push(reading, category_for(reading, rules));
        }
    }

    pub fn snapshot(&self) -> SeriesSnapshot {
        SeriesSnapshot {
            series: self.set.series.clone(),
        }
    }

    pub fn get(&self, key: &SeriesKey) -> Option<&Series> {
        self.set.index.get(key).map(|&idx| &self.set.series[idx])
    }

    pub fn len(&self) -> usize {
        self.set.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.series.is_empty()
    }
}

fn category_for(reading: &Reading, rules: Option<&RuleSet>) -> Option<Category> {
    rules.map(|rules| classify(reading.value, rules).clone())
}

//! Core data types for metric analysis
//!
//! - `Entry`: one journal entry (a date plus named numeric scores)
//! - `MetricSeries`: one metric's values in entry order, each traceable to
//!   the entry it came from

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of a tracked metric (e.g. "mood", "sleep_hours")
pub type MetricName = String;

/// A single journal entry
///
/// The date is kept as the caller supplied it; it is parsed once when the
/// series store is built so that a bad date only affects date-bearing results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// ISO-8601 date or date-time string
    pub date: String,
    /// Metric scores recorded in this entry
    #[serde(default)]
    pub metrics: BTreeMap<MetricName, f64>,
}

impl Entry {
    /// Create an entry with no metrics
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            metrics: BTreeMap::new(),
        }
    }

    /// Builder method: record a metric value
    pub fn metric(mut self, name: impl Into<MetricName>, value: f64) -> Self {
        self.metrics.insert(name.into(), value);
        self
    }

    /// Builder method: record several metric values
    pub fn metrics<I, K>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<MetricName>,
    {
        self.metrics
            .extend(values.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }

    /// Get a metric value if present
    pub fn get(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }
}

/// Values of one metric in entry order
///
/// `values[k]` was recorded by entry `source_entry_index[k]`. Indices are
/// strictly increasing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSeries {
    pub name: MetricName,
    pub values: Vec<f64>,
    pub source_entry_index: Vec<usize>,
}

impl MetricSeries {
    pub(crate) fn new(name: impl Into<MetricName>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
            source_entry_index: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, entry_index: usize, value: f64) {
        debug_assert!(self
            .source_entry_index
            .last()
            .map_or(true, |&last| last < entry_index));
        self.values.push(value);
        self.source_entry_index.push(entry_index);
    }

    /// Number of recorded values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate `(entry_index, value)` pairs
    pub fn points(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.source_entry_index
            .iter()
            .copied()
            .zip(self.values.iter().copied())
    }
}

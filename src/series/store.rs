//! Metric Series Store
//!
//! Turns an ordered list of entries into one aligned series per metric.
//! Built fresh for every analysis request and read-only afterward.

use super::dates::parse_entry_date;
use super::types::{Entry, MetricName, MetricSeries};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{btree_map, BTreeMap, BTreeSet};

/// Counters for input problems that were recovered from by omission
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DataQuality {
    /// Entries whose date string could not be parsed
    pub unparsable_dates: usize,
    /// Metric values dropped because they were NaN or infinite
    pub skipped_values: usize,
}

/// Per-metric series plus per-entry dates
#[derive(Debug, Clone, Default)]
pub struct MetricSeriesStore {
    series: BTreeMap<MetricName, MetricSeries>,
    dates: Vec<Option<NaiveDate>>,
    quality: DataQuality,
}

impl MetricSeriesStore {
    /// Build series from entries in the order given
    pub fn build(entries: &[Entry]) -> Self {
        let mut series: BTreeMap<MetricName, MetricSeries> = BTreeMap::new();
        let mut dates = Vec::with_capacity(entries.len());
        let mut quality = DataQuality::default();

        for (index, entry) in entries.iter().enumerate() {
            let date = parse_entry_date(&entry.date);
            if date.is_none() {
                quality.unparsable_dates += 1;
                tracing::warn!(
                    entry_index = index,
                    date = %entry.date,
                    "Unparsable entry date"
                );
            }
            dates.push(date);

            for (name, &value) in &entry.metrics {
                if !value.is_finite() {
                    quality.skipped_values += 1;
                    continue;
                }
                series
                    .entry(name.clone())
                    .or_insert_with(|| MetricSeries::new(name.clone()))
                    .push(index, value);
            }
        }

        tracing::debug!(
            entries = entries.len(),
            metrics = series.len(),
            unparsable_dates = quality.unparsable_dates,
            skipped_values = quality.skipped_values,
            "Built metric series"
        );

        Self {
            series,
            dates,
            quality,
        }
    }

    /// Get one metric's series
    pub fn series(&self, name: &str) -> Option<&MetricSeries> {
        self.series.get(name)
    }

    /// Metric names in sorted order
    pub fn metric_names(&self) -> Vec<&str> {
        self.series.keys().map(String::as_str).collect()
    }

    /// Iterate all series in metric-name order
    pub fn iter(&self) -> btree_map::Values<'_, MetricName, MetricSeries> {
        self.series.values()
    }

    /// Number of metrics with at least one value
    pub fn metric_count(&self) -> usize {
        self.series.len()
    }

    /// Number of entries the store was built from
    pub fn entry_count(&self) -> usize {
        self.dates.len()
    }

    /// Check if built from no entries
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Parsed date of an entry, if it parsed
    pub fn date_of(&self, entry_index: usize) -> Option<NaiveDate> {
        self.dates.get(entry_index).copied().flatten()
    }

    /// Display label for an entry: its ISO date, or a positional fallback
    pub fn date_label(&self, entry_index: usize) -> String {
        match self.date_of(entry_index) {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => format!("entry #{}", entry_index),
        }
    }

    /// Parsed dates in entry order
    pub fn dates(&self) -> &[Option<NaiveDate>] {
        &self.dates
    }

    /// Distinct parsed dates in ascending order
    pub fn distinct_dates(&self) -> BTreeSet<NaiveDate> {
        self.dates.iter().flatten().copied().collect()
    }

    /// Earliest and latest parsed entry date
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut parsed = self.dates.iter().flatten();
        let first = *parsed.next()?;
        Some(parsed.fold((first, first), |(lo, hi), &d| (lo.min(d), hi.max(d))))
    }

    /// Input problems recovered from while building
    pub fn data_quality(&self) -> DataQuality {
        self.quality
    }

    /// The metric with the most values; ties go to the first name
    pub fn most_recorded_metric(&self) -> Option<&str> {
        self.series
            .values()
            .fold(None::<&MetricSeries>, |best, s| match best {
                Some(b) if b.len() >= s.len() => Some(b),
                _ => Some(s),
            })
            .map(|s| s.name.as_str())
    }
}

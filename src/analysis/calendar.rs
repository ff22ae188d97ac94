//! Calendar Aggregator
//!
//! Averages one metric per calendar date and normalizes the daily averages
//! to [0, 1] intensities for heatmap display.

use crate::series::{MetricName, MetricSeriesStore};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// One calendar day for one metric
///
/// `average` and `intensity` are `None` on days that have entries but no
/// value for the metric, which is distinct from a recorded zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarBin {
    pub date: NaiveDate,
    /// Values recorded on this date
    pub count: usize,
    pub average: Option<f64>,
    pub intensity: Option<f64>,
}

impl CalendarBin {
    /// Check if the metric was recorded on this date
    pub fn has_data(&self) -> bool {
        self.average.is_some()
    }
}

/// Date-ordered bins for one metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarHeatmap {
    pub metric: MetricName,
    pub bins: Vec<CalendarBin>,
    pub min_average: Option<f64>,
    pub max_average: Option<f64>,
    /// Values left out because their entry date did not parse
    pub dropped_dates: usize,
}

impl CalendarHeatmap {
    /// Bins that carry a value
    pub fn data_bins(&self) -> impl Iterator<Item = &CalendarBin> {
        self.bins.iter().filter(|b| b.has_data())
    }
}

/// Build calendar bins for one metric
///
/// Every parsed entry date gets a bin. Intensity is
/// `(avg − min) / (max − min)` over the data bins, and 0 everywhere when all
/// averages are equal.
pub fn calendar_bins(store: &MetricSeriesStore, metric: &str) -> CalendarHeatmap {
    let mut sums: BTreeMap<NaiveDate, (f64, usize)> = store
        .distinct_dates()
        .into_iter()
        .map(|d| (d, (0.0, 0)))
        .collect();
    let mut dropped_dates = 0;

    if let Some(series) = store.series(metric) {
        for (entry_index, value) in series.points() {
            match store.date_of(entry_index) {
                Some(date) => {
                    let slot = sums.entry(date).or_insert((0.0, 0));
                    slot.0 += value;
                    slot.1 += 1;
                }
                None => {
                    dropped_dates += 1;
                    tracing::warn!(
                        metric,
                        entry_index,
                        "Dropping value with unparsable date from calendar"
                    );
                }
            }
        }
    }

    let averages: Vec<(NaiveDate, usize, Option<f64>)> = sums
        .into_iter()
        .map(|(date, (sum, count))| {
            let average = (count > 0).then(|| sum / count as f64);
            (date, count, average)
        })
        .collect();

    let min_average = averages
        .iter()
        .filter_map(|(_, _, a)| *a)
        .reduce(f64::min);
    let max_average = averages
        .iter()
        .filter_map(|(_, _, a)| *a)
        .reduce(f64::max);

    let bins = averages
        .into_iter()
        .map(|(date, count, average)| {
            let intensity = average.map(|avg| match (min_average, max_average) {
                (Some(lo), Some(hi)) if hi > lo => (avg - lo) / (hi - lo),
                _ => 0.0,
            });
            CalendarBin {
                date,
                count,
                average,
                intensity,
            }
        })
        .collect();

    CalendarHeatmap {
        metric: metric.to_string(),
        bins,
        min_average,
        max_average,
        dropped_dates,
    }
}

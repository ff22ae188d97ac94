//! Report types
//!
//! Every collection is always present, possibly empty, so renderers never
//! have to check for missing sections.

use crate::analysis::{
    BoxPlotStats, CalendarBin, ConsistencyScore, CorrelationResult, DensityCurve, Outlier,
    TrendResult, WeeklyPattern,
};
use crate::series::{DataQuality, MetricName};
use chrono::NaiveDate;
use serde::Serialize;

/// Inclusive span of parsed entry dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Whole days between start and end
    pub fn days_span(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Human-readable form, e.g. "Jan 1, 2024 – Jan 31, 2024"
    ///
    /// A single-day range renders as just that date.
    pub fn label(&self) -> String {
        const FORMAT: &str = "%b %-d, %Y";
        if self.start == self.end {
            self.start.format(FORMAT).to_string()
        } else {
            format!(
                "{} – {}",
                self.start.format(FORMAT),
                self.end.format(FORMAT)
            )
        }
    }
}

/// Scalar summary of the whole entry set
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Overview {
    pub total_entries: usize,
    pub metric_count: usize,
    pub date_range: Option<DateRange>,
    pub date_range_label: Option<String>,
    /// `entries / max(days_span / 7, 1)`
    pub average_entries_per_week: f64,
    pub most_consistent_metric: Option<ConsistencyScore>,
}

/// Recurring-shape findings
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatternFindings {
    /// Metrics with weekly variation only
    pub weekly: Vec<WeeklyPattern>,
    /// Every scoreable metric, in metric-name order
    pub consistency: Vec<ConsistencyScore>,
}

impl PatternFindings {
    pub fn is_empty(&self) -> bool {
        self.weekly.is_empty() && self.consistency.is_empty()
    }
}

/// Everything derived from one entry set
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InsightsReport {
    pub overview: Overview,
    pub trends: Vec<TrendResult>,
    /// Strongest first, capped
    pub outliers: Vec<Outlier>,
    /// Outliers flagged before the cap
    pub total_outliers: usize,
    /// Moderate or stronger, strongest first
    pub correlations: Vec<CorrelationResult>,
    pub densities: Vec<DensityCurve>,
    pub distributions: Vec<BoxPlotStats>,
    pub calendar_metric: Option<MetricName>,
    pub calendar_bins: Vec<CalendarBin>,
    pub patterns: PatternFindings,
    pub data_quality: DataQuality,
}

impl InsightsReport {
    /// Serialize as pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

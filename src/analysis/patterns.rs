//! Pattern Detector
//!
//! Weekly-variation findings and per-metric consistency scores.

use crate::analysis::stats::{coefficient_of_variation, mean, population_std_dev};
use crate::config::PatternConfig;
use crate::series::{MetricName, MetricSeries, MetricSeriesStore};
use serde::Serialize;

const DAYS_PER_WEEK: usize = 7;

/// Week-over-week and day-of-week variation in one metric
///
/// Weeks are consecutive runs of seven values in entry order; a trailing
/// partial week is ignored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyPattern {
    pub metric: MetricName,
    /// Number of complete weeks analyzed
    pub weeks: usize,
    pub week_means: Vec<f64>,
    pub week_to_week_cv: f64,
    /// Mean of each position within the week, across all complete weeks
    pub weekday_means: Vec<f64>,
    pub weekday_cv: f64,
    /// The larger of the two CVs
    pub cv: f64,
    pub has_variation: bool,
    pub description: String,
}

/// How steady a metric is, from its coefficient of variation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsistencyScore {
    pub metric: MetricName,
    pub mean: f64,
    pub std_dev: f64,
    pub cv: f64,
    /// `max(0, 1 − cv)`, 1 for a perfectly flat series
    pub score: f64,
}

fn cv_or_zero(values: &[f64]) -> f64 {
    coefficient_of_variation(values).unwrap_or(0.0)
}

/// Analyze weekly variation, `None` below `min_weekly_points` values
pub fn weekly_pattern(series: &MetricSeries, config: &PatternConfig) -> Option<WeeklyPattern> {
    if series.len() < config.min_weekly_points.max(DAYS_PER_WEEK) {
        return None;
    }

    let weeks: Vec<&[f64]> = series.values.chunks_exact(DAYS_PER_WEEK).collect();
    let week_means: Vec<f64> = weeks.iter().filter_map(|week| mean(week)).collect();

    let weekday_means: Vec<f64> = (0..DAYS_PER_WEEK)
        .map(|day| weeks.iter().map(|week| week[day]).sum::<f64>() / weeks.len() as f64)
        .collect();

    let week_to_week_cv = cv_or_zero(&week_means);
    let weekday_cv = cv_or_zero(&weekday_means);
    let cv = week_to_week_cv.max(weekday_cv);
    let has_variation = cv > config.weekly_cv_threshold;

    let description = if has_variation {
        format!(
            "{} shows weekly variation (CV {:.1}%)",
            series.name,
            cv * 100.0
        )
    } else {
        format!(
            "{} is steady from week to week (CV {:.1}%)",
            series.name,
            cv * 100.0
        )
    };

    Some(WeeklyPattern {
        metric: series.name.clone(),
        weeks: weeks.len(),
        week_means,
        week_to_week_cv,
        weekday_means,
        weekday_cv,
        cv,
        has_variation,
        description,
    })
}

/// Weekly patterns across all metrics, keeping only those with variation
pub fn weekly_patterns(store: &MetricSeriesStore, config: &PatternConfig) -> Vec<WeeklyPattern> {
    let patterns: Vec<WeeklyPattern> = store
        .iter()
        .filter_map(|s| weekly_pattern(s, config))
        .filter(|p| p.has_variation)
        .collect();

    tracing::debug!(found = patterns.len(), "Detected weekly patterns");
    patterns
}

/// Score one series, `None` when empty or zero-mean
pub fn consistency_score(series: &MetricSeries) -> Option<ConsistencyScore> {
    let cv = coefficient_of_variation(&series.values)?;
    let mean = mean(&series.values)?;
    let std_dev = population_std_dev(&series.values)?;

    Some(ConsistencyScore {
        metric: series.name.clone(),
        mean,
        std_dev,
        cv,
        score: (1.0 - cv).max(0.0),
    })
}

/// Consistency scores for every scoreable metric, in metric-name order
pub fn consistency_scores(store: &MetricSeriesStore) -> Vec<ConsistencyScore> {
    store.iter().filter_map(consistency_score).collect()
}

/// The highest-scoring metric; ties keep the first name
pub fn most_consistent(store: &MetricSeriesStore) -> Option<ConsistencyScore> {
    consistency_scores(store)
        .into_iter()
        .fold(None, |best: Option<ConsistencyScore>, s| match best {
            Some(b) if b.score >= s.score => Some(b),
            _ => Some(s),
        })
}

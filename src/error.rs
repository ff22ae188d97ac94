//! Error types
//!
//! Data-quality problems (missing values, unparsable dates, zero variance)
//! never surface here: analyzers recover from them by omission. These errors
//! cover caller contract violations only.

use thiserror::Error;

/// Errors returned when an analysis request itself is malformed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InsightsError {
    /// Single-metric request for a metric that has no series
    #[error("Metric not found: {0}")]
    MetricNotFound(String),

    /// Moving-average window must be at least 1
    #[error("Invalid window size: {0}")]
    InvalidWindow(usize),

    /// Threshold outside its allowed range
    #[error("Invalid threshold {name}: {value}")]
    InvalidThreshold { name: &'static str, value: f64 },

    /// Sample count for density curves must be at least 2
    #[error("Invalid sample count: {0}")]
    InvalidSampleCount(usize),
}

/// Result type alias for analysis requests
pub type InsightsResult<T> = Result<T, InsightsError>;

//! # Journal Insights
//!
//! Statistical insights over per-entry journal metrics. Each entry carries a
//! date and a set of named numeric scores; the analyzers turn those into
//! correlations, trends, outliers, distribution shapes and calendar
//! intensity.
//!
//! ## Modules
//!
//! - [`series`]: Entries and the per-metric series store
//! - [`analysis`]: Correlation, trend, outlier, density, quantile, calendar
//!   and pattern analyzers
//! - [`report`]: Composes every analyzer into one report
//! - [`config`]: Thresholds, loaded from TOML with environment overrides
//! - [`ingest`]: JSON and CSV entry loaders for the command-line driver
//!
//! ## Quick Start
//!
//! ```rust
//! use journal_insights::config::AnalysisConfig;
//! use journal_insights::report::InsightsReportBuilder;
//! use journal_insights::series::Entry;
//!
//! let entries: Vec<Entry> = (1..=10)
//!     .map(|day| {
//!         Entry::new(format!("2024-01-{:02}", day))
//!             .metric("sleep", 6.0 + day as f64 * 0.2)
//!             .metric("mood", 4.0 + day as f64 * 0.4)
//!     })
//!     .collect();
//!
//! let report = InsightsReportBuilder::new(AnalysisConfig::default()).build(&entries);
//!
//! assert_eq!(report.overview.total_entries, 10);
//! assert_eq!(report.correlations.len(), 1);
//! println!("{}", report.correlations[0].description);
//! ```
//!
//! Analyzers are plain functions and can be called on their own:
//!
//! ```rust
//! use journal_insights::analysis::correlation::pearson_correlation;
//!
//! let r = pearson_correlation(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]);
//! assert!((r - 1.0).abs() < 1e-12);
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod ingest;
pub mod report;
pub mod series;

pub use config::{AnalysisConfig, Config};
pub use error::{InsightsError, InsightsResult};
pub use report::{InsightsReport, InsightsReportBuilder};
pub use series::{Entry, MetricSeriesStore};

//! Insights report
//!
//! Composes every analyzer into one serializable [`InsightsReport`].

mod builder;
mod types;

pub use builder::InsightsReportBuilder;
pub use types::{DateRange, InsightsReport, Overview, PatternFindings};

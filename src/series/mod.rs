//! Metric Series
//!
//! Normalizes journal entries into per-metric numeric series. Every analyzer
//! reads from a [`MetricSeriesStore`].
//!
//! - **types**: `Entry` and `MetricSeries`
//! - **dates**: entry date parsing
//! - **store**: the series store and data-quality counters
//!
//! # Example
//!
//! ```rust
//! use journal_insights::series::{Entry, MetricSeriesStore};
//!
//! let entries = vec![
//!     Entry::new("2024-01-01").metric("mood", 6.0).metric("sleep", 7.5),
//!     Entry::new("2024-01-02").metric("mood", 7.0),
//! ];
//!
//! let store = MetricSeriesStore::build(&entries);
//! assert_eq!(store.series("mood").unwrap().values, vec![6.0, 7.0]);
//! assert_eq!(store.series("sleep").unwrap().source_entry_index, vec![0]);
//! ```

pub mod dates;
pub mod store;
pub mod types;

pub use dates::parse_entry_date;
pub use store::{DataQuality, MetricSeriesStore};
pub use types::{Entry, MetricName, MetricSeries};

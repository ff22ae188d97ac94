//! JSON Import
//!
//! Reads a JSON array of entries. Metric values that are not numbers
//! (strings, booleans, nulls, nested objects) are skipped and counted.

use super::{ImportResult, IngestError};
use crate::series::Entry;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct RawEntry {
    date: String,
    #[serde(default)]
    metrics: BTreeMap<String, serde_json::Value>,
}

/// Import entries from a JSON file
pub fn import_json(path: &Path) -> Result<ImportResult, IngestError> {
    let content = std::fs::read_to_string(path)?;
    import_json_str(&content)
}

/// Import entries from a JSON string
pub fn import_json_str(json: &str) -> Result<ImportResult, IngestError> {
    let raw: Vec<RawEntry> = serde_json::from_str(json)?;
    let mut result = ImportResult::default();

    for (index, raw_entry) in raw.into_iter().enumerate() {
        let mut entry = Entry::new(raw_entry.date);
        for (name, value) in raw_entry.metrics {
            match value.as_f64() {
                Some(v) => entry = entry.metric(name, v),
                None => {
                    result.values_skipped += 1;
                    tracing::debug!(index, metric = %name, "Skipping non-numeric value");
                }
            }
        }
        result.entries.push(entry);
        result.rows_processed += 1;
    }

    Ok(result)
}

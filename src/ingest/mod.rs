//! Entry Loading
//!
//! Reads already-structured entry files for the command-line driver:
//! - JSON: an array of `{ "date": ..., "metrics": { name: number } }`
//! - CSV: one date column plus one column per metric
//!
//! The analyzers never call into this module.

pub mod csv_import;
pub mod json_import;

use crate::series::Entry;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use csv_import::{import_csv_str, CsvImporter};
pub use json_import::{import_json, import_json_str};

/// Supported entry file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Csv,
}

impl InputFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self, IngestError> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") => Ok(InputFormat::Json),
            Some("csv") => Ok(InputFormat::Csv),
            _ => Err(IngestError::UnknownFormat(path.to_path_buf())),
        }
    }
}

/// Entries read from a file plus what had to be left out
#[derive(Debug, Default)]
pub struct ImportResult {
    pub entries: Vec<Entry>,
    pub rows_processed: usize,
    pub rows_failed: usize,
    /// Cells or fields that were present but not numeric
    pub values_skipped: usize,
    pub errors: Vec<String>,
}

impl ImportResult {
    const MAX_ERRORS: usize = 100;

    fn record_error(&mut self, message: String) {
        self.rows_failed += 1;
        self.errors.push(message);
    }

    fn truncate_errors(&mut self) {
        if self.errors.len() > Self::MAX_ERRORS {
            let total = self.errors.len();
            self.errors.truncate(Self::MAX_ERRORS);
            self.errors
                .push(format!("... and {} more errors", total - Self::MAX_ERRORS));
        }
    }
}

/// Errors loading an entry file
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("No date column found in CSV header")]
    MissingDateColumn,

    #[error("Cannot tell the format of {0:?}; use a .json or .csv file")]
    UnknownFormat(PathBuf),
}

/// Load entries from a JSON or CSV file, chosen by extension
pub fn load_entries(path: &Path) -> Result<ImportResult, IngestError> {
    let result = match InputFormat::from_path(path)? {
        InputFormat::Json => import_json(path)?,
        InputFormat::Csv => CsvImporter::from_path(path)?.import(path)?,
    };

    tracing::info!(
        path = %path.display(),
        entries = result.entries.len(),
        rows_failed = result.rows_failed,
        values_skipped = result.values_skipped,
        "Loaded entries"
    );

    Ok(result)
}

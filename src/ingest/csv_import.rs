//! CSV Import
//!
//! Tabular entry files: one row per entry, a date column and one column per
//! metric. Blank cells mean the metric was not recorded.

use super::{ImportResult, IngestError};
use crate::series::{Entry, MetricName};
use std::io::Read;
use std::path::Path;

/// CSV importer with a date column and metric column mapping
#[derive(Debug, Clone)]
pub struct CsvImporter {
    /// Column index for entry dates (0-indexed)
    date_column: usize,
    /// Mapping of column indices to metric names
    metric_columns: Vec<(usize, MetricName)>,
}

fn is_date_header(header: &str) -> bool {
    let header = header.to_lowercase();
    header.contains("date") || header.contains("time") || header == "day"
}

impl CsvImporter {
    /// Create an importer reading dates from `date_column`
    pub fn new(date_column: usize) -> Self {
        Self {
            date_column,
            metric_columns: Vec::new(),
        }
    }

    /// Add a metric column mapping
    pub fn with_metric_column(mut self, column: usize, metric: impl Into<MetricName>) -> Self {
        self.metric_columns.push((column, metric.into()));
        self
    }

    /// Detect the date column and metric columns from a header row
    ///
    /// The first header mentioning a date or time is the date column; every
    /// other non-empty header becomes a metric.
    pub fn from_headers(headers: &csv::StringRecord) -> Result<Self, IngestError> {
        let date_column = headers
            .iter()
            .position(is_date_header)
            .ok_or(IngestError::MissingDateColumn)?;

        let metric_columns = headers
            .iter()
            .enumerate()
            .filter(|(idx, header)| *idx != date_column && !header.trim().is_empty())
            .map(|(idx, header)| (idx, header.trim().to_lowercase().replace(' ', "_")))
            .collect();

        Ok(Self {
            date_column,
            metric_columns,
        })
    }

    /// Detect columns from the header row of a file
    pub fn from_path(path: &Path) -> Result<Self, IngestError> {
        let mut reader = csv::Reader::from_path(path)?;
        Self::from_headers(reader.headers()?)
    }

    /// Detect columns from the header row of in-memory CSV
    pub fn from_csv_str(csv_data: &str) -> Result<Self, IngestError> {
        let mut reader = csv::Reader::from_reader(csv_data.as_bytes());
        Self::from_headers(reader.headers()?)
    }

    /// Metric names in column order
    pub fn metric_names(&self) -> impl Iterator<Item = &str> {
        self.metric_columns.iter().map(|(_, name)| name.as_str())
    }

    /// Import entries from a CSV file
    pub fn import(&self, path: &Path) -> Result<ImportResult, IngestError> {
        let reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)?;
        Ok(self.import_reader(reader))
    }

    /// Import from a CSV string
    pub fn import_str(&self, csv_data: &str) -> ImportResult {
        let reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(csv_data.as_bytes());
        self.import_reader(reader)
    }

    fn import_reader<R: Read>(&self, mut reader: csv::Reader<R>) -> ImportResult {
        let mut result = ImportResult::default();

        for (line_num, record) in reader.records().enumerate() {
            // Header is line 1
            let line = line_num + 2;

            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    result.record_error(format!("Line {}: {}", line, e));
                    continue;
                }
            };

            let date = match record.get(self.date_column).map(str::trim) {
                Some(d) if !d.is_empty() => d,
                _ => {
                    result.record_error(format!("Line {}: missing date", line));
                    continue;
                }
            };

            let mut entry = Entry::new(date);
            for (col_idx, metric) in &self.metric_columns {
                let Some(cell) = record.get(*col_idx).map(str::trim) else {
                    continue;
                };
                if cell.is_empty() {
                    continue;
                }
                match cell.parse::<f64>() {
                    Ok(value) => entry = entry.metric(metric.as_str(), value),
                    Err(_) => {
                        result.values_skipped += 1;
                        tracing::debug!(line, metric = %metric, cell, "Skipping non-numeric cell");
                    }
                }
            }

            result.entries.push(entry);
            result.rows_processed += 1;
        }

        result.truncate_errors();
        result
    }
}

/// Import in-memory CSV with auto-detected columns
pub fn import_csv_str(csv_data: &str) -> Result<ImportResult, IngestError> {
    Ok(CsvImporter::from_csv_str(csv_data)?.import_str(csv_data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_csv_import() {
        let csv_data = "date,mood,energy
2024-01-15,7.5,6.0
2024-01-16,8.0,7.0
2024-01-17,6.5,5.5";

        let result = import_csv_str(csv_data).unwrap();

        assert_eq!(result.rows_processed, 3);
        assert_eq!(result.rows_failed, 0);
        assert_eq!(result.entries.len(), 3);
        assert_eq!(result.entries[0].date, "2024-01-15");
        assert_eq!(result.entries[2].get("energy"), Some(5.5));
    }

    #[test]
    fn test_csv_with_missing_values() {
        let csv_data = "date,mood,energy
2024-01-15,7.5,
2024-01-16,,7.0
2024-01-17,6.5,5.5";

        let result = import_csv_str(csv_data).unwrap();

        assert_eq!(result.rows_processed, 3);
        assert_eq!(result.entries[0].get("energy"), None);
        assert_eq!(result.entries[1].get("mood"), None);
        let total: usize = result.entries.iter().map(|e| e.metrics.len()).sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn test_date_column_detected_anywhere() {
        let csv_data = "Mood,Sleep Hours,Entry Date
6,7.5,2024-02-01";

        let importer = CsvImporter::from_csv_str(csv_data).unwrap();
        assert_eq!(importer.metric_names().collect::<Vec<_>>(), vec!["mood", "sleep_hours"]);

        let result = importer.import_str(csv_data);
        assert_eq!(result.entries[0].date, "2024-02-01");
        assert_eq!(result.entries[0].get("sleep_hours"), Some(7.5));
    }

    #[test]
    fn test_missing_date_column() {
        let err = import_csv_str("mood,energy\n1,2").unwrap_err();
        assert!(matches!(err, IngestError::MissingDateColumn));
    }

    #[test]
    fn test_non_numeric_and_missing_date() {
        let csv_data = "date,mood
2024-01-15,great
,7";

        let result = import_csv_str(csv_data).unwrap();

        assert_eq!(result.values_skipped, 1);
        assert_eq!(result.rows_failed, 1);
        assert_eq!(result.entries.len(), 1);
        assert!(result.entries[0].metrics.is_empty());
        assert!(result.errors[0].starts_with("Line 3"));
    }

    #[test]
    fn test_explicit_mapping() {
        let importer = CsvImporter::new(1).with_metric_column(0, "steps");
        let result = importer.import_str("count,when\n9000,2024-03-01");

        assert_eq!(result.entries[0].date, "2024-03-01");
        assert_eq!(result.entries[0].get("steps"), Some(9000.0));
    }
}

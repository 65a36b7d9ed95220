//! Parsed dataset representation and source metadata.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata about the source spreadsheet file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Detected format (csv, tsv, etc.).
    pub format: String,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the file was read.
    pub read_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for a file that has been parsed.
    pub fn new(
        path: PathBuf,
        hash: String,
        size_bytes: u64,
        format: String,
        row_count: usize,
        column_count: usize,
    ) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            hash,
            size_bytes,
            format,
            row_count,
            column_count,
            read_at: Utc::now(),
        }
    }
}

/// An in-memory table of student records as decoded from the spreadsheet.
///
/// Cells are kept as strings; numeric interpretation happens in the
/// validator and analyzer via [`DataTable::score_value`].
#[derive(Debug, Clone)]
pub struct DataTable {
    /// Column headers.
    pub headers: Vec<String>,
    /// Row data as strings (row-major order).
    pub rows: Vec<Vec<String>>,
}

impl DataTable {
    /// Create a new data table.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Get the number of rows (excluding header).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Find a column's position by name.
    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Get all values for a column by index.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |row| row.get(index).map(|s| s.as_str()).unwrap_or(""))
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col).map(|s| s.as_str()))
    }

    /// Check if a value represents a missing/null value.
    pub fn is_null_value(value: &str) -> bool {
        let trimmed = value.trim();
        trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("na")
            || trimmed.eq_ignore_ascii_case("n/a")
            || trimmed.eq_ignore_ascii_case("null")
            || trimmed.eq_ignore_ascii_case("none")
            || trimmed == "."
            || trimmed == "-"
    }

    /// Interpret a cell as a score.
    ///
    /// Returns `None` for missing values, `Some(Err)` for cells that are
    /// present but not a finite number, and `Some(Ok(score))` otherwise.
    /// `NaN` and infinities parse as f64 but can never satisfy a range
    /// check, so they are rejected here rather than leaking into analysis.
    pub fn score_value(value: &str) -> Option<std::result::Result<f64, ()>> {
        if Self::is_null_value(value) {
            return None;
        }
        Some(match value.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_lookup() {
        let table = DataTable::new(
            vec!["Student_ID".into(), "Math".into()],
            vec![vec!["S001".into(), "72".into()]],
        );

        assert_eq!(table.column_position("Math"), Some(1));
        assert_eq!(table.column_position("Science"), None);
        assert_eq!(table.get(0, 1), Some("72"));
    }

    #[test]
    fn test_score_value() {
        assert_eq!(DataTable::score_value("72.5"), Some(Ok(72.5)));
        assert_eq!(DataTable::score_value(" 80 "), Some(Ok(80.0)));
        assert_eq!(DataTable::score_value("NA"), None);
        assert_eq!(DataTable::score_value(""), None);
        assert_eq!(DataTable::score_value("absent"), Some(Err(())));
    }

    #[test]
    fn test_score_value_rejects_non_finite() {
        assert_eq!(DataTable::score_value("NaN"), Some(Err(())));
        assert_eq!(DataTable::score_value("nan"), Some(Err(())));
        assert_eq!(DataTable::score_value("inf"), Some(Err(())));
        assert_eq!(DataTable::score_value("-inf"), Some(Err(())));
    }
}

//! CSV/TSV parser with delimiter detection.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use super::source::{DataTable, SourceMetadata};
use crate::error::{ExamstatError, Result};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Quote character.
    pub quote: u8,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            quote: b'"',
        }
    }
}

/// Parses delimited spreadsheet exports into a [`DataTable`].
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a file and return the data table and metadata.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(DataTable, SourceMetadata)> {
        let path = path.as_ref();

        let mut file = File::open(path).map_err(|e| ExamstatError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .map_err(|e| ExamstatError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;
        let size_bytes = contents.len() as u64;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(&contents)?,
        };

        let table = self.parse_bytes(&contents, delimiter)?;

        let format = match delimiter {
            b'\t' => "tsv",
            b',' => "csv",
            b';' => "csv-semicolon",
            b'|' => "psv",
            _ => "delimited",
        }
        .to_string();

        let source = SourceMetadata::new(
            path.to_path_buf(),
            hash,
            size_bytes,
            format,
            table.row_count(),
            table.column_count(),
        );

        Ok((table, source))
    }

    /// Parse bytes directly.
    pub fn parse_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<DataTable> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader.headers()?.iter().map(|s| s.trim().to_string()).collect();

        if headers.is_empty() {
            return Err(ExamstatError::EmptyData("No columns found".to_string()));
        }

        let expected_cols = headers.len();
        let mut rows = Vec::new();

        for result in reader.records() {
            let record = result?;
            let mut row: Vec<String> = record.iter().map(|s| s.to_string()).collect();

            // Normalize ragged rows to the header width
            while row.len() < expected_cols {
                row.push(String::new());
            }
            row.truncate(expected_cols);

            rows.push(row);
        }

        if rows.is_empty() {
            return Err(ExamstatError::EmptyData("No data rows found".to_string()));
        }

        Ok(DataTable::new(headers, rows))
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Detect the delimiter by scoring each candidate over the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let lines: Vec<String> = BufReader::new(bytes)
        .lines()
        .take(10)
        .filter_map(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(ExamstatError::EmptyData("No lines to analyze".to_string()));
    }

    // Earlier candidates win ties, hence the rev() before max_by_key.
    let best = DELIMITERS
        .iter()
        .rev()
        .map(|&delim| (delimiter_score(&lines, delim), delim))
        .max_by_key(|&(score, _)| score)
        .filter(|&(score, _)| score > 0)
        .map_or(b',', |(_, delim)| delim);

    Ok(best)
}

/// Score one candidate delimiter against the sampled lines.
///
/// Consistent per-line counts outrank raw frequency; tab gets a slight
/// bonus since it rarely appears inside actual data.
fn delimiter_score(lines: &[String], delim: u8) -> usize {
    let mut counts = lines.iter().map(|line| unquoted_count(line, delim as char));

    let first = counts.next().unwrap_or(0);
    if first == 0 {
        return 0;
    }

    if counts.all(|c| c == first) {
        first * 1000 + if delim == b'\t' { 100 } else { 0 }
    } else {
        first
    }
}

/// Count how often `delim` appears in a line outside quoted fields.
fn unquoted_count(line: &str, delim: char) -> usize {
    let mut in_quotes = false;
    line.chars()
        .filter(|&ch| {
            if ch == '"' {
                in_quotes = !in_quotes;
                return false;
            }
            ch == delim && !in_quotes
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_delimiter_csv() {
        let data = b"Student_ID,Math\nS001,72\nS002,88";
        assert_eq!(detect_delimiter(data).unwrap(), b',');
    }

    #[test]
    fn test_detect_delimiter_tsv() {
        let data = b"Student_ID\tMath\nS001\t72\nS002\t88";
        assert_eq!(detect_delimiter(data).unwrap(), b'\t');
    }

    #[test]
    fn test_unquoted_count_skips_quoted_fields() {
        assert_eq!(unquoted_count("a,\"b,c\",d", ','), 2);
        assert_eq!(unquoted_count("\"x,y\"", ','), 0);
        assert_eq!(unquoted_count("a\tb\tc", '\t'), 2);
    }

    #[test]
    fn test_parse_csv() {
        let parser = Parser::new();
        let data = b"Student_ID,Student_Name,Math\nS001,Alice,72\nS002,Bob,88";
        let table = parser.parse_bytes(data, b',').unwrap();

        assert_eq!(table.headers, vec!["Student_ID", "Student_Name", "Math"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.get(0, 1), Some("Alice"));
        assert_eq!(table.get(1, 2), Some("88"));
    }

    #[test]
    fn test_parse_ragged_rows_padded() {
        let parser = Parser::new();
        let data = b"Student_ID,Student_Name,Math\nS001,Alice\nS002,Bob,88,extra";
        let table = parser.parse_bytes(data, b',').unwrap();

        assert_eq!(table.get(0, 2), Some(""));
        assert_eq!(table.rows[1].len(), 3);
    }

    #[test]
    fn test_parse_empty_fails() {
        let parser = Parser::new();
        assert!(parser.parse_bytes(b"Student_ID,Math\n", b',').is_err());
    }
}

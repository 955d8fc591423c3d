//! High-level loading pipeline: parse, clean, reshape.
//!
//! # Example
//!
//! ```rust,ignore
//! use pulseviz::{load_pulse_data, pivot_mean, LoadOptions};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let result = load_pulse_data(Path::new("exercise.csv"), &LoadOptions::default())?;
//!     let view = pivot_mean(&result.tidy, "diet", "exercise")?;
//!     println!("{}", view);
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::clean::clean;
use super::tidy::to_tidy;
use crate::error::{CsvError, PipelineResult};
use crate::logs::{log_error, log_info, log_info_indent, log_success, log_warning};
use crate::models::{RawTable, TidyTable};
use crate::parser::{default_missing_markers, parse_bytes, ParseResult};

/// Options for loading a pulse CSV
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Use this delimiter instead of auto-detecting one
    #[serde(default)]
    pub delimiter: Option<char>,

    /// Cell texts treated as missing values
    #[serde(default = "default_missing_markers")]
    pub missing_markers: Vec<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            missing_markers: default_missing_markers(),
        }
    }
}

/// CSV file information
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
    /// Rows removed for carrying a missing value
    pub dropped_rows: usize,
}

/// Result of loading a pulse CSV
#[derive(Debug, Clone, Serialize)]
pub struct LoadResult {
    pub tidy: TidyTable,
    pub csv_info: CsvInfo,
}

/// Load a pulse CSV file into a tidy table.
///
/// 1. Parses the CSV with auto-detection
/// 2. Drops incomplete rows
/// 3. Reshapes to one row per (subject, time offset)
pub fn load_pulse_data(path: &Path, options: &LoadOptions) -> PipelineResult<LoadResult> {
    log_info(format!("📖 Reading {}", path.display()));
    let bytes = std::fs::read(path).map_err(CsvError::from)?;
    load_pulse_bytes(&bytes, options)
}

/// Same as [`load_pulse_data`] but from an in-memory buffer.
pub fn load_pulse_bytes(bytes: &[u8], options: &LoadOptions) -> PipelineResult<LoadResult> {
    let parsed = parse_bytes(bytes, options.delimiter, &options.missing_markers)?;
    load_parsed(parsed)
}

fn load_parsed(parsed: ParseResult) -> PipelineResult<LoadResult> {
    log_success(format!("Detected encoding: {}", parsed.encoding));
    log_success(format!("Using separator: '{}'", format_delimiter(parsed.delimiter)));
    log_success(format!("Read {} rows", parsed.table.len()));

    log_info(format!("📋 CSV has {} columns:", parsed.headers().len()));
    for (i, col) in parsed.headers().iter().enumerate() {
        log_info_indent(format!("[{:2}] {}", i + 1, col), 1);
    }

    let (tidy, dropped_rows) = tidy_from_table(&parsed.table)?;

    let csv_info = CsvInfo {
        encoding: parsed.encoding,
        delimiter: parsed.delimiter,
        headers: parsed.table.headers,
        row_count: parsed.table.records.len(),
        dropped_rows,
    };

    Ok(LoadResult { tidy, csv_info })
}

/// Clean and reshape an already-parsed table; also returns the number of
/// dropped rows.
pub fn tidy_from_table(raw: &RawTable) -> PipelineResult<(TidyTable, usize)> {
    log_info("🧹 Dropping incomplete rows...");
    let cleaned = clean(raw);
    let dropped = raw.len() - cleaned.len();
    if dropped > 0 {
        log_warning(format!("{} rows dropped (missing values)", dropped));
    } else {
        log_success("No incomplete rows");
    }

    log_info("🔄 Reshaping to tidy format...");
    let tidy = to_tidy(&cleaned).map_err(|e| {
        log_error(format!("Reshape failed: {}", e));
        e
    })?;
    log_success(format!(
        "{} tidy rows from {} subjects",
        tidy.len(),
        cleaned.len()
    ));

    Ok((tidy, dropped))
}

/// Format delimiter for display
pub fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PipelineError, TransformError};
    use crate::logs::{received, LOG_BROADCASTER};

    const EXERCISE_CSV: &str = "\
,id,diet,kind,1 min,15 min,30 min
0,1,low fat,rest,85,85,88
1,2,low fat,rest,90,92,93
2,3,no fat,running,97,,125
3,4,no fat,walking,NA,82,84
";

    #[test]
    fn test_default_options() {
        let opts = LoadOptions::default();
        assert_eq!(opts.delimiter, None);
        assert!(opts.missing_markers.iter().any(|m| m == "NA"));
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let opts: LoadOptions = serde_json::from_str(r#"{"delimiter": ";"}"#).unwrap();
        assert_eq!(opts.delimiter, Some(';'));
        assert_eq!(opts.missing_markers, default_missing_markers());
    }

    #[test]
    fn test_load_bytes_drops_incomplete_rows() {
        let result = load_pulse_bytes(EXERCISE_CSV.as_bytes(), &LoadOptions::default()).unwrap();

        assert_eq!(result.csv_info.row_count, 4);
        assert_eq!(result.csv_info.dropped_rows, 2);
        assert_eq!(result.csv_info.delimiter, ',');
        assert_eq!(result.csv_info.headers[0], "Unnamed: 0");
        assert_eq!(result.tidy.len(), 6);
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exercise.csv");
        std::fs::write(&path, EXERCISE_CSV).unwrap();

        let result = load_pulse_data(&path, &LoadOptions::default()).unwrap();
        assert_eq!(result.tidy.len(), 6);
    }

    #[test]
    fn test_missing_file() {
        let err = load_pulse_data(Path::new("/no/such/exercise.csv"), &LoadOptions::default())
            .unwrap_err();
        assert!(matches!(err, PipelineError::Csv(_)));
    }

    #[test]
    fn test_schema_error_surfaces() {
        let err = load_pulse_bytes(b"id,diet\n1,low fat\n", &LoadOptions::default()).unwrap_err();
        match err {
            PipelineError::Transform(TransformError::Schema(e)) => {
                assert_eq!(e.missing, vec!["kind", "1 min", "15 min", "30 min"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_explicit_delimiter() {
        let csv = "id;diet;kind;1 min;15 min;30 min\n1;low;rest;80;78;76\n";
        let opts = LoadOptions {
            delimiter: Some(';'),
            ..LoadOptions::default()
        };
        let result = load_pulse_bytes(csv.as_bytes(), &opts).unwrap();
        assert_eq!(result.tidy.len(), 3);
    }

    #[test]
    fn test_dropped_rows_are_logged() {
        let mut rx = LOG_BROADCASTER.subscribe();
        load_pulse_bytes(EXERCISE_CSV.as_bytes(), &LoadOptions::default()).unwrap();
        assert!(received(&mut rx, "2 rows dropped"));
    }

    #[test]
    fn test_format_delimiter() {
        assert_eq!(format_delimiter('\t'), "\\t");
        assert_eq!(format_delimiter(';'), ";");
    }
}

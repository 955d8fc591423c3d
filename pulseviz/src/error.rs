//! Error types for the pulse analysis pipeline.
//!
//! - [`CsvError`] - CSV loading errors
//! - [`SchemaError`] - required input columns absent
//! - [`TransformError`] - wide-to-tidy reshaping errors
//! - [`KeyError`] - invalid pivot dimensions
//! - [`RenderError`] - figure rendering errors
//! - [`CacheError`] - pivot view cache errors
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// CSV Parsing Errors
// =============================================================================

/// Errors while loading a CSV file.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to decode content.
    #[error("Failed to decode content: {0}")]
    EncodingError(String),

    /// Delimiter cannot be used by the CSV reader.
    #[error("Invalid delimiter '{0}': must be a single ASCII character")]
    InvalidDelimiter(char),

    /// Malformed record.
    #[error("Line {line}: {message}")]
    Malformed { line: u64, message: String },

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,
}

// =============================================================================
// Schema Errors
// =============================================================================

/// Required columns are missing from the wide input table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Missing required columns: {}", .missing.join(", "))]
pub struct SchemaError {
    /// Every required column that was not found, in schema order.
    pub missing: Vec<String>,
}

// =============================================================================
// Transformation Errors
// =============================================================================

/// Errors while reshaping wide records into tidy records.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    /// Input schema is incomplete.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A measurement cell is not a finite real number.
    #[error("Line {line}, column '{column}' (value '{value}'): not a number")]
    InvalidValue {
        line: u64,
        column: String,
        value: String,
    },

    /// A cell is still missing; the table was not cleaned.
    #[error("Line {line}, column '{column}': missing value (clean the table first)")]
    MissingValue { line: u64, column: String },
}

// =============================================================================
// Pivot Key Errors
// =============================================================================

/// Errors selecting pivot dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// Column is not a categorical column of the tidy table.
    #[error("Unknown pivot column: '{0}'")]
    UnknownColumn(String),

    /// Row and column keys are the same dimension.
    #[error("Pivot row and column keys must differ (both '{0}')")]
    SameKey(String),

    /// Value column is not the numeric measurement column.
    #[error("Column '{0}' is not a numeric value column")]
    NotNumeric(String),
}

// =============================================================================
// Rendering Errors
// =============================================================================

/// Errors while drawing figures.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Drawing backend reported a failure.
    #[error("Drawing failed: {0}")]
    Backend(String),

    /// Nothing to draw.
    #[error("Nothing to draw: {0}")]
    EmptyView(String),

    /// Pivot selection failed.
    #[error(transparent)]
    Key(#[from] KeyError),

    /// IO error.
    #[error("Render IO error: {0}")]
    IoError(#[from] std::io::Error),
}

// =============================================================================
// Cache Errors
// =============================================================================

/// Errors from the pivot view cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Pivot selection failed.
    #[error(transparent)]
    Key(#[from] KeyError),

    /// IO error.
    #[error("Cache IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error.
    #[error("Cache JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by [`crate::transform::pipeline::load_pulse_data`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// CSV parsing error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Transformation error.
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// Pivot key error.
    #[error("Pivot error: {0}")]
    Key(#[from] KeyError),

    /// Rendering error.
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Cache error.
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// No records left to work with.
    #[error("No complete records to analyze")]
    EmptyInput,
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for transformation operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // CsvError -> PipelineError
        let csv_err = CsvError::EmptyFile;
        let pipeline_err: PipelineError = csv_err.into();
        assert!(pipeline_err.to_string().contains("empty"));

        // SchemaError -> TransformError -> PipelineError
        let schema_err = SchemaError {
            missing: vec!["kind".into()],
        };
        let transform_err: TransformError = schema_err.into();
        let pipeline_err: PipelineError = transform_err.into();
        assert!(pipeline_err.to_string().contains("kind"));
    }

    #[test]
    fn test_schema_error_lists_every_column() {
        let err = SchemaError {
            missing: vec!["kind".into(), "15 min".into()],
        };
        assert_eq!(err.to_string(), "Missing required columns: kind, 15 min");
    }

    #[test]
    fn test_invalid_value_format() {
        let err = TransformError::InvalidValue {
            line: 5,
            column: "1 min".into(),
            value: "abc".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Line 5"));
        assert!(msg.contains("column '1 min'"));
        assert!(msg.contains("value 'abc'"));
    }

    #[test]
    fn test_key_error_names_offending_key() {
        let err = KeyError::UnknownColumn("kind".into());
        assert!(err.to_string().contains("'kind'"));
    }
}

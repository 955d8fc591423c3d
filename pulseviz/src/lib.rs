//! # Pulseviz - pulse exercise data reshaping and summaries
//!
//! Pulseviz reads the wide "exercise" CSV (one row per subject, pulse at
//! 1, 15 and 30 minutes), drops incomplete rows, reshapes it into one row
//! per (subject, time offset) and aggregates pulse over two categorical
//! dimensions.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│  Transform  │────▶│ Pivot / SVG │
//! │  (ISO/UTF8) │     │  (auto-enc) │     │ (clean+tidy)│     │  (render)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pulseviz::{load_pulse_data, pivot_mean, LoadOptions};
//! use std::path::Path;
//!
//! let result = load_pulse_data(Path::new("exercise.csv"), &LoadOptions::default())?;
//! let view = pivot_mean(&result.tidy, "diet", "exercise")?;
//! println!("{}", view);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Domain models (RawTable, TidyTable, Dimension, Category)
//! - [`parser`] - CSV parsing with auto-detection
//! - [`transform`] - Clean, tidy, pivot, summary and pipeline
//! - [`render`] - Heatmaps and categorical plots
//! - [`cache`] - Pivot view caching
//! - [`config`] - Environment settings
//! - [`logs`] - Log broadcasting

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Rendering
pub mod render;

// Caching
pub mod cache;

// Runtime
pub mod config;
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    CacheError, CsvError, KeyError, PipelineError, PipelineResult, RenderError, SchemaError,
    TransformError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    Category, Dimension, RawRecord, RawTable, SubjectId, TidyRecord, TidyTable, TimeOffset,
};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, parse_bytes, parse_bytes_auto, parse_csv,
    parse_csv_file_auto, ParseResult,
};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    clean, pivot, pivot_by, pivot_mean, summarize, to_tidy, Aggregation, Cell, GroupSummary,
    PivotView,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    load_pulse_bytes, load_pulse_data, tidy_from_table, CsvInfo, LoadOptions, LoadResult,
};

// =============================================================================
// Re-exports - Rendering
// =============================================================================

pub use render::{
    draw_categorical, draw_heatmap, render_report, CategoricalOptions, HeatmapOptions,
};

// =============================================================================
// Re-exports - Cache, Config, Logs
// =============================================================================

pub use cache::{CachedView, PivotCache};
pub use config::Settings;
pub use logs::{LogFormat, LOG_BROADCASTER};

//! Transformation module.
//!
//! - Clean: drop incomplete wide rows
//! - Tidy: wide to long reshaping
//! - Pivot: two-dimensional aggregation
//! - Summary: per-category distributions
//! - Pipeline: load, clean and reshape a CSV

pub mod clean;
pub mod pipeline;
pub mod pivot;
pub mod summary;
pub mod tidy;

pub use clean::clean;
pub use pipeline::*;
pub use pivot::{pivot, pivot_by, pivot_mean, Aggregation, Cell, PivotView};
pub use summary::{summarize, values_by, GroupSummary};
pub use tidy::to_tidy;

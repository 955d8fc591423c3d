//! Figure rendering.
//!
//! Every drawing function takes the `DrawingArea` to draw into, so callers
//! decide the backend and layout. [`render_report`] writes the standard set
//! of SVG figures for a tidy table.

pub mod categorical;
pub mod heatmap;

use plotters::coord::ranged1d::SegmentedCoord;
use plotters::coord::types::RangedCoordi32;
use plotters::prelude::*;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{RenderError, RenderResult};
use crate::logs::{log_info, log_success};
use crate::models::{Dimension, TidyTable};
use crate::transform::pivot::{pivot_by, Aggregation, PivotView};

pub use categorical::{draw_categorical, CategoricalOptions};
pub use heatmap::{draw_heatmap, HeatmapOptions, NO_DATA_LABEL};

pub const HEATMAP_FILE: &str = "pulse_heatmap.svg";
pub const TIME_HEATMAP_FILE: &str = "pulse_time_heatmap.svg";
pub const CATEGORICAL_FILE: &str = "pulse_categorical_plots.svg";

const CATEGORICAL_SIZE: (u32, u32) = (1400, 1000);

pub(crate) fn backend_error<E: Display>(err: E) -> RenderError {
    RenderError::Backend(err.to_string())
}

/// Category axis with one segment per label, addressed by label index.
pub(crate) fn category_axis(n: usize) -> SegmentedCoord<RangedCoordi32> {
    // A single-valued range cannot be mapped by plotters, so one label still
    // gets a two-slot axis with the trailing slot left blank.
    (0..n.max(2) as i32 - 1).into_segmented()
}

/// Axis label for a category axis: only segment centers carry text.
pub(crate) fn segment_label(labels: &[String], value: &SegmentValue<i32>) -> String {
    match value {
        SegmentValue::CenterOf(i) => usize::try_from(*i)
            .ok()
            .and_then(|i| labels.get(i))
            .cloned()
            .unwrap_or_default(),
        _ => String::new(),
    }
}

/// Render `view` as a standalone SVG heatmap at `path`.
pub fn render_heatmap_file(
    path: &Path,
    view: &PivotView,
    options: &HeatmapOptions,
) -> RenderResult<()> {
    let root = SVGBackend::new(path, options.size).into_drawing_area();
    root.fill(&WHITE).map_err(backend_error)?;
    draw_heatmap(&root, view, options)?;
    root.present().map_err(backend_error)?;
    Ok(())
}

/// Write the diet × exercise heatmap, the time × exercise heatmap and the
/// side-by-side categorical plots into `out_dir`. Returns the written paths.
pub fn render_report(tidy: &TidyTable, out_dir: &Path) -> RenderResult<Vec<PathBuf>> {
    if tidy.is_empty() {
        return Err(RenderError::EmptyView("tidy table has no rows".to_string()));
    }
    fs::create_dir_all(out_dir)?;

    let mut written = Vec::with_capacity(3);

    for (row_key, file) in [
        (Dimension::Diet, HEATMAP_FILE),
        (Dimension::Time, TIME_HEATMAP_FILE),
    ] {
        let view = pivot_by(tidy, row_key, Dimension::Exercise, Aggregation::Mean)?;
        let path = out_dir.join(file);
        log_info(format!("🎨 Drawing {}", path.display()));
        render_heatmap_file(&path, &view, &HeatmapOptions::for_view(&view))?;
        written.push(path);
    }

    let path = out_dir.join(CATEGORICAL_FILE);
    log_info(format!("🎨 Drawing {}", path.display()));
    {
        let root = SVGBackend::new(&path, CATEGORICAL_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(backend_error)?;
        let panels = root.split_evenly((1, 2));
        for (panel, by) in panels.iter().zip([Dimension::Diet, Dimension::Exercise]) {
            draw_categorical(panel, tidy, by, &CategoricalOptions::for_dimension(by))?;
        }
        root.present().map_err(backend_error)?;
    }
    written.push(path);

    log_success(format!("Wrote {} figures to {}", written.len(), out_dir.display()));
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SubjectId, TidyRecord, TimeOffset};

    fn tidy() -> TidyTable {
        let mut records = Vec::new();
        for (id, diet, exercise, pulses) in [
            ("1", "low fat", "rest", [85.0, 85.0, 88.0]),
            ("2", "no fat", "walking", [90.0, 92.0, 93.0]),
            ("3", "no fat", "running", [97.0, 110.0, 125.0]),
        ] {
            for (time, pulse) in TimeOffset::ALL.into_iter().zip(pulses) {
                records.push(TidyRecord {
                    id: SubjectId::new(id),
                    diet: diet.into(),
                    exercise: exercise.into(),
                    time,
                    pulse,
                });
            }
        }
        TidyTable::new(records)
    }

    #[test]
    fn test_report_writes_three_figures() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("figures");

        let written = render_report(&tidy(), &out).unwrap();

        assert_eq!(written.len(), 3);
        for (path, name) in written
            .iter()
            .zip([HEATMAP_FILE, TIME_HEATMAP_FILE, CATEGORICAL_FILE])
        {
            assert_eq!(path.file_name().unwrap(), name);
            let svg = fs::read_to_string(path).unwrap();
            assert!(svg.starts_with("<svg") || svg.starts_with("<?xml"));
        }

        let heatmap = fs::read_to_string(out.join(HEATMAP_FILE)).unwrap();
        assert!(heatmap.contains("86.0"));
        assert!(heatmap.contains(NO_DATA_LABEL));

        let time_heatmap = fs::read_to_string(out.join(TIME_HEATMAP_FILE)).unwrap();
        assert!(time_heatmap.contains("30 min"));
    }

    #[test]
    fn test_report_rejects_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let err = render_report(&TidyTable::default(), dir.path()).unwrap_err();
        assert!(matches!(err, RenderError::EmptyView(_)));
    }

    #[test]
    fn test_segment_label_only_centers() {
        let labels = vec!["rest".to_string(), "running".to_string()];
        assert_eq!(segment_label(&labels, &SegmentValue::CenterOf(1)), "running");
        assert_eq!(segment_label(&labels, &SegmentValue::CenterOf(2)), "");
        assert_eq!(segment_label(&labels, &SegmentValue::Exact(0)), "");
        assert_eq!(segment_label(&labels, &SegmentValue::Last), "");
    }

    #[test]
    fn test_category_axis_has_a_slot_per_label() {
        assert_eq!(category_axis(3).size(), 4);
        assert_eq!(category_axis(1).size(), 3);
    }

    #[test]
    fn test_single_category_report_renders() {
        let dir = tempfile::tempdir().unwrap();
        let one_diet: TidyTable = tidy()
            .into_records()
            .into_iter()
            .filter(|r| r.diet == "low fat")
            .collect();

        let written = render_report(&one_diet, dir.path()).unwrap();

        let heatmap = fs::read_to_string(&written[0]).unwrap();
        assert!(heatmap.contains("86.0"));
        assert!(heatmap.contains("low fat"));
    }
}

//! Annotated heatmap of a pivot view.

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::{backend_error, category_axis, segment_label};
use crate::error::{RenderError, RenderResult};
use crate::models::Dimension;
use crate::transform::pivot::{Cell, PivotView};

/// Annotation drawn in cells without data.
pub const NO_DATA_LABEL: &str = "n/a";

const NO_DATA_COLOR: RGBColor = RGBColor(220, 220, 220);
const LOW_COLOR: RGBColor = RGBColor(255, 255, 204);
const HIGH_COLOR: RGBColor = RGBColor(189, 0, 38);

#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapOptions {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    /// Pixel size when rendered to a file
    pub size: (u32, u32),
}

impl HeatmapOptions {
    /// Titles derived from the view's dimensions.
    pub fn for_view(view: &PivotView) -> Self {
        match (view.row_key, view.col_key) {
            (Dimension::Diet, Dimension::Exercise) => Self {
                title: "Average Pulse Rate by Diet and Exercise Type".into(),
                x_desc: "Exercise Type".into(),
                y_desc: "Diet".into(),
                size: (1200, 800),
            },
            (Dimension::Time, Dimension::Exercise) => Self {
                title: "Average Pulse Rate Over Time by Exercise Type".into(),
                x_desc: "Exercise Type".into(),
                y_desc: "Time".into(),
                size: (1200, 800),
            },
            (row, col) => Self {
                title: format!(
                    "Average Pulse Rate by {} and {}",
                    capitalize(row.column()),
                    capitalize(col.column())
                ),
                x_desc: capitalize(col.column()),
                y_desc: capitalize(row.column()),
                size: (1200, 800),
            },
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Color for `value` on a light-to-dark ramp spanning `lo..=hi`.
fn ramp(value: f64, lo: f64, hi: f64) -> RGBColor {
    let t = if hi > lo {
        ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
    } else {
        0.5
    };
    let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
    RGBColor(
        mix(LOW_COLOR.0, HIGH_COLOR.0),
        mix(LOW_COLOR.1, HIGH_COLOR.1),
        mix(LOW_COLOR.2, HIGH_COLOR.2),
    )
}

/// Draw `view` into `area`: one colored, annotated rectangle per cell, the
/// first pivot row at the top.
pub fn draw_heatmap<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    view: &PivotView,
    options: &HeatmapOptions,
) -> RenderResult<()> {
    if view.is_empty() {
        return Err(RenderError::EmptyView(format!(
            "{} by {} pivot has no cells",
            view.row_key, view.col_key
        )));
    }

    let columns = view.column_labels();
    // First pivot row drawn at the top.
    let rows: Vec<String> = view.row_labels().into_iter().rev().collect();
    let (lo, hi) = view.value_range().unwrap_or((0.0, 0.0));

    let mut chart = ChartBuilder::on(area)
        .caption(&options.title, ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(100)
        .build_cartesian_2d(category_axis(columns.len()), category_axis(rows.len()))
        .map_err(backend_error)?;

    let x_label = |v: &SegmentValue<i32>| segment_label(&columns, v);
    let y_label = |v: &SegmentValue<i32>| segment_label(&rows, v);
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(columns.len().max(2))
        .y_labels(rows.len().max(2))
        .x_label_formatter(&x_label)
        .y_label_formatter(&y_label)
        .x_desc(options.x_desc.as_str())
        .y_desc(options.y_desc.as_str())
        .draw()
        .map_err(backend_error)?;

    let note_style = TextStyle::from(("sans-serif", 16).into_font())
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));

    let n_rows = view.rows.len();
    let mut rects = Vec::with_capacity(n_rows * columns.len());
    let mut notes = Vec::with_capacity(n_rows * columns.len());

    for (r, cells) in view.cells.iter().enumerate() {
        let y = (n_rows - 1 - r) as i32;
        for (c, cell) in cells.iter().enumerate() {
            let x = c as i32;
            let (fill, note) = match cell {
                Cell::Value(v) => (ramp(*v, lo, hi), format!("{:.1}", v)),
                Cell::NoData => (NO_DATA_COLOR, NO_DATA_LABEL.to_string()),
            };

            rects.push(Rectangle::new(
                [
                    (SegmentValue::Exact(x), SegmentValue::Exact(y)),
                    (SegmentValue::Exact(x + 1), SegmentValue::Exact(y + 1)),
                ],
                fill.filled(),
            ));
            notes.push(Text::new(
                note,
                (SegmentValue::CenterOf(x), SegmentValue::CenterOf(y)),
                note_style.clone(),
            ));
        }
    }

    chart.draw_series(rects).map_err(backend_error)?;
    chart.draw_series(notes).map_err(backend_error)?;
    Ok(())
}

//! Box plot with an overlaid strip of individual pulse values, per category.

use plotters::coord::Shift;
use plotters::prelude::*;

use super::{backend_error, category_axis, segment_label};
use crate::error::{RenderError, RenderResult};
use crate::models::{Dimension, TidyTable};
use crate::transform::summary::{summarize, values_by};

const BOX_COLOR: RGBColor = RGBColor(70, 130, 180);
const MEAN_COLOR: RGBColor = RGBColor(200, 30, 30);

#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalOptions {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
}

impl CategoricalOptions {
    pub fn for_dimension(by: Dimension) -> Self {
        let name = match by {
            Dimension::Diet => "Diet Type",
            Dimension::Exercise => "Exercise Type",
            Dimension::Time => "Time",
        };
        Self {
            title: format!("Pulse Values by {}", name),
            x_desc: name.to_string(),
            y_desc: "Pulse Value".to_string(),
        }
    }
}

/// Draw the pulse distribution of each category of `by` into `area`.
///
/// Each category gets a vertical box plot, its individual values as a strip
/// of translucent points and a cross at the mean.
pub fn draw_categorical<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    tidy: &TidyTable,
    by: Dimension,
    options: &CategoricalOptions,
) -> RenderResult<()> {
    let groups = values_by(tidy, by);
    if groups.is_empty() {
        return Err(RenderError::EmptyView(format!("no {} categories to plot", by)));
    }

    let labels: Vec<String> = groups.iter().map(|(c, _)| c.label().to_string()).collect();
    let (lo, hi) = groups
        .iter()
        .flat_map(|(_, values)| values.iter().copied())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    let pad = ((hi - lo) * 0.05).max(1.0);

    let mut chart = ChartBuilder::on(area)
        .caption(&options.title, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(
            category_axis(labels.len()),
            (lo - pad) as f32..(hi + pad) as f32,
        )
        .map_err(backend_error)?;

    let x_label = |v: &SegmentValue<i32>| segment_label(&labels, v);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len().max(2))
        .x_label_formatter(&x_label)
        .x_desc(options.x_desc.as_str())
        .y_desc(options.y_desc.as_str())
        .draw()
        .map_err(backend_error)?;

    chart
        .draw_series(groups.iter().enumerate().map(|(i, (_, values))| {
            Boxplot::new_vertical(SegmentValue::CenterOf(i as i32), &Quartiles::new(values))
                .width(30)
                .style(BOX_COLOR)
        }))
        .map_err(backend_error)?;

    chart
        .draw_series(groups.iter().enumerate().flat_map(|(i, (_, values))| {
            values.iter().map(move |v| {
                Circle::new(
                    (SegmentValue::CenterOf(i as i32), *v as f32),
                    3,
                    BLACK.mix(0.3).filled(),
                )
            })
        }))
        .map_err(backend_error)?;

    chart
        .draw_series(summarize(tidy, by).iter().enumerate().map(|(i, summary)| {
            Cross::new(
                (SegmentValue::CenterOf(i as i32), summary.mean as f32),
                5,
                MEAN_COLOR,
            )
        }))
        .map_err(backend_error)?;

    Ok(())
}

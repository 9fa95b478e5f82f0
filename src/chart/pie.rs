use std::f32::consts::{PI, TAU};

use crate::config::ChartConfig;
use crate::theme::palette_color;

use super::{ChartSpec, LegendEntry, UnsupportedReason, format_number, labels, numbers};

/// Category names for proportion charts always come from this field.
const NAME_FIELD: &str = "name";

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub name: String,
    pub value: f64,
    /// Whole-percent share of the total.
    pub percent: u32,
    pub label: String,
    pub color: String,
    /// Radians clockwise from twelve o'clock.
    pub start_angle: f32,
    pub end_angle: f32,
    pub label_x: f32,
    pub label_y: f32,
    /// `start`, `middle` or `end`.
    pub label_anchor: &'static str,
    pub tooltip: Option<String>,
}

impl PieSlice {
    pub fn span(&self) -> f32 {
        self.end_angle - self.start_angle
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieChart {
    pub cx: f32,
    pub cy: f32,
    pub radius: f32,
    pub slices: Vec<PieSlice>,
    pub legend: Option<Vec<LegendEntry>>,
}

/// Point on the circle of `radius` around (`cx`, `cy`) at `angle` radians
/// clockwise from twelve o'clock.
pub fn polar(cx: f32, cy: f32, radius: f32, angle: f32) -> (f32, f32) {
    (cx + radius * angle.sin(), cy - radius * angle.cos())
}

/// Slices take their colour from the shared palette by index, never from the
/// spec's single colour. Negative values count as zero; when nothing is left
/// the slices split the circle evenly and every share reads 0%.
pub(super) fn layout_pie(
    spec: &ChartSpec,
    width: f32,
    height: f32,
    config: &ChartConfig,
) -> Result<PieChart, UnsupportedReason> {
    let names = labels(&spec.data, NAME_FIELD)?;
    let values: Vec<f64> = numbers(&spec.data, &spec.data_key)?
        .into_iter()
        .map(|value| value.max(0.0))
        .collect();
    let total: f64 = values.iter().sum();

    let legend_height = if spec.show_legend { config.legend_height } else { 0.0 };
    let cx = width / 2.0;
    let cy = (height - legend_height) * config.pie_center_y_ratio;
    let radius = (width.min(height - legend_height) * config.pie_radius_ratio).max(1.0);
    let even_span = TAU / values.len() as f32;

    let mut angle = 0.0f32;
    let mut slices = Vec::with_capacity(values.len());
    for (index, (name, value)) in names.into_iter().zip(values).enumerate() {
        let (share, span) = if total > 0.0 {
            (value / total, (value / total) as f32 * TAU)
        } else {
            (0.0, even_span)
        };
        let percent = (share * 100.0).round() as u32;
        let middle = angle + span / 2.0;
        let (label_x, label_y) = polar(cx, cy, radius + config.label_font_size * 1.5, middle);
        let label_anchor = match middle {
            a if (a - PI).abs() < 0.1 || a < 0.1 || (TAU - a) < 0.1 => "middle",
            a if a < PI => "start",
            _ => "end",
        };
        slices.push(PieSlice {
            label: format!("{name} {percent}%"),
            tooltip: spec
                .show_tooltip
                .then(|| format!("{name}: {}", format_number(value))),
            color: palette_color(index).to_string(),
            name,
            value,
            percent,
            start_angle: angle,
            end_angle: angle + span,
            label_x,
            label_y,
            label_anchor,
        });
        angle += span;
    }

    let legend = spec.show_legend.then(|| {
        slices
            .iter()
            .map(|slice| LegendEntry {
                label: slice.name.clone(),
                color: slice.color.clone(),
            })
            .collect()
    });

    Ok(PieChart {
        cx,
        cy,
        radius,
        slices,
        legend,
    })
}

use crate::config::ChartConfig;

use super::axis::{LinearScale, nice_domain, plot_area, value_ticks};
use super::{
    ChartSpec, LegendEntry, PlotArea, PointMark, Tick, UnsupportedReason, format_number, numbers,
    series_legend,
};

const X_FIELD: &str = "x";
const Y_FIELD: &str = "y";

/// Coordinate-plane chart. Reads the fixed `x` and `y` fields of each point;
/// `dataKey` and `categoryKey` play no part in placement.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterChart {
    pub plot: PlotArea,
    pub x_ticks: Vec<Tick>,
    pub y_ticks: Vec<Tick>,
    pub grid_dasharray: String,
    pub color: String,
    pub radius: f32,
    pub points: Vec<PointMark>,
    pub legend: Option<Vec<LegendEntry>>,
}

pub(super) fn layout_scatter(
    spec: &ChartSpec,
    width: f32,
    height: f32,
    config: &ChartConfig,
) -> Result<ScatterChart, UnsupportedReason> {
    let xs = numbers(&spec.data, X_FIELD)?;
    let ys = numbers(&spec.data, Y_FIELD)?;

    let legend = series_legend(spec);
    let plot = plot_area(width, height, legend.is_some(), config);

    let (x_lo, x_hi, x_step) = nice_domain(min_of(&xs), max_of(&xs), config.y_ticks);
    let (y_lo, y_hi, y_step) = nice_domain(min_of(&ys), max_of(&ys), config.y_ticks);
    let x_scale = LinearScale {
        min: x_lo,
        max: x_hi,
        start: plot.x,
        end: plot.right(),
    };
    let y_scale = LinearScale {
        min: y_lo,
        max: y_hi,
        start: plot.bottom(),
        end: plot.y,
    };

    let points = xs
        .iter()
        .zip(&ys)
        .map(|(x, y)| PointMark {
            x: x_scale.map(*x),
            y: y_scale.map(*y),
            tooltip: spec
                .show_tooltip
                .then(|| format!("x: {}, y: {}", format_number(*x), format_number(*y))),
        })
        .collect();

    Ok(ScatterChart {
        plot,
        x_ticks: value_ticks(&x_scale, x_step),
        y_ticks: value_ticks(&y_scale, y_step),
        grid_dasharray: config.grid_dasharray.clone(),
        color: spec.color.clone(),
        radius: config.scatter_radius,
        points,
        legend,
    })
}

// Both axes include zero, matching the value axis of the categorical charts.
fn min_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(0.0, f64::min)
}

fn max_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(0.0, f64::max)
}

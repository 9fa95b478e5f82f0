use crate::config::ChartConfig;

use super::{ChartSpec, LegendEntry, UnsupportedReason, format_number, labels, numbers, series_legend};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartesianKind {
    Bar,
    Line,
    Area,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PlotArea {
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// Axis tick: `pos` is an x coordinate on the horizontal axis and a y
/// coordinate on the vertical one.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub label: String,
    pub pos: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarMark {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub tooltip: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointMark {
    pub x: f32,
    pub y: f32,
    pub tooltip: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CartesianMarks {
    Bars {
        bars: Vec<BarMark>,
        radius: f32,
    },
    Line {
        points: Vec<PointMark>,
        stroke_width: f32,
        dot_radius: f32,
    },
    Area {
        points: Vec<PointMark>,
        baseline: f32,
        stroke_width: f32,
        fill_opacity: f32,
    },
}

/// Bar, line and area charts: categorical x axis, numeric y axis.
#[derive(Debug, Clone, PartialEq)]
pub struct CartesianChart {
    pub kind: CartesianKind,
    pub plot: PlotArea,
    pub x_ticks: Vec<Tick>,
    pub y_ticks: Vec<Tick>,
    pub grid_dasharray: String,
    pub color: String,
    pub marks: CartesianMarks,
    pub legend: Option<Vec<LegendEntry>>,
}

/// Maps data values onto a pixel range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct LinearScale {
    pub min: f64,
    pub max: f64,
    pub start: f32,
    pub end: f32,
}

impl LinearScale {
    pub fn map(&self, value: f64) -> f32 {
        let span = self.max - self.min;
        if span.abs() < f64::EPSILON {
            return self.start;
        }
        let t = ((value - self.min) / span) as f32;
        self.start + (self.end - self.start) * t
    }
}

/// Plot rectangle left after margins, axis gutters and the legend band.
pub(super) fn plot_area(width: f32, height: f32, legend: bool, config: &ChartConfig) -> PlotArea {
    let x = config.margin_left + config.y_axis_width;
    let y = config.margin_top;
    let legend_height = if legend { config.legend_height } else { 0.0 };
    PlotArea {
        x,
        y,
        width: (width - x - config.margin_right).max(1.0),
        height: (height - y - config.margin_bottom - config.x_axis_height - legend_height)
            .max(1.0),
    }
}

/// Rounds `[min, max]` outwards to a step of 1, 2, 2.5 or 5 times a power of ten.
pub(super) fn nice_domain(min: f64, max: f64, ticks: usize) -> (f64, f64, f64) {
    let (min, max) = if (max - min).abs() < f64::EPSILON {
        if max == 0.0 { (0.0, 1.0) } else { (min.min(0.0), max.max(0.0)) }
    } else {
        (min, max)
    };
    let intervals = ticks.saturating_sub(1).max(1) as f64;
    let raw = (max - min) / intervals;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 2.5, 5.0, 10.0]
        .into_iter()
        .map(|factor| factor * magnitude)
        .find(|step| *step >= raw)
        .unwrap_or(10.0 * magnitude);
    let lo = (min / step).floor() * step;
    let hi = (max / step).ceil() * step;
    (lo, hi, step)
}

pub(super) fn value_ticks(scale: &LinearScale, step: f64) -> Vec<Tick> {
    let count = ((scale.max - scale.min) / step).round() as usize;
    (0..=count)
        .map(|i| {
            let value = scale.min + step * i as f64;
            Tick {
                label: format_number(value),
                pos: scale.map(value),
            }
        })
        .collect()
}

pub(super) fn layout_cartesian(
    kind: CartesianKind,
    spec: &ChartSpec,
    width: f32,
    height: f32,
    config: &ChartConfig,
) -> Result<CartesianChart, UnsupportedReason> {
    let categories = labels(&spec.data, &spec.category_key)?;
    let values = numbers(&spec.data, &spec.data_key)?;

    let legend = series_legend(spec);
    let plot = plot_area(width, height, legend.is_some(), config);

    let lowest = values.iter().copied().fold(0.0_f64, f64::min);
    let highest = values.iter().copied().fold(0.0_f64, f64::max);
    let (lo, hi, step) = nice_domain(lowest, highest, config.y_ticks);
    let y_scale = LinearScale {
        min: lo,
        max: hi,
        start: plot.bottom(),
        end: plot.y,
    };
    let band = plot.width / categories.len() as f32;
    let center = |index: usize| plot.x + band * (index as f32 + 0.5);

    let x_ticks = categories
        .iter()
        .enumerate()
        .map(|(index, label)| Tick {
            label: label.clone(),
            pos: center(index),
        })
        .collect();
    let tooltip = |index: usize| {
        spec.show_tooltip
            .then(|| format!("{}: {}", categories[index], format_number(values[index])))
    };
    let baseline = y_scale.map(0.0_f64.clamp(lo, hi));

    let marks = match kind {
        CartesianKind::Bar => {
            let inset = band * config.bar_gap_ratio;
            let bars = values
                .iter()
                .enumerate()
                .map(|(index, value)| {
                    let top = y_scale.map(*value);
                    BarMark {
                        x: plot.x + band * index as f32 + inset,
                        y: top.min(baseline),
                        width: (band - inset * 2.0).max(1.0),
                        height: (baseline - top).abs(),
                        tooltip: tooltip(index),
                    }
                })
                .collect();
            CartesianMarks::Bars {
                bars,
                radius: config.bar_radius,
            }
        }
        CartesianKind::Line | CartesianKind::Area => {
            let points = values
                .iter()
                .enumerate()
                .map(|(index, value)| PointMark {
                    x: center(index),
                    y: y_scale.map(*value),
                    tooltip: tooltip(index),
                })
                .collect();
            if kind == CartesianKind::Line {
                CartesianMarks::Line {
                    points,
                    stroke_width: config.line_stroke_width,
                    dot_radius: config.dot_radius,
                }
            } else {
                CartesianMarks::Area {
                    points,
                    baseline,
                    stroke_width: config.area_stroke_width,
                    fill_opacity: config.area_fill_opacity,
                }
            }
        }
    };

    Ok(CartesianChart {
        kind,
        plot,
        x_ticks,
        y_ticks: value_ticks(&y_scale, step),
        grid_dasharray: config.grid_dasharray.clone(),
        color: spec.color.clone(),
        marks,
        legend,
    })
}

/// SVG path through `points` using monotone cubic interpolation in x, so the
/// curve never overshoots between neighbouring values.
pub fn monotone_path(points: &[(f32, f32)]) -> String {
    let Some(&(x0, y0)) = points.first() else {
        return String::new();
    };
    let mut path = format!("M{x0:.2},{y0:.2}");
    if points.len() == 2 {
        let (x1, y1) = points[1];
        path.push_str(&format!(" L{x1:.2},{y1:.2}"));
        return path;
    }
    if points.len() < 2 {
        return path;
    }

    let n = points.len();
    let secants: Vec<f32> = points
        .windows(2)
        .map(|pair| {
            let dx = pair[1].0 - pair[0].0;
            if dx.abs() < f32::EPSILON {
                0.0
            } else {
                (pair[1].1 - pair[0].1) / dx
            }
        })
        .collect();
    let mut tangents = vec![0.0f32; n];
    tangents[0] = secants[0];
    tangents[n - 1] = secants[n - 2];
    for i in 1..n - 1 {
        tangents[i] = if secants[i - 1] * secants[i] <= 0.0 {
            0.0
        } else {
            (secants[i - 1] + secants[i]) / 2.0
        };
    }
    for i in 0..n - 1 {
        if secants[i] == 0.0 {
            tangents[i] = 0.0;
            tangents[i + 1] = 0.0;
            continue;
        }
        let a = tangents[i] / secants[i];
        let b = tangents[i + 1] / secants[i];
        let h = a * a + b * b;
        if h > 9.0 {
            let t = 3.0 / h.sqrt();
            tangents[i] = t * a * secants[i];
            tangents[i + 1] = t * b * secants[i];
        }
    }

    for i in 0..n - 1 {
        let (xa, ya) = points[i];
        let (xb, yb) = points[i + 1];
        let third = (xb - xa) / 3.0;
        let c1 = (xa + third, ya + tangents[i] * third);
        let c2 = (xb - third, yb - tangents[i + 1] * third);
        path.push_str(&format!(
            " C{:.2},{:.2} {:.2},{:.2} {xb:.2},{yb:.2}",
            c1.0, c1.1, c2.0, c2.1
        ));
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::tests::{point, spec};
    use crate::chart::{ChartBody, render_chart};

    #[test]
    fn nice_domain_rounds_outwards() {
        assert_eq!(nice_domain(0.0, 26.0, 5), (0.0, 30.0, 10.0));
        assert_eq!(nice_domain(-3.0, 9.0, 5), (-5.0, 10.0, 5.0));
        let (lo, hi, _) = nice_domain(0.0, 0.0, 5);
        assert_eq!(lo, 0.0);
        assert!(hi >= 1.0);
    }

    #[test]
    fn bar_line_and_area_share_one_frame() {
        let data = vec![point("2021", 5.0), point("2022", 12.0), point("2023", 18.0)];
        let config = ChartConfig::default();
        let frames: Vec<_> = ["bar", "line", "area"]
            .into_iter()
            .map(|tag| match render_chart(&spec(tag, data.clone()), 640.0, 360.0, &config).body {
                ChartBody::Cartesian(chart) => (chart.plot, chart.x_ticks, chart.y_ticks),
                other => panic!("expected cartesian chart, got {other:?}"),
            })
            .collect();
        assert_eq!(frames[0], frames[1]);
        assert_eq!(frames[1], frames[2]);
        let labels: Vec<_> = frames[0].1.iter().map(|tick| tick.label.as_str()).collect();
        assert_eq!(labels, vec!["2021", "2022", "2023"]);
    }

    #[test]
    fn marks_differ_only_in_geometry_parameters() {
        let data = vec![point("A", 1.0), point("B", 4.0)];
        let config = ChartConfig::default();
        let ChartBody::Cartesian(line) = render_chart(&spec("line", data.clone()), 640.0, 360.0, &config).body else {
            panic!("expected cartesian chart");
        };
        let ChartBody::Cartesian(area) = render_chart(&spec("area", data.clone()), 640.0, 360.0, &config).body else {
            panic!("expected cartesian chart");
        };
        let ChartBody::Cartesian(bar) = render_chart(&spec("bar", data), 640.0, 360.0, &config).body else {
            panic!("expected cartesian chart");
        };
        assert!(matches!(line.marks, CartesianMarks::Line { stroke_width, dot_radius, .. } if stroke_width == 3.0 && dot_radius == 4.0));
        assert!(matches!(area.marks, CartesianMarks::Area { fill_opacity, .. } if fill_opacity == 0.6));
        let CartesianMarks::Bars { bars, radius } = bar.marks else {
            panic!("expected bars");
        };
        assert_eq!(radius, 4.0);
        assert!(bars[1].height > bars[0].height);
        assert!((bars[0].y + bars[0].height - bar.plot.bottom()).abs() < 0.01);
    }

    #[test]
    fn tooltips_and_legend_follow_toggles() {
        let data = vec![point("A", 1.0), point("B", 4.0)];
        let mut chart = spec("bar", data);
        chart.show_legend = true;
        chart.show_tooltip = false;
        let ChartBody::Cartesian(bar) = render_chart(&chart, 640.0, 360.0, &ChartConfig::default()).body else {
            panic!("expected cartesian chart");
        };
        let legend = bar.legend.expect("legend shown");
        assert_eq!(legend[0].label, "name");
        assert_eq!(legend[0].color, "#123456");
        let CartesianMarks::Bars { bars, .. } = bar.marks else {
            panic!("expected bars");
        };
        assert!(bars.iter().all(|bar| bar.tooltip.is_none()));

        chart.show_tooltip = true;
        let ChartBody::Cartesian(bar) = render_chart(&chart, 640.0, 360.0, &ChartConfig::default()).body else {
            panic!("expected cartesian chart");
        };
        let CartesianMarks::Bars { bars, .. } = bar.marks else {
            panic!("expected bars");
        };
        assert_eq!(bars[1].tooltip.as_deref(), Some("B: 4"));
    }

    #[test]
    fn monotone_path_passes_through_every_point() {
        let points = [(0.0, 10.0), (10.0, 5.0), (20.0, 5.0), (30.0, 0.0)];
        let path = monotone_path(&points);
        assert!(path.starts_with("M0.00,10.00"));
        assert_eq!(path.matches(" C").count(), 3);
        assert!(path.ends_with("30.00,0.00"));
        assert_eq!(monotone_path(&[(0.0, 0.0), (1.0, 1.0)]), "M0.00,0.00 L1.00,1.00");
    }
}

//! Chart dispatch: one data model, five renderings selected by a type tag.
//!
//! [`render_chart`] never fails. Anything it cannot draw becomes an
//! [`UnsupportedChart`] artifact naming the reason, so one bad visual does not
//! abort the rest of the slide.

mod axis;
mod pie;
mod scatter;

use std::fmt;

use tracing::{debug, warn};

use crate::config::ChartConfig;
use crate::schema::{FieldValue, Record, SlideInstance};

pub use axis::{
    BarMark, CartesianChart, CartesianKind, CartesianMarks, PlotArea, PointMark, Tick,
    monotone_path,
};
pub use pie::{PieChart, PieSlice, polar};
pub use scatter::ScatterChart;

/// Inclusive bounds on the number of data points a chart accepts.
pub const MIN_POINTS: usize = 2;
pub const MAX_POINTS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartType {
    Bar,
    Line,
    Area,
    Pie,
    Scatter,
}

impl ChartType {
    pub const ALL: [ChartType; 5] = [
        ChartType::Bar,
        ChartType::Line,
        ChartType::Pie,
        ChartType::Area,
        ChartType::Scatter,
    ];

    /// Exact, case-sensitive match against the tag set.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "bar" => Some(ChartType::Bar),
            "line" => Some(ChartType::Line),
            "area" => Some(ChartType::Area),
            "pie" => Some(ChartType::Pie),
            "scatter" => Some(ChartType::Scatter),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::Line => "line",
            ChartType::Area => "area",
            ChartType::Pie => "pie",
            ChartType::Scatter => "scatter",
        }
    }
}

/// Chart portion of a slide. The tag stays a string so unknown tags survive
/// until dispatch, where they degrade instead of failing.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub chart_type: String,
    pub data: Vec<Record>,
    pub data_key: String,
    pub category_key: String,
    pub color: String,
    pub show_legend: bool,
    pub show_tooltip: bool,
}

impl ChartSpec {
    pub fn from_instance(instance: &SlideInstance) -> Self {
        Self {
            chart_type: instance.text("chartType").to_string(),
            data: instance.list("data").to_vec(),
            data_key: instance.text("dataKey").to_string(),
            category_key: instance.text("categoryKey").to_string(),
            color: instance.text("color").to_string(),
            show_legend: instance.boolean("showLegend"),
            show_tooltip: instance.boolean("showTooltip"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UnsupportedReason {
    UnknownType(String),
    PointCount(usize),
    MissingField { point: usize, field: String },
}

impl fmt::Display for UnsupportedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnsupportedReason::UnknownType(tag) => write!(f, "unknown chart type `{tag}`"),
            UnsupportedReason::PointCount(count) => write!(
                f,
                "expected {MIN_POINTS} to {MAX_POINTS} data points, found {count}"
            ),
            UnsupportedReason::MissingField { point, field } => {
                write!(f, "data point {point} has no usable `{field}`")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnsupportedChart {
    pub reason: UnsupportedReason,
}

impl UnsupportedChart {
    pub fn title(&self) -> &'static str {
        match self.reason {
            UnsupportedReason::UnknownType(_) => "Unsupported chart type",
            _ => "Unsupported chart data",
        }
    }

    pub fn detail(&self) -> String {
        self.reason.to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartBody {
    Cartesian(CartesianChart),
    Pie(PieChart),
    Scatter(ScatterChart),
    Unsupported(UnsupportedChart),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartArtifact {
    pub width: f32,
    pub height: f32,
    pub body: ChartBody,
}

impl ChartArtifact {
    pub fn is_unsupported(&self) -> bool {
        matches!(self.body, ChartBody::Unsupported(_))
    }
}

/// Lays out `spec` in a `width` x `height` box.
///
/// The type tag is checked before any data is read; an unknown tag yields the
/// unsupported artifact without touching the data points.
pub fn render_chart(spec: &ChartSpec, width: f32, height: f32, config: &ChartConfig) -> ChartArtifact {
    let body = match dispatch(spec, width, height, config) {
        Ok(body) => body,
        Err(reason) => {
            warn!(chart_type = %spec.chart_type, %reason, "rendering unsupported chart placeholder");
            ChartBody::Unsupported(UnsupportedChart { reason })
        }
    };
    ChartArtifact {
        width,
        height,
        body,
    }
}

fn dispatch(
    spec: &ChartSpec,
    width: f32,
    height: f32,
    config: &ChartConfig,
) -> Result<ChartBody, UnsupportedReason> {
    let Some(chart_type) = ChartType::from_tag(&spec.chart_type) else {
        return Err(UnsupportedReason::UnknownType(spec.chart_type.clone()));
    };
    let count = spec.data.len();
    if !(MIN_POINTS..=MAX_POINTS).contains(&count) {
        return Err(UnsupportedReason::PointCount(count));
    }
    debug!(chart_type = chart_type.tag(), points = count, "dispatching chart");

    let body = match chart_type {
        ChartType::Bar => ChartBody::Cartesian(axis::layout_cartesian(
            CartesianKind::Bar,
            spec,
            width,
            height,
            config,
        )?),
        ChartType::Line => ChartBody::Cartesian(axis::layout_cartesian(
            CartesianKind::Line,
            spec,
            width,
            height,
            config,
        )?),
        ChartType::Area => ChartBody::Cartesian(axis::layout_cartesian(
            CartesianKind::Area,
            spec,
            width,
            height,
            config,
        )?),
        ChartType::Pie => ChartBody::Pie(pie::layout_pie(spec, width, height, config)?),
        ChartType::Scatter => {
            ChartBody::Scatter(scatter::layout_scatter(spec, width, height, config)?)
        }
    };
    Ok(body)
}

/// Legend entry shared by the single-series charts.
fn series_legend(spec: &ChartSpec) -> Option<Vec<LegendEntry>> {
    spec.show_legend.then(|| {
        vec![LegendEntry {
            label: spec.category_key.clone(),
            color: spec.color.clone(),
        }]
    })
}

/// Reads a numeric field from every point or reports the first point lacking it.
fn numbers(data: &[Record], field: &str) -> Result<Vec<f64>, UnsupportedReason> {
    data.iter()
        .enumerate()
        .map(|(point, record)| {
            record
                .number(field)
                .filter(|value| value.is_finite())
                .ok_or_else(|| UnsupportedReason::MissingField {
                    point,
                    field: field.to_string(),
                })
        })
        .collect()
}

/// Reads a label field from every point. Numbers and booleans are formatted.
fn labels(data: &[Record], field: &str) -> Result<Vec<String>, UnsupportedReason> {
    data.iter()
        .enumerate()
        .map(|(point, record)| {
            let label = match record.get(field) {
                Some(FieldValue::Text(text)) => Some(text.clone()),
                Some(FieldValue::Number(number)) => Some(format_number(*number)),
                Some(FieldValue::Bool(flag)) => Some(flag.to_string()),
                _ => None,
            };
            label.ok_or_else(|| UnsupportedReason::MissingField {
                point,
                field: field.to_string(),
            })
        })
        .collect()
}

pub fn format_number(value: f64) -> String {
    if value.fract().abs() < 1e-9 {
        format!("{value:.0}")
    } else {
        let text = format!("{value:.2}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::CHART_PALETTE;

    pub(super) fn spec(chart_type: &str, data: Vec<Record>) -> ChartSpec {
        ChartSpec {
            chart_type: chart_type.to_string(),
            data,
            data_key: "value".to_string(),
            category_key: "name".to_string(),
            color: "#123456".to_string(),
            show_legend: false,
            show_tooltip: true,
        }
    }

    pub(super) fn point(name: &str, value: f64) -> Record {
        Record::from_pairs([
            ("name", FieldValue::from(name)),
            ("value", FieldValue::from(value)),
        ])
    }

    #[test]
    fn pie_percentages_and_palette_colours() {
        let artifact = render_chart(
            &spec("pie", vec![point("A", 1.0), point("B", 3.0)]),
            600.0,
            400.0,
            &ChartConfig::default(),
        );
        let ChartBody::Pie(pie) = artifact.body else {
            panic!("expected pie, got {:?}", artifact.body);
        };
        let labels: Vec<_> = pie.slices.iter().map(|slice| slice.label.as_str()).collect();
        assert_eq!(labels, vec!["A 25%", "B 75%"]);
        assert_eq!(pie.slices[0].color, CHART_PALETTE[0]);
        assert_eq!(pie.slices[1].color, CHART_PALETTE[1]);
    }

    #[test]
    fn unknown_tag_degrades_without_reading_data() {
        // Points that would fail every other check.
        let artifact = render_chart(
            &spec("donut", vec![Record::new()]),
            600.0,
            400.0,
            &ChartConfig::default(),
        );
        assert_eq!(
            artifact.body,
            ChartBody::Unsupported(UnsupportedChart {
                reason: UnsupportedReason::UnknownType("donut".to_string())
            })
        );
    }

    #[test]
    fn tags_are_case_sensitive() {
        assert_eq!(ChartType::from_tag("bar"), Some(ChartType::Bar));
        assert_eq!(ChartType::from_tag("Bar"), None);
        for chart_type in ChartType::ALL {
            assert_eq!(ChartType::from_tag(chart_type.tag()), Some(chart_type));
        }
    }

    #[test]
    fn point_count_outside_bounds_degrades() {
        let one = render_chart(&spec("bar", vec![point("A", 1.0)]), 600.0, 400.0, &ChartConfig::default());
        assert!(matches!(
            one.body,
            ChartBody::Unsupported(UnsupportedChart {
                reason: UnsupportedReason::PointCount(1)
            })
        ));
        let many = (0..13).map(|i| point(&format!("P{i}"), i as f64)).collect();
        let artifact = render_chart(&spec("line", many), 600.0, 400.0, &ChartConfig::default());
        assert!(artifact.is_unsupported());
    }

    #[test]
    fn missing_data_key_names_the_point() {
        let mut chart = spec("area", vec![point("A", 1.0), point("B", 2.0)]);
        chart.data_key = "revenue".to_string();
        let artifact = render_chart(&chart, 600.0, 400.0, &ChartConfig::default());
        let ChartBody::Unsupported(unsupported) = artifact.body else {
            panic!("expected unsupported artifact");
        };
        assert_eq!(
            unsupported.reason,
            UnsupportedReason::MissingField {
                point: 0,
                field: "revenue".to_string()
            }
        );
        assert_eq!(unsupported.title(), "Unsupported chart data");
    }

    #[test]
    fn dispatch_does_not_mutate_the_spec() {
        let chart = spec("bar", vec![point("A", 1.0), point("B", 2.0)]);
        let before = chart.clone();
        let _ = render_chart(&chart, 600.0, 400.0, &ChartConfig::default());
        assert_eq!(chart, before);
    }

    #[test]
    fn numbers_format_without_trailing_zeros() {
        assert_eq!(format_number(2024.0), "2024");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(0.126), "0.13");
    }
}

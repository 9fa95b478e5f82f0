use crate::diagram::DiagramStyle;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Slide canvas geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SlideConfig {
    pub width: f32,
    pub height: f32,
    pub header_height: f32,
    pub padding_x: f32,
    pub padding_y: f32,
    pub gap: f32,
    pub line_height: f32,
    pub logo_height: f32,
    /// Measure text with calibrated per-glyph factors instead of system fonts.
    /// Keeps output identical across machines.
    pub fast_text_metrics: bool,
}

impl Default for SlideConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            header_height: 56.0,
            padding_x: 24.0,
            padding_y: 24.0,
            gap: 16.0,
            line_height: 1.4,
            logo_height: 32.0,
            fast_text_metrics: true,
        }
    }
}

impl SlideConfig {
    pub fn body_x(&self) -> f32 {
        self.padding_x
    }

    pub fn body_y(&self) -> f32 {
        self.header_height + self.padding_y
    }

    pub fn body_width(&self) -> f32 {
        (self.width - self.padding_x * 2.0).max(1.0)
    }

    pub fn body_height(&self) -> f32 {
        (self.height - self.header_height - self.padding_y * 2.0).max(1.0)
    }

    /// Width of one half of a two-column body.
    pub fn column_width(&self) -> f32 {
        ((self.body_width() - self.gap * 2.0) / 2.0).max(1.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartConfig {
    pub margin_top: f32,
    pub margin_right: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub y_axis_width: f32,
    pub x_axis_height: f32,
    pub legend_height: f32,
    pub label_font_size: f32,
    pub y_ticks: usize,
    pub grid_dasharray: String,
    pub bar_radius: f32,
    pub bar_gap_ratio: f32,
    pub line_stroke_width: f32,
    pub dot_radius: f32,
    pub area_stroke_width: f32,
    pub area_fill_opacity: f32,
    pub scatter_radius: f32,
    pub pie_radius_ratio: f32,
    pub pie_center_y_ratio: f32,
    pub max_height: f32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            margin_top: 10.0,
            margin_right: 20.0,
            margin_bottom: 30.0,
            margin_left: 0.0,
            y_axis_width: 56.0,
            x_axis_height: 24.0,
            legend_height: 24.0,
            label_font_size: 12.0,
            y_ticks: 5,
            grid_dasharray: "3 3".to_string(),
            bar_radius: 4.0,
            bar_gap_ratio: 0.1,
            line_stroke_width: 3.0,
            dot_radius: 4.0,
            area_stroke_width: 1.0,
            area_fill_opacity: 0.6,
            scatter_radius: 5.0,
            pie_radius_ratio: 0.35,
            pie_center_y_ratio: 0.45,
            max_height: 400.0,
        }
    }
}

/// How the out-of-process diagram compiler is invoked.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiagramConfig {
    pub command: String,
    pub args: Vec<String>,
    pub timeout_ms: Option<u64>,
    pub style: DiagramStyle,
    pub min_height: f32,
    pub max_height: f32,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            command: "mmdr".to_string(),
            args: vec!["-i".to_string(), "-".to_string()],
            timeout_ms: Some(30_000),
            style: DiagramStyle::default(),
            min_height: 300.0,
            max_height: 400.0,
        }
    }
}

impl DiagramConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub slide: SlideConfig,
    pub chart: ChartConfig,
    pub diagram: DiagramConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    accent_color: Option<String>,
    slide: Option<SlideConfig>,
    chart: Option<ChartConfig>,
    diagram: Option<DiagramConfig>,
}

/// Loads a JSON or JSON5 config file and merges it onto the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = json5::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme = Theme::named(theme_name)
            .ok_or_else(|| anyhow::anyhow!("unknown theme `{theme_name}`"))?;
    }
    if let Some(v) = parsed.font_family {
        config.theme.font_family = v;
    }
    if let Some(v) = parsed.font_size {
        config.theme.font_size = v;
    }
    if let Some(v) = parsed.accent_color {
        config.theme.accent_color = v;
    }
    if let Some(v) = parsed.slide {
        config.slide = v;
    }
    if let Some(v) = parsed.chart {
        config.chart = v;
    }
    if let Some(v) = parsed.diagram {
        config.diagram = v;
    }
    Ok(config)
}

use std::f32::consts::TAU;
use std::path::Path;

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::chart::{
    CartesianChart, CartesianMarks, ChartArtifact, ChartBody, LegendEntry, PieChart, PlotArea,
    ScatterChart, Tick, UnsupportedChart, format_number, monotone_path, polar,
};
use crate::config::{ChartConfig, Config};
use crate::diagram::{DisplayContent, ERROR_HINT, ERROR_TITLE};
use crate::richtext::{LineKind, RichTextBlock};
use crate::schema::ImageRef;
use crate::slide::{
    BlockContent, CARD_HEADING_GAP, CARD_NUMBER_SIZE, CARD_NUMBER_WIDTH, CARD_PADDING,
    ContentRating, DiagramBlock, Frame, SlideArtifact, SlideHeader, TextAlign,
};
use crate::text::{TextBlock, TextStyle, text_width};
use crate::theme::Theme;

static PROLOG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^\s*(?:<\?xml.*?\?>\s*)?(?:<!DOCTYPE[^>]*>\s*)?").unwrap());
static ROOT_SIZE_ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\s(?:width|height|x|y|style)\s*=\s*"[^"]*""#).unwrap());

const BADGE_FONT_SIZE: f32 = 14.0;
const LEGEND_SWATCH: f32 = 10.0;

/// Serializes a laid-out slide.
pub fn render_slide_svg(artifact: &SlideArtifact, config: &Config) -> String {
    let theme = &config.theme;
    let width = artifact.width;
    let height = artifact.height;
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\" font-family=\"{}\">",
        escape_xml(&theme.font_family)
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));
    svg.push_str("<defs>");
    svg.push_str(&format!(
        "<filter id=\"card-shadow\" x=\"-10%\" y=\"-10%\" width=\"120%\" height=\"130%\"><feDropShadow dx=\"0\" dy=\"2\" stdDeviation=\"5\" flood-color=\"{}\"/></filter>",
        theme.card_shadow
    ));
    svg.push_str("</defs>");

    svg.push_str(&header_svg(&artifact.header, width, config));

    for block in &artifact.blocks {
        let frame = &block.frame;
        match &block.content {
            BlockContent::Text {
                block,
                font_size,
                bold,
                color,
                align,
            } => {
                let x = match align {
                    TextAlign::Start => frame.x,
                    TextAlign::Middle => frame.center_x(),
                };
                let style = text_style(config, *font_size);
                svg.push_str(&text_lines_svg(x, frame.y, &block.lines, &style, *bold, color, *align));
            }
            BlockContent::RichText(block) => svg.push_str(&rich_text_svg(frame, block, config)),
            BlockContent::Image(image) => svg.push_str(&image_svg(frame, image, "xMidYMid meet")),
            BlockContent::Card {
                number,
                heading,
                heading_size,
                description,
                description_size,
            } => svg.push_str(&card_svg(
                frame,
                number.as_deref(),
                (heading, *heading_size),
                (description, *description_size),
                config,
            )),
            BlockContent::Chart(chart) => svg.push_str(&chart_svg(frame, chart, config)),
            BlockContent::Diagram(diagram) => svg.push_str(&diagram_svg(frame, diagram, theme)),
            BlockContent::Divider => svg.push_str(&format!(
                "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"1\"/>",
                frame.x,
                frame.y,
                frame.x + frame.width,
                frame.y,
                theme.divider_color
            )),
        }
    }

    svg.push_str("</svg>");
    svg
}

fn text_style(config: &Config, font_size: f32) -> TextStyle<'_> {
    TextStyle {
        font_family: &config.theme.font_family,
        font_size,
        line_height: config.slide.line_height,
        fast_metrics: config.slide.fast_text_metrics,
    }
}

fn header_svg(header: &SlideHeader, width: f32, config: &Config) -> String {
    let theme = &config.theme;
    let slide = &config.slide;
    let mut svg = String::new();
    let center_y = slide.header_height / 2.0;

    svg.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"{}\" font-weight=\"bold\" fill=\"{}\">{}. {}</text>",
        slide.padding_x,
        center_y + theme.font_size * 0.35,
        theme.font_size,
        theme.text_color,
        format_number(header.slide_number),
        escape_xml(&header.section_title)
    ));

    let mut right = width - slide.padding_x;
    if let Some(logo) = &header.logo {
        let logo_width = slide.logo_height * 3.0;
        right -= logo_width;
        let frame = Frame::new(
            right,
            center_y - slide.logo_height / 2.0,
            logo_width,
            slide.logo_height,
        );
        svg.push_str(&image_svg(&frame, logo, "xMaxYMid meet"));
        right -= slide.gap;
    }

    let color = match header.rating {
        ContentRating::Restricted => &theme.rating_restricted,
        ContentRating::Internal => &theme.rating_internal,
        ContentRating::Unclassified => &theme.rating_unclassified,
    };
    let label = header.rating.badge_text();
    let label_width = text_width(label, &text_style(config, BADGE_FONT_SIZE));
    let badge_width = label_width + 16.0;
    let badge_height = BADGE_FONT_SIZE + 10.0;
    let badge_x = right - badge_width;
    svg.push_str(&format!(
        "<rect x=\"{badge_x:.2}\" y=\"{:.2}\" width=\"{badge_width:.2}\" height=\"{badge_height:.2}\" rx=\"4\" ry=\"4\" fill=\"none\" stroke=\"{color}\" stroke-width=\"1\"/>",
        center_y - badge_height / 2.0
    ));
    svg.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-size=\"{BADGE_FONT_SIZE}\" font-weight=\"600\" fill=\"{color}\">{label}</text>",
        badge_x + badge_width / 2.0,
        center_y + BADGE_FONT_SIZE * 0.35
    ));

    svg.push_str(&format!(
        "<line x1=\"0\" y1=\"{h:.2}\" x2=\"{width}\" y2=\"{h:.2}\" stroke=\"{}\" stroke-width=\"2\"/>",
        theme.border_color,
        h = slide.header_height - 1.0
    ));
    svg
}

/// Baseline of line `index` in a block whose top edge is `top`.
fn baseline(top: f32, index: usize, advance: f32) -> f32 {
    top + advance * (index as f32 + 1.0) - advance * 0.3
}

fn text_lines_svg(
    x: f32,
    top: f32,
    lines: &[String],
    style: &TextStyle<'_>,
    bold: bool,
    color: &str,
    align: TextAlign,
) -> String {
    let anchor = match align {
        TextAlign::Start => "start",
        TextAlign::Middle => "middle",
    };
    let weight = if bold { " font-weight=\"bold\"" } else { "" };
    let advance = style.line_advance();
    let mut text = format!(
        "<text x=\"{x:.2}\" y=\"{:.2}\" text-anchor=\"{anchor}\" font-size=\"{}\"{weight} fill=\"{color}\">",
        baseline(top, 0, advance),
        style.font_size
    );
    for (idx, line) in lines.iter().enumerate() {
        let dy = if idx == 0 { 0.0 } else { advance };
        text.push_str(&format!(
            "<tspan x=\"{x:.2}\" dy=\"{dy:.2}\">{}</tspan>",
            escape_xml(line)
        ));
    }
    text.push_str("</text>");
    text
}

fn rich_text_svg(frame: &Frame, block: &RichTextBlock, config: &Config) -> String {
    let theme = &config.theme;
    let advance_ratio = config.slide.line_height;
    let mut svg = String::from("<g>");
    for line in &block.lines {
        let x = frame.x + line.x;
        let y = frame.y + line.y;
        match line.kind {
            LineKind::Rule => {
                svg.push_str(&format!(
                    "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"1\"/>",
                    frame.x,
                    y - line.font_size * 0.35,
                    frame.x + frame.width,
                    y - line.font_size * 0.35,
                    theme.divider_color
                ));
                continue;
            }
            LineKind::Code => {
                let advance = line.font_size * advance_ratio;
                svg.push_str(&format!(
                    "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{advance:.2}\" fill=\"{}\"/>",
                    frame.x,
                    y - advance * 0.7,
                    frame.width,
                    theme.code_background
                ));
            }
            _ => {}
        }
        if let Some(marker) = &line.marker {
            svg.push_str(&format!(
                "<text x=\"{:.2}\" y=\"{y:.2}\" text-anchor=\"end\" font-size=\"{}\" fill=\"{}\">{}</text>",
                x - 6.0,
                line.font_size,
                theme.text_color,
                escape_xml(marker)
            ));
        }
        let family = if line.kind == LineKind::Code {
            " font-family=\"ui-monospace, SFMono-Regular, Menlo, monospace\""
        } else {
            ""
        };
        let weight = if line.bold { " font-weight=\"bold\"" } else { "" };
        svg.push_str(&format!(
            "<text x=\"{x:.2}\" y=\"{y:.2}\" font-size=\"{}\"{family}{weight} fill=\"{}\">{}</text>",
            line.font_size,
            theme.text_color,
            escape_xml(&line.text)
        ));
    }
    svg.push_str("</g>");
    svg
}

fn image_svg(frame: &Frame, image: &ImageRef, aspect: &str) -> String {
    let title = if image.prompt.is_empty() {
        String::new()
    } else {
        format!("<title>{}</title>", escape_xml(&image.prompt))
    };
    format!(
        "<image href=\"{}\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" preserveAspectRatio=\"{aspect}\">{title}</image>",
        escape_xml(&image.url),
        frame.x,
        frame.y,
        frame.width,
        frame.height
    )
}

fn card_svg(
    frame: &Frame,
    number: Option<&str>,
    heading: (&TextBlock, f32),
    description: (&TextBlock, f32),
    config: &Config,
) -> String {
    let theme = &config.theme;
    let mut svg = format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"8\" ry=\"8\" fill=\"{}\" filter=\"url(#card-shadow)\"/>",
        frame.x, frame.y, frame.width, frame.height, theme.card_background
    );
    let mut text_x = frame.x + CARD_PADDING;
    let top = frame.y + CARD_PADDING;
    if let Some(number) = number {
        svg.push_str(&format!(
            "<text x=\"{text_x:.2}\" y=\"{:.2}\" font-size=\"{CARD_NUMBER_SIZE}\" font-weight=\"bold\" fill=\"{}\">{}</text>",
            top + CARD_NUMBER_SIZE,
            theme.accent_color,
            escape_xml(number)
        ));
        text_x += CARD_NUMBER_WIDTH;
    }
    let (heading, heading_size) = heading;
    let (description, description_size) = description;
    svg.push_str(&text_lines_svg(
        text_x,
        top,
        &heading.lines,
        &text_style(config, heading_size),
        true,
        &theme.text_color,
        TextAlign::Start,
    ));
    svg.push_str(&text_lines_svg(
        text_x,
        top + heading.height + CARD_HEADING_GAP,
        &description.lines,
        &text_style(config, description_size),
        false,
        &theme.muted_text_color,
        TextAlign::Start,
    ));
    svg
}

fn chart_svg(frame: &Frame, chart: &ChartArtifact, config: &Config) -> String {
    let mut svg = format!(
        "<g transform=\"translate({:.2},{:.2})\">",
        frame.x, frame.y
    );
    let theme = &config.theme;
    let chart_config = &config.chart;
    match &chart.body {
        ChartBody::Cartesian(cartesian) => {
            svg.push_str(&cartesian_svg(cartesian, theme, chart_config));
            if let Some(legend) = &cartesian.legend {
                svg.push_str(&legend_svg(legend, chart.width, chart.height, config));
            }
        }
        ChartBody::Pie(pie) => {
            svg.push_str(&pie_svg(pie, chart_config));
            if let Some(legend) = &pie.legend {
                svg.push_str(&legend_svg(legend, chart.width, chart.height, config));
            }
        }
        ChartBody::Scatter(scatter) => {
            svg.push_str(&scatter_svg(scatter, theme, chart_config));
            if let Some(legend) = &scatter.legend {
                svg.push_str(&legend_svg(legend, chart.width, chart.height, config));
            }
        }
        ChartBody::Unsupported(unsupported) => {
            svg.push_str(&unsupported_svg(unsupported, chart.width, chart.height, theme));
        }
    }
    svg.push_str("</g>");
    svg
}

/// Dashed grid, axis lines and tick labels shared by cartesian and scatter charts.
fn axes_svg(
    plot: &PlotArea,
    x_ticks: &[Tick],
    y_ticks: &[Tick],
    dasharray: &str,
    theme: &Theme,
    config: &ChartConfig,
) -> String {
    let mut svg = String::new();
    for tick in y_ticks {
        svg.push_str(&format!(
            "<line x1=\"{:.2}\" y1=\"{y:.2}\" x2=\"{:.2}\" y2=\"{y:.2}\" stroke=\"{}\" stroke-dasharray=\"{dasharray}\"/>",
            plot.x,
            plot.right(),
            theme.grid_color,
            y = tick.pos
        ));
    }
    for tick in x_ticks {
        svg.push_str(&format!(
            "<line x1=\"{x:.2}\" y1=\"{:.2}\" x2=\"{x:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-dasharray=\"{dasharray}\"/>",
            plot.y,
            plot.bottom(),
            theme.grid_color,
            x = tick.pos
        ));
    }
    svg.push_str(&format!(
        "<path d=\"M{:.2},{:.2} L{:.2},{:.2} L{:.2},{:.2}\" fill=\"none\" stroke=\"{}\"/>",
        plot.x,
        plot.y,
        plot.x,
        plot.bottom(),
        plot.right(),
        plot.bottom(),
        theme.axis_color
    ));
    let size = config.label_font_size;
    for tick in y_ticks {
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"end\" font-size=\"{size}\" fill=\"{}\">{}</text>",
            plot.x - 8.0,
            tick.pos + size * 0.35,
            theme.axis_color,
            escape_xml(&tick.label)
        ));
    }
    for tick in x_ticks {
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-size=\"{size}\" fill=\"{}\">{}</text>",
            tick.pos,
            plot.bottom() + size + 6.0,
            theme.axis_color,
            escape_xml(&tick.label)
        ));
    }
    svg
}

fn tooltip_svg(tooltip: Option<&String>) -> String {
    tooltip
        .map(|tip| format!("<title>{}</title>", escape_xml(tip)))
        .unwrap_or_default()
}

fn cartesian_svg(chart: &CartesianChart, theme: &Theme, config: &ChartConfig) -> String {
    let mut svg = axes_svg(
        &chart.plot,
        &chart.x_ticks,
        &chart.y_ticks,
        &chart.grid_dasharray,
        theme,
        config,
    );
    let color = escape_xml(&chart.color);
    match &chart.marks {
        CartesianMarks::Bars { bars, radius } => {
            for bar in bars {
                svg.push_str(&format!(
                    "<path d=\"{}\" fill=\"{color}\">{}</path>",
                    rounded_top_rect(bar.x, bar.y, bar.width, bar.height, *radius),
                    tooltip_svg(bar.tooltip.as_ref())
                ));
            }
        }
        CartesianMarks::Line {
            points,
            stroke_width,
            dot_radius,
        } => {
            let coords: Vec<_> = points.iter().map(|p| (p.x, p.y)).collect();
            svg.push_str(&format!(
                "<path d=\"{}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"{stroke_width}\"/>",
                monotone_path(&coords)
            ));
            for point in points {
                svg.push_str(&format!(
                    "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{dot_radius}\" fill=\"{color}\">{}</circle>",
                    point.x,
                    point.y,
                    tooltip_svg(point.tooltip.as_ref())
                ));
            }
        }
        CartesianMarks::Area {
            points,
            baseline,
            stroke_width,
            fill_opacity,
        } => {
            let coords: Vec<_> = points.iter().map(|p| (p.x, p.y)).collect();
            let line = monotone_path(&coords);
            if let (Some(first), Some(last)) = (coords.first(), coords.last()) {
                svg.push_str(&format!(
                    "<path d=\"{line} L{:.2},{baseline:.2} L{:.2},{baseline:.2} Z\" fill=\"{color}\" fill-opacity=\"{fill_opacity}\" stroke=\"none\"/>",
                    last.0, first.0
                ));
            }
            svg.push_str(&format!(
                "<path d=\"{line}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"{stroke_width}\"/>"
            ));
            for point in points.iter().filter(|point| point.tooltip.is_some()) {
                svg.push_str(&format!(
                    "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"6\" fill=\"transparent\">{}</circle>",
                    point.x,
                    point.y,
                    tooltip_svg(point.tooltip.as_ref())
                ));
            }
        }
    }
    svg
}

/// Rectangle path with the two top corners rounded by `radius`.
fn rounded_top_rect(x: f32, y: f32, width: f32, height: f32, radius: f32) -> String {
    let r = radius.min(width / 2.0).min(height).max(0.0);
    let right = x + width;
    let bottom = y + height;
    format!(
        "M{x:.2},{bottom:.2} L{x:.2},{:.2} Q{x:.2},{y:.2} {:.2},{y:.2} L{:.2},{y:.2} Q{right:.2},{y:.2} {right:.2},{:.2} L{right:.2},{bottom:.2} Z",
        y + r,
        x + r,
        right - r,
        y + r
    )
}

fn pie_svg(pie: &PieChart, config: &ChartConfig) -> String {
    let mut svg = String::new();
    for slice in &pie.slices {
        let tooltip = tooltip_svg(slice.tooltip.as_ref());
        if slice.span() >= TAU - 1e-4 {
            svg.push_str(&format!(
                "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\">{tooltip}</circle>",
                pie.cx, pie.cy, pie.radius, slice.color
            ));
        } else if slice.span() > 0.0 {
            let (sx, sy) = polar(pie.cx, pie.cy, pie.radius, slice.start_angle);
            let (ex, ey) = polar(pie.cx, pie.cy, pie.radius, slice.end_angle);
            let large_arc = u8::from(slice.span() > TAU / 2.0);
            svg.push_str(&format!(
                "<path d=\"M{:.2},{:.2} L{sx:.2},{sy:.2} A{r:.2},{r:.2} 0 {large_arc} 1 {ex:.2},{ey:.2} Z\" fill=\"{}\" stroke=\"#ffffff\">{tooltip}</path>",
                pie.cx,
                pie.cy,
                slice.color,
                r = pie.radius
            ));
        }
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            slice.label_x,
            slice.label_y,
            slice.label_anchor,
            config.label_font_size,
            slice.color,
            escape_xml(&slice.label)
        ));
    }
    svg
}

fn scatter_svg(chart: &ScatterChart, theme: &Theme, config: &ChartConfig) -> String {
    let mut svg = axes_svg(
        &chart.plot,
        &chart.x_ticks,
        &chart.y_ticks,
        &chart.grid_dasharray,
        theme,
        config,
    );
    for point in &chart.points {
        svg.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{}\" fill=\"{}\">{}</circle>",
            point.x,
            point.y,
            chart.radius,
            escape_xml(&chart.color),
            tooltip_svg(point.tooltip.as_ref())
        ));
    }
    svg
}

/// Legend entries centred in a row along the bottom of the chart box.
fn legend_svg(entries: &[LegendEntry], width: f32, height: f32, config: &Config) -> String {
    let size = config.chart.label_font_size;
    let style = text_style(config, size);
    let spacing = 16.0;
    let widths: Vec<f32> = entries
        .iter()
        .map(|entry| LEGEND_SWATCH + 6.0 + text_width(&entry.label, &style))
        .collect();
    let total = widths.iter().sum::<f32>() + spacing * entries.len().saturating_sub(1) as f32;
    let y = height - config.chart.legend_height / 2.0;
    let mut x = (width - total) / 2.0;
    let mut svg = String::new();
    for (entry, entry_width) in entries.iter().zip(widths) {
        svg.push_str(&format!(
            "<rect x=\"{x:.2}\" y=\"{:.2}\" width=\"{LEGEND_SWATCH}\" height=\"{LEGEND_SWATCH}\" fill=\"{}\"/>",
            y - LEGEND_SWATCH / 2.0,
            escape_xml(&entry.color)
        ));
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"{size}\" fill=\"{}\">{}</text>",
            x + LEGEND_SWATCH + 6.0,
            y + size * 0.35,
            config.theme.text_color,
            escape_xml(&entry.label)
        ));
        x += entry_width + spacing;
    }
    svg
}

fn unsupported_svg(chart: &UnsupportedChart, width: f32, height: f32, theme: &Theme) -> String {
    notice_svg(
        &Frame::new(0.0, 0.0, width, height),
        chart.title(),
        &chart.detail(),
        &theme.axis_color,
        theme,
    )
}

/// Bordered box with a centred title and a muted second line.
fn notice_svg(frame: &Frame, title: &str, detail: &str, accent: &str, theme: &Theme) -> String {
    let cy = frame.y + frame.height / 2.0;
    format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"8\" ry=\"8\" fill=\"{}\" stroke=\"{accent}\" stroke-dasharray=\"6 4\"/>\
         <text x=\"{cx:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-size=\"{}\" font-weight=\"bold\" fill=\"{accent}\">{}</text>\
         <text x=\"{cx:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-size=\"{}\" fill=\"{}\">{}</text>",
        frame.x,
        frame.y,
        frame.width,
        frame.height,
        theme.code_background,
        cy - 4.0,
        theme.font_size,
        escape_xml(title),
        cy + theme.font_size,
        theme.font_size * 0.8,
        theme.muted_text_color,
        escape_xml(detail),
        cx = frame.center_x()
    )
}

fn diagram_svg(frame: &Frame, diagram: &DiagramBlock, theme: &Theme) -> String {
    match diagram {
        DiagramBlock::Pending(_) => String::new(),
        DiagramBlock::Resolved { display, .. } => match display {
            DisplayContent::Empty => String::new(),
            DisplayContent::Diagram(markup) => embed_svg(markup, frame),
            DisplayContent::Placeholder => {
                notice_svg(frame, ERROR_TITLE, ERROR_HINT, &theme.error_color, theme)
            }
        },
    }
}

/// Places a standalone SVG document inside `frame`, scaled to fit.
fn embed_svg(markup: &str, frame: &Frame) -> String {
    let body = PROLOG_RE.replace(markup, "");
    let Some(start) = body.find("<svg") else {
        return String::new();
    };
    let Some(tag_len) = body[start..].find('>') else {
        return String::new();
    };
    let open_end = start + tag_len;
    let self_closing = body[..open_end].ends_with('/');
    let attrs_end = if self_closing { open_end - 1 } else { open_end };
    let attrs = ROOT_SIZE_ATTR_RE.replace_all(&body[start + 4..attrs_end], "");
    let mut attrs = attrs.into_owned();
    if !attrs.contains("preserveAspectRatio") {
        attrs.push_str(" preserveAspectRatio=\"xMidYMid meet\"");
    }
    format!(
        "<svg x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\"{attrs}{}",
        frame.x,
        frame.y,
        frame.width,
        frame.height,
        &body[attrs_end..]
    )
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, config: &Config) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = config
        .theme
        .font_family
        .split(',')
        .map(|family| family.trim().trim_matches('"'))
        .find(|family| !family.is_empty())
        .unwrap_or("sans-serif")
        .to_string();
    opt.fontdb_mut().load_system_fonts();
    opt.default_size = usvg::Size::from_wh(config.slide.width, config.slide.height)
        .ok_or_else(|| anyhow::anyhow!("Invalid slide size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

/// Escapes text and attribute values; every data-derived string passes through here.
pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

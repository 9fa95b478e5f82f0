use crate::chart::{ChartSpec, ChartType, render_chart};
use crate::error::SchemaDefinitionError;
use crate::schema::{FieldSpec, FieldValue, Record, SlideInstance};
use crate::slide::{BlockContent, Frame, PlacedBlock, SlideArtifact};

use super::header::with_header;
use super::{Layout, RenderContext, center_offset};

pub(super) const ID: &str = "chart-with-caption-slide";

const DEFAULT_CAPTION: &str = "## Findings

This chart **highlights** trends in performance across years.

Notice the steady increase in values, indicating positive growth.";

const DEFAULT_SERIES: [(&str, f64); 5] = [
    ("2021", 5.0),
    ("2022", 12.0),
    ("2023", 18.0),
    ("2024", 23.0),
    ("2025", 26.0),
];

pub(super) fn layout() -> Result<Layout, SchemaDefinitionError> {
    let point_fields = vec![
        FieldSpec::text("name", ..),
        FieldSpec::number("value", ..),
        FieldSpec::text("category", ..).optional(),
        FieldSpec::number("x", ..).optional(),
        FieldSpec::number("y", ..).optional(),
    ];
    let default_data: Vec<Record> = DEFAULT_SERIES
        .iter()
        .map(|&(name, value)| {
            Record::from_pairs([
                ("name", FieldValue::from(name)),
                ("value", FieldValue::from(value)),
            ])
        })
        .collect();

    Layout::new(
        ID,
        "Chart With Caption Layout",
        "Chart With Caption Layout: This slide layout features a prominent chart visualization \
         (supports bar, line, area, pie, and scatter charts) with a dedicated caption area for \
         markdown-formatted explanations. Includes a standardized header with slide number, \
         section title, content rating, and company logo. Ideal for presenting data insights, \
         trends, and comparisons with clear supporting text.",
        with_header(
            "Background",
            vec![
                FieldSpec::text("chartCaption", 8..=200)
                    .default(DEFAULT_CAPTION)
                    .describe("Markdown caption explaining the chart"),
                FieldSpec::one_of("chartType", ChartType::ALL.map(ChartType::tag))
                    .default("line")
                    .describe("Kind of chart to draw"),
                FieldSpec::list("data", 2..=12, point_fields)
                    .default(default_data)
                    .describe("Data points; scatter charts read x and y"),
                FieldSpec::text("dataKey", ..).default("value"),
                FieldSpec::text("categoryKey", ..).default("name"),
                FieldSpec::text("color", ..).default("#3b82f6"),
                FieldSpec::boolean("showLegend").default(false),
                FieldSpec::boolean("showTooltip").default(true),
            ],
        ),
        render,
    )
}

/// Caption on top, a divider, then the chart centred in what remains.
fn render(instance: SlideInstance, ctx: &RenderContext<'_>) -> SlideArtifact {
    let body = ctx.body();
    let gap = ctx.config.slide.gap;
    let mut blocks = Vec::new();

    let caption = ctx.rich_text(instance.text("chartCaption"), body.x, body.y, body.width);
    let mut cursor = caption.frame.bottom() + gap;
    blocks.push(caption);

    blocks.push(PlacedBlock::new(
        Frame::new(body.x, cursor, body.width, 1.0),
        BlockContent::Divider,
    ));
    cursor += 1.0 + gap;

    let remaining = Frame::new(body.x, cursor, body.width, (body.bottom() - cursor).max(0.0));
    let height = remaining.height.min(ctx.config.chart.max_height);
    let chart = render_chart(
        &ChartSpec::from_instance(&instance),
        remaining.width,
        height,
        &ctx.config.chart,
    );
    blocks.push(PlacedBlock::new(
        Frame::new(
            remaining.x,
            remaining.y + center_offset(&remaining, height),
            remaining.width,
            height,
        ),
        BlockContent::Chart(chart),
    ));

    ctx.slide(&instance, blocks)
}

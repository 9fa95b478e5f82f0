use crate::error::SchemaDefinitionError;
use crate::schema::{FieldSpec, ImageRef, SlideInstance};
use crate::slide::{BlockContent, Frame, PlacedBlock, SlideArtifact};

use super::header::with_header;
use super::{Layout, RenderContext, center_offset};

pub(super) const ID: &str = "hero-image-with-text-slide";

const DEFAULT_HERO_URL: &str = "https://picsum.photos/seed/picsum/300/200";
const IMAGE_HEIGHT_RATIO: f32 = 0.8;

pub(super) fn layout() -> Result<Layout, SchemaDefinitionError> {
    Layout::new(
        ID,
        "Hero Image With Text Content Layout",
        "Hero Image With Text Content Layout: This slide layout presents a large hero image on \
         the left and a flexible markdown-supported text area on the right. The text area \
         supports full markdown, including tables, code blocks, lists, checkboxes, links, and \
         images. Includes a standardized header with slide number, section title, content \
         rating, and company logo. Ideal for combining impactful visuals with rich, formatted \
         supporting content.",
        with_header(
            "Overview",
            vec![
                FieldSpec::image("heroImage")
                    .default(ImageRef::new(DEFAULT_HERO_URL, "Hero visual for the slide"))
                    .describe("Main hero image shown on left side"),
                FieldSpec::text("bodyText", ..=500)
                    .default(
                        "This is where your key supporting message goes. Keep it clear, concise, \
                         and aligned with the visual.",
                    )
                    .describe("Main supporting markdown text displayed alongside the hero image"),
            ],
        ),
        render,
    )
}

fn render(instance: SlideInstance, ctx: &RenderContext<'_>) -> SlideArtifact {
    let body = ctx.body();
    let column = ctx.config.slide.column_width();
    let right_x = body.x + body.width - column;
    let mut blocks = Vec::new();

    if let Some(image) = instance.image("heroImage") {
        let height = body.height * IMAGE_HEIGHT_RATIO;
        blocks.push(PlacedBlock::new(
            Frame::new(body.x, body.y + center_offset(&body, height), column, height),
            BlockContent::Image(image.clone()),
        ));
    }

    let mut text = ctx.rich_text(instance.text("bodyText"), right_x, body.y, column);
    text.frame.y += center_offset(&body, text.frame.height);
    blocks.push(text);

    ctx.slide(&instance, blocks)
}

use crate::error::SchemaDefinitionError;
use crate::schema::{FieldSpec, Record, SlideInstance};
use crate::slide::{Frame, SlideArtifact, TextAlign};

use super::header::with_header;
use super::{Layout, RenderContext, TextLook, center_offset, equalize_heights, shift};

pub(super) const ID: &str = "column-items-slide";

const CARD_GAP: f32 = 48.0;
const TITLE_GAP: f32 = 40.0;
const HEADING_SIZE: f32 = 24.0;
const DESCRIPTION_SIZE: f32 = 20.0;

pub(super) fn layout() -> Result<Layout, SchemaDefinitionError> {
    let default_items = vec![
        Record::from_pairs([
            ("heading", "First Point"),
            (
                "description",
                "Description for the first key point that explains important details",
            ),
        ]),
        Record::from_pairs([
            ("heading", "Second Point"),
            (
                "description",
                "Description for the second key point with relevant information",
            ),
        ]),
        Record::from_pairs([
            ("heading", "Third Point"),
            (
                "description",
                "Description for the third key point highlighting crucial aspects",
            ),
        ]),
    ];

    Layout::new(
        ID,
        "Column Items Layout",
        "Column Items Layout: This slide layout displays up to 3 visually distinct cards in a \
         horizontal row, each with a short title and description. Includes a header with slide \
         number, section title, content rating, and company logo. Ideal for summarizing key \
         features, benefits, or comparisons in a concise, visually organized format.",
        with_header(
            "Overview",
            vec![
                FieldSpec::text("title", 3..=50)
                    .default("Main Title")
                    .describe("Main title of the slide"),
                FieldSpec::list(
                    "items",
                    2..=3,
                    vec![
                        FieldSpec::text("heading", 2..=50).describe("Item heading"),
                        FieldSpec::text("description", 10..=130).describe("Item description"),
                    ],
                )
                .default(default_items)
                .describe("List of content items (2–3 items)"),
            ],
        ),
        render,
    )
}

/// Centred title above a row of equal-height cards; the group is centred
/// vertically in the body.
fn render(instance: SlideInstance, ctx: &RenderContext<'_>) -> SlideArtifact {
    let body = ctx.body();
    let theme = &ctx.config.theme;

    let title = ctx.text(
        instance.text("title"),
        body.x,
        body.y,
        body.width,
        TextLook {
            font_size: theme.title_font_size,
            bold: true,
            color: &theme.text_color,
            align: TextAlign::Middle,
        },
    );
    let row_y = title.frame.bottom() + TITLE_GAP;

    let items = instance.list("items");
    let count = items.len().max(1) as f32;
    let card_width = ((body.width - CARD_GAP * (count - 1.0)) / count).max(1.0);
    let mut cards: Vec<_> = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let x = body.x + index as f32 * (card_width + CARD_GAP);
            ctx.card(
                None,
                item.text("heading").unwrap_or_default(),
                item.text("description").unwrap_or_default(),
                Frame::new(x, row_y, card_width, 0.0),
                (HEADING_SIZE, DESCRIPTION_SIZE),
            )
        })
        .collect();
    equalize_heights(&mut cards);

    let row_height = cards.first().map_or(0.0, |card| card.frame.height);
    let mut blocks = vec![title];
    blocks.extend(cards);
    let group_height = row_y - body.y + row_height;
    shift(&mut blocks, center_offset(&body, group_height));

    ctx.slide(&instance, blocks)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::layouts::tests::render_builtin;
    use crate::slide::BlockContent;

    #[test]
    fn cards_share_a_row_and_height() {
        let artifact = render_builtin(ID, json!({}));
        let cards: Vec<_> = artifact
            .blocks
            .iter()
            .filter(|block| matches!(block.content, BlockContent::Card { .. }))
            .collect();
        assert_eq!(cards.len(), 3);
        assert!(cards.windows(2).all(|pair| {
            pair[0].frame.y == pair[1].frame.y
                && pair[0].frame.height == pair[1].frame.height
                && (pair[0].frame.x + pair[0].frame.width + CARD_GAP - pair[1].frame.x).abs() < 0.01
        }));
    }

    #[test]
    fn two_items_split_the_width() {
        let artifact = render_builtin(
            ID,
            json!({
                "items": [
                    { "heading": "Speed", "description": "Twice as fast as last year" },
                    { "heading": "Cost", "description": "Half the spend per customer" },
                ]
            }),
        );
        let widths: Vec<_> = artifact.blocks[1..]
            .iter()
            .map(|block| block.frame.width)
            .collect();
        assert_eq!(widths.len(), 2);
        assert!((widths[0] - (1232.0 - CARD_GAP) / 2.0).abs() < 0.01);
    }

    #[test]
    fn title_is_bold_and_centred() {
        let artifact = render_builtin(ID, json!({ "title": "Why it works" }));
        assert!(matches!(
            artifact.blocks[0].content,
            BlockContent::Text { bold: true, align: TextAlign::Middle, .. }
        ));
    }
}

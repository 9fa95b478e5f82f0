use crate::error::SchemaDefinitionError;
use crate::schema::{FieldSpec, Record, SlideInstance};
use crate::slide::{Frame, SlideArtifact, TextAlign};

use super::header::with_header;
use super::{Layout, RenderContext, TextLook, center_offset, shift};

pub(super) const ID: &str = "key-points-with-summary-slide";

const CARD_GAP: f32 = 24.0;
const TITLE_GAP: f32 = 24.0;
const DESCRIPTION_SIZE: f32 = 20.0;
const CARD_HEADING_SIZE: f32 = 24.0;
const CARD_DESCRIPTION_SIZE: f32 = 20.0;

pub(super) fn layout() -> Result<Layout, SchemaDefinitionError> {
    let default_items = vec![
        Record::from_pairs([
            ("heading", "First Key Point"),
            (
                "description",
                "Detailed explanation of the first important point that supports the main topic",
            ),
        ]),
        Record::from_pairs([
            ("heading", "Second Key Point"),
            (
                "description",
                "Detailed explanation of the second important point with relevant information",
            ),
        ]),
        Record::from_pairs([
            ("heading", "Third Key Point"),
            (
                "description",
                "Detailed explanation of the third important point that concludes the discussion",
            ),
        ]),
    ];

    Layout::new(
        ID,
        "Key Points With Summary Layout",
        "Key Points With Summary Layout: This slide layout features a header, a main title and \
         short description on the left, and up to 3 numbered cards arranged vertically in a \
         single column on the right. Each card includes a heading and a concise description. \
         Includes a standardized header with slide number, section title, content rating, and \
         company logo. Ideal for summarizing key takeaways, steps, or highlights in a clear, \
         sequential format.",
        with_header(
            "Key Points",
            vec![
                FieldSpec::text("title", 3..=50)
                    .default("Key Points")
                    .describe("Main title of the slide"),
                FieldSpec::text("description", 10..=130)
                    .default(
                        "Here is the main description that provides context and introduction to \
                         the numbered points on the right side.",
                    )
                    .describe("Main description text"),
                FieldSpec::list(
                    "items",
                    2..=3,
                    vec![
                        FieldSpec::text("heading", 2..=50).describe("Item heading"),
                        FieldSpec::text("description", 10..=130).describe("Item description"),
                    ],
                )
                .default(default_items)
                .describe("List of numbered items (2-3 items)"),
            ],
        ),
        render,
    )
}

/// Two-digit, one-based card number.
fn card_number(index: usize) -> String {
    format!("{:02}", index + 1)
}

fn render(instance: SlideInstance, ctx: &RenderContext<'_>) -> SlideArtifact {
    let body = ctx.body();
    let theme = &ctx.config.theme;
    let column = ctx.config.slide.column_width();
    let right_x = body.x + body.width - column;

    let title = ctx.text(
        instance.text("title"),
        body.x,
        body.y,
        column,
        TextLook {
            font_size: theme.title_font_size,
            bold: true,
            color: &theme.text_color,
            align: TextAlign::Start,
        },
    );
    let description = ctx.text(
        instance.text("description"),
        body.x,
        title.frame.bottom() + TITLE_GAP,
        column,
        TextLook {
            font_size: DESCRIPTION_SIZE,
            bold: false,
            color: &theme.muted_text_color,
            align: TextAlign::Start,
        },
    );
    let mut summary = vec![title, description];
    let summary_height = summary[1].frame.bottom() - body.y;
    shift(&mut summary, center_offset(&body, summary_height));

    let mut cursor = body.y;
    let mut cards = Vec::new();
    for (index, item) in instance.list("items").iter().enumerate() {
        let card = ctx.card(
            Some(card_number(index)),
            item.text("heading").unwrap_or_default(),
            item.text("description").unwrap_or_default(),
            Frame::new(right_x, cursor, column, 0.0),
            (CARD_HEADING_SIZE, CARD_DESCRIPTION_SIZE),
        );
        cursor = card.frame.bottom() + CARD_GAP;
        cards.push(card);
    }
    let stack_height = (cursor - CARD_GAP - body.y).max(0.0);
    shift(&mut cards, center_offset(&body, stack_height));

    summary.extend(cards);
    ctx.slide(&instance, summary)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::layouts::tests::render_builtin;
    use crate::slide::BlockContent;

    #[test]
    fn cards_are_numbered_and_stacked() {
        let artifact = render_builtin(ID, json!({}));
        let cards: Vec<_> = artifact
            .blocks
            .iter()
            .filter_map(|block| match &block.content {
                BlockContent::Card { number, .. } => Some((number.clone(), block.frame)),
                _ => None,
            })
            .collect();
        let numbers: Vec<_> = cards.iter().map(|(n, _)| n.as_deref()).collect();
        assert_eq!(numbers, vec![Some("01"), Some("02"), Some("03")]);
        assert!(cards
            .windows(2)
            .all(|pair| pair[0].1.bottom() + CARD_GAP <= pair[1].1.y + 0.01));
    }

    #[test]
    fn summary_sits_left_of_cards() {
        let artifact = render_builtin(ID, json!({ "title": "Takeaways" }));
        let title = &artifact.blocks[0];
        let first_card = &artifact.blocks[2];
        assert!(title.frame.x + title.frame.width <= first_card.frame.x);
        assert_eq!(artifact.header.section_title, "Key Points");
    }

    #[test]
    fn too_many_items_are_rejected() {
        let layout = crate::layouts::get_layout(ID).expect("layout");
        let item = json!({ "heading": "Point", "description": "A long enough description" });
        let err = crate::schema::normalize(
            layout.schema(),
            &json!({ "items": [item.clone(), item.clone(), item.clone(), item] }),
        )
        .unwrap_err();
        assert!(err.is_constraint_violation());
        assert_eq!(err.field, "items");
    }
}

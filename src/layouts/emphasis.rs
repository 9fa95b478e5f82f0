use crate::error::SchemaDefinitionError;
use crate::schema::{FieldSpec, SlideInstance};
use crate::slide::{SlideArtifact, TextAlign};

use super::header::with_header;
use super::{Layout, RenderContext, TextLook, center_offset};

pub(super) const ID: &str = "emphasis-text-slide";

const MAX_TEXT_WIDTH: f32 = 896.0;

pub(super) fn layout() -> Result<Layout, SchemaDefinitionError> {
    Layout::new(
        ID,
        "Emphasis Text Layout",
        "Emphasis Text Layout: This slide layout features a large, bold, centrally positioned \
         text block, ideal for highlighting key facts, impactful statements, or memorable quotes. \
         The layout includes a standardized header with slide number, section title, content \
         rating, and company logo. Best used for drawing attention to a single, important \
         message or callout.",
        with_header(
            "Background",
            vec![
                FieldSpec::text("emphasiseText", ..=150)
                    .default("Driving Growth Through Innovation and Execution Excellence")
                    .describe("Large central emphasised text (max 3 lines, 150 chars max)"),
            ],
        ),
        render,
    )
}

fn render(instance: SlideInstance, ctx: &RenderContext<'_>) -> SlideArtifact {
    let body = ctx.body();
    let theme = &ctx.config.theme;
    let width = body.width.min(MAX_TEXT_WIDTH);
    let mut statement = ctx.text(
        instance.text("emphasiseText"),
        body.center_x() - width / 2.0,
        body.y,
        width,
        TextLook {
            font_size: theme.emphasis_font_size,
            bold: true,
            color: &theme.text_color,
            align: TextAlign::Middle,
        },
    );
    statement.frame.y += center_offset(&body, statement.frame.height);
    ctx.slide(&instance, vec![statement])
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::layouts::tests::render_builtin;
    use crate::slide::BlockContent;

    #[test]
    fn statement_is_centred_on_the_slide() {
        let artifact = render_builtin(ID, json!({}));
        let block = &artifact.blocks[0];
        assert!((block.frame.center_x() - 640.0).abs() < 0.01);
        assert!(block.frame.width <= MAX_TEXT_WIDTH);
        let BlockContent::Text { block: text, font_size, .. } = &block.content else {
            panic!("expected text");
        };
        assert_eq!(*font_size, 48.0);
        assert!(text.lines.len() >= 2);
    }

    #[test]
    fn overlong_statement_is_rejected() {
        let layout = crate::layouts::get_layout(ID).expect("layout");
        let err = crate::schema::normalize(
            layout.schema(),
            &json!({ "emphasiseText": "x".repeat(151) }),
        )
        .unwrap_err();
        assert_eq!(err.field, "emphasiseText");
    }
}

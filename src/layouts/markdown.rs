use crate::error::SchemaDefinitionError;
use crate::schema::{FieldSpec, SlideInstance};
use crate::slide::SlideArtifact;

use super::header::with_header;
use super::{Layout, RenderContext, center_offset};

pub(super) const ID: &str = "markdown-renderer-slide";

const DEFAULT_CONTENT: &str = "- **Git** enables version control by tracking changes in source code across multiple locations.
- Developed by *Linus Torvalds* in **2005**.
- Trusted by more than *80%* of global software teams.
- Facilitates feature branching, change history, and team collaboration.
- Integrated with services such as **GitHub**, **GitLab**, and **Bitbucket**.";

const SIDE_PADDING: f32 = 48.0;

pub(super) fn layout() -> Result<Layout, SchemaDefinitionError> {
    Layout::new(
        ID,
        "Markdown Renderer Layout",
        "Markdown Renderer Layout: This slide layout dedicates the entire slide to rich markdown \
         content, supporting all markdown features including code blocks, tables, ordered and \
         unordered lists, checkboxes, links, and images. Includes a standardized header with \
         slide number, section title, content rating, and company logo. Ideal for technical \
         documentation, detailed explanations, or any content requiring advanced formatting and \
         structure.",
        with_header(
            "Background",
            vec![
                FieldSpec::text("markdownContent", ..=500)
                    .default(DEFAULT_CONTENT)
                    .describe(
                        "Markdown content to display in the slide center, use for code snippets, \
                         tables etc...",
                    ),
            ],
        ),
        render,
    )
}

fn render(instance: SlideInstance, ctx: &RenderContext<'_>) -> SlideArtifact {
    let body = ctx.body();
    let padding = SIDE_PADDING.min(body.width / 4.0);
    let mut block = ctx.rich_text(
        instance.text("markdownContent"),
        body.x + padding,
        body.y,
        body.width - padding * 2.0,
    );
    block.frame.y += center_offset(&body, block.frame.height);
    ctx.slide(&instance, vec![block])
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::layouts::tests::render_builtin;
    use crate::richtext::LineKind;
    use crate::slide::BlockContent;

    #[test]
    fn default_content_is_five_bullets() {
        let artifact = render_builtin(ID, json!({}));
        let BlockContent::RichText(block) = &artifact.blocks[0].content else {
            panic!("expected rich text");
        };
        let bullets = block
            .lines
            .iter()
            .filter(|line| line.marker.is_some() && line.kind == LineKind::Bullet)
            .count();
        assert_eq!(bullets, 5);
    }

    #[test]
    fn short_content_is_vertically_centred() {
        let artifact = render_builtin(ID, json!({ "markdownContent": "# Hello" }));
        let frame = artifact.blocks[0].frame;
        let body_center = 80.0 + 616.0 / 2.0;
        assert!((frame.y + frame.height / 2.0 - body_center).abs() < 1.0);
        assert_eq!(frame.x, 24.0 + 48.0);
    }
}

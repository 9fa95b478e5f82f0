use crate::diagram::{DiagramSpec, DiagramTheme};
use crate::error::SchemaDefinitionError;
use crate::schema::{FieldSpec, SlideInstance};
use crate::slide::{BlockContent, DiagramBlock, Frame, PlacedBlock, SlideArtifact};

use super::header::with_header;
use super::{Layout, RenderContext, center_offset};

pub(super) const ID: &str = "mermaid-with-caption-slide";

const DEFAULT_SOURCE: &str = "graph LR
    A[Start] --> B{Is it working?}
    B -->|Yes| C[Great!]
    B -->|No| D[Fix it]
    D --> B
    C --> E[End]";

const DEFAULT_CAPTION: &str = "## Diagram Explanation

This Mermaid diagram **visualizes** the process flow.";

pub(super) fn layout() -> Result<Layout, SchemaDefinitionError> {
    Layout::new(
        ID,
        "Mermaid With Caption Layout",
        "Mermaid With Caption Layout: This slide layout displays a Mermaid diagram with a \
         markdown-supported caption. Supports all major Mermaid chart types, including: \
         Flowchart, Class, Sequence, Entity Relationship, State, Mindmap, Architecture, Block, \
         C4, Gantt, Git, Kanban, Packet, Pie, Quadrant, Radar, Requirement, Sankey, Timeline, \
         Treemap, User Journey, XY, ZenUML. Includes a standardized header with slide number, \
         section title, content rating, and company logo. Ideal for visualizing processes, \
         systems, relationships, timelines, and technical diagrams with a clear, formatted \
         explanation.",
        with_header(
            "Background",
            vec![
                FieldSpec::text("mermaidCode", 10..)
                    .default(DEFAULT_SOURCE)
                    .describe("Mermaid diagram source"),
                FieldSpec::one_of("theme", DiagramTheme::ALL.map(DiagramTheme::tag))
                    .default("neutral")
                    .describe("Mermaid theme"),
                FieldSpec::text("caption", 8..=200)
                    .default(DEFAULT_CAPTION)
                    .describe("Markdown caption explaining the diagram"),
            ],
        ),
        render,
    )
}

/// Caption, divider, then a pending diagram block. The diagram is compiled
/// later by whoever owns the compiler.
fn render(instance: SlideInstance, ctx: &RenderContext<'_>) -> SlideArtifact {
    let body = ctx.body();
    let gap = ctx.config.slide.gap;
    let diagram_config = &ctx.config.diagram;
    let mut blocks = Vec::new();

    let caption = ctx.rich_text(instance.text("caption"), body.x, body.y, body.width);
    let mut cursor = caption.frame.bottom() + gap;
    blocks.push(caption);

    blocks.push(PlacedBlock::new(
        Frame::new(body.x, cursor, body.width, 1.0),
        BlockContent::Divider,
    ));
    cursor += 1.0 + gap;

    let remaining = Frame::new(body.x, cursor, body.width, (body.bottom() - cursor).max(0.0));
    let height = diagram_config
        .max_height
        .min(remaining.height.max(diagram_config.min_height))
        .min(remaining.height);
    let theme = DiagramTheme::from_tag(instance.text("theme")).unwrap_or(DiagramTheme::Default);
    let spec = DiagramSpec::new(instance.text("mermaidCode"), theme);
    blocks.push(PlacedBlock::new(
        Frame::new(
            remaining.x,
            remaining.y + center_offset(&remaining, height),
            remaining.width,
            height,
        ),
        BlockContent::Diagram(DiagramBlock::Pending(spec)),
    ));

    ctx.slide(&instance, blocks)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::layouts::tests::render_builtin;

    #[test]
    fn diagram_starts_pending_with_requested_theme() {
        let artifact = render_builtin(
            ID,
            json!({ "mermaidCode": "sequenceDiagram\n A->>B: hi", "theme": "forest" }),
        );
        let diagram = artifact.diagrams().next().expect("diagram block");
        assert!(matches!(diagram, DiagramBlock::Pending(_)));
        assert_eq!(diagram.spec().theme, DiagramTheme::Forest);
        assert!(diagram.spec().source.starts_with("sequenceDiagram"));
    }

    #[test]
    fn default_theme_is_neutral() {
        let artifact = render_builtin(ID, json!({}));
        let diagram = artifact.diagrams().next().expect("diagram block");
        assert_eq!(diagram.spec().theme, DiagramTheme::Neutral);
        assert_eq!(diagram.spec().source, DEFAULT_SOURCE);
    }
}

//! End-to-end slide pipeline: candidate data in, SVG out.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::diagram::{CommandCompiler, DiagramCompiler, DiagramSlot};
use crate::error::RenderError;
use crate::layouts::{LayoutRegistry, RenderContext, builtin_registry};
use crate::render::render_slide_svg;
use crate::richtext::{MarkdownLite, RichTextRenderer};
use crate::schema::{SlideInstance, normalize};
use crate::slide::{BlockContent, DiagramBlock, SlideArtifact};

#[derive(Debug, Clone)]
pub struct RenderedSlide {
    pub artifact: SlideArtifact,
    pub svg: String,
}

/// Owns the layout registry and the collaborators a slide needs.
#[derive(Clone)]
pub struct SlideRenderer {
    registry: LayoutRegistry,
    config: Config,
    rich_text: Arc<dyn RichTextRenderer>,
    compiler: Arc<dyn DiagramCompiler>,
}

impl SlideRenderer {
    /// Built-in layouts, markdown-lite rich text and the configured diagram command.
    pub fn new(config: Config) -> Self {
        let compiler = Arc::new(CommandCompiler::from_config(&config.diagram));
        Self {
            registry: builtin_registry().clone(),
            config,
            rich_text: Arc::new(MarkdownLite),
            compiler,
        }
    }

    pub fn with_registry(mut self, registry: LayoutRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_rich_text(mut self, rich_text: Arc<dyn RichTextRenderer>) -> Self {
        self.rich_text = rich_text;
        self
    }

    pub fn with_compiler(mut self, compiler: Arc<dyn DiagramCompiler>) -> Self {
        self.compiler = compiler;
        self
    }

    pub fn registry(&self) -> &LayoutRegistry {
        &self.registry
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn normalize(&self, layout_id: &str, candidate: &Value) -> Result<SlideInstance, RenderError> {
        let layout = self.registry.get(layout_id)?;
        Ok(normalize(layout.schema(), candidate)?)
    }

    /// Lays out a slide without compiling its diagrams; diagram blocks stay pending.
    pub fn layout(&self, layout_id: &str, candidate: &Value) -> Result<SlideArtifact, RenderError> {
        let layout = self.registry.get(layout_id)?;
        let instance = normalize(layout.schema(), candidate)?;
        let ctx = RenderContext {
            config: &self.config,
            rich_text: self.rich_text.as_ref(),
        };
        Ok(layout.render(instance, &ctx))
    }

    /// Normalizes, lays out, compiles diagrams and serializes to SVG.
    ///
    /// A diagram that fails to compile is drawn as the error placeholder; only
    /// an unknown layout or invalid candidate fails the call.
    pub async fn render(&self, layout_id: &str, candidate: &Value) -> Result<RenderedSlide, RenderError> {
        let mut artifact = self.layout(layout_id, candidate)?;
        self.resolve_diagrams(&mut artifact).await;
        let svg = render_slide_svg(&artifact, &self.config);
        Ok(RenderedSlide { artifact, svg })
    }

    /// Compiles every pending diagram block, one display slot per block.
    pub async fn resolve_diagrams(&self, artifact: &mut SlideArtifact) {
        for block in &mut artifact.blocks {
            let BlockContent::Diagram(DiagramBlock::Pending(spec)) = &block.content else {
                continue;
            };
            let spec = spec.clone();
            let slot = DiagramSlot::new(self.compiler.clone(), self.config.diagram.style.clone())
                .with_timeout(self.config.diagram.timeout());
            let outcome = slot.render(spec.clone()).await;
            debug!(?outcome, "diagram block resolved");
            block.content = BlockContent::Diagram(DiagramBlock::Resolved {
                spec,
                display: slot.display(),
            });
        }
    }
}

impl std::fmt::Debug for SlideRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlideRenderer")
            .field("layouts", &self.registry.ids().collect::<Vec<_>>())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::diagram::{DiagramStyle, DiagramTheme, DisplayContent};
    use crate::error::{DiagramCompileError, RegistryError};

    struct Fixed(Result<String, DiagramCompileError>);

    #[async_trait]
    impl DiagramCompiler for Fixed {
        async fn compile(
            &self,
            _source: &str,
            _theme: DiagramTheme,
            _style: &DiagramStyle,
        ) -> Result<String, DiagramCompileError> {
            self.0.clone()
        }
    }

    fn renderer(result: Result<String, DiagramCompileError>) -> SlideRenderer {
        SlideRenderer::new(Config::default()).with_compiler(Arc::new(Fixed(result)))
    }

    #[tokio::test]
    async fn unknown_layout_fails_before_validation() {
        let err = renderer(Ok(String::new()))
            .render("nope", &json!({ "anything": 1 }))
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::Registry(RegistryError::UnknownLayout(_))));
    }

    #[tokio::test]
    async fn invalid_candidate_is_a_validation_error() {
        let err = renderer(Ok(String::new()))
            .render("chart-with-caption-slide", &json!({ "chartType": "donut" }))
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::Validation(ref e) if e.field == "chartType"));
    }

    #[tokio::test]
    async fn diagrams_are_compiled_into_the_slide() {
        let rendered = renderer(Ok("<svg><g id=\"compiled\"/></svg>".to_string()))
            .render("mermaid-with-caption-slide", &json!({}))
            .await
            .expect("renders");
        let diagram = rendered.artifact.diagrams().next().expect("diagram");
        assert!(matches!(
            diagram,
            DiagramBlock::Resolved { display: DisplayContent::Diagram(_), .. }
        ));
        assert!(rendered.svg.contains("compiled"));
    }

    #[tokio::test]
    async fn compile_failure_still_renders_the_slide() {
        let rendered = renderer(Err(DiagramCompileError::Rejected("bad".to_string())))
            .render("mermaid-with-caption-slide", &json!({}))
            .await
            .expect("renders");
        assert!(rendered.svg.contains("Error rendering diagram"));
        assert!(rendered.svg.contains("Please check your Mermaid syntax"));
    }

    struct Blank;

    impl RichTextRenderer for Blank {
        fn render(
            &self,
            _markup: &str,
            max_width: f32,
            _style: &crate::text::TextStyle<'_>,
        ) -> crate::richtext::RichTextBlock {
            crate::richtext::RichTextBlock {
                lines: Vec::new(),
                width: max_width,
                height: 0.0,
            }
        }
    }

    #[test]
    fn custom_registry_and_rich_text_are_used() {
        let mut registry = LayoutRegistry::new();
        registry
            .register(builtin_registry().get("markdown-renderer-slide").unwrap().clone())
            .unwrap();
        let renderer = renderer(Ok(String::new()))
            .with_registry(registry)
            .with_rich_text(Arc::new(Blank));

        assert!(matches!(
            renderer.layout("emphasis-text-slide", &json!({})),
            Err(RenderError::Registry(RegistryError::UnknownLayout(_)))
        ));
        let artifact = renderer
            .layout("markdown-renderer-slide", &json!({}))
            .expect("lays out");
        assert!(artifact.blocks.iter().any(|block| matches!(
            &block.content,
            BlockContent::RichText(text) if text.lines.is_empty()
        )));
    }

    #[test]
    fn layout_leaves_diagrams_pending() {
        let artifact = renderer(Ok(String::new()))
            .layout("mermaid-with-caption-slide", &json!({}))
            .expect("lays out");
        assert!(matches!(
            artifact.diagrams().next(),
            Some(DiagramBlock::Pending(_))
        ));
    }
}

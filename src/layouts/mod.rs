//! Layout registry: identifiers mapped to a schema and a render function.

mod chart;
mod column_items;
mod emphasis;
mod header;
mod hero;
mod key_points;
mod markdown;
mod mermaid;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use tracing::debug;

use crate::config::Config;
use crate::error::{RegistryError, SchemaDefinitionError};
use crate::richtext::RichTextRenderer;
use crate::schema::{FieldSpec, LayoutSchema, SlideInstance, define_schema};
use crate::slide::{
    BlockContent, CARD_HEADING_GAP, CARD_NUMBER_WIDTH, CARD_PADDING, Frame, PlacedBlock,
    SlideArtifact, SlideHeader, TextAlign,
};
use crate::text::{TextStyle, layout_text};

pub use header::{DEFAULT_LOGO_URL, header_fields};

/// Collaborators and settings a layout renders with.
pub struct RenderContext<'a> {
    pub config: &'a Config,
    pub rich_text: &'a dyn RichTextRenderer,
}

impl RenderContext<'_> {
    pub fn text_style(&self, font_size: f32) -> TextStyle<'_> {
        TextStyle {
            font_family: &self.config.theme.font_family,
            font_size,
            line_height: self.config.slide.line_height,
            fast_metrics: self.config.slide.fast_text_metrics,
        }
    }

    fn body(&self) -> Frame {
        let slide = &self.config.slide;
        Frame::new(
            slide.body_x(),
            slide.body_y(),
            slide.body_width(),
            slide.body_height(),
        )
    }

    /// Plain text wrapped to `max_width`, placed at (`x`, `y`).
    fn text(&self, text: &str, x: f32, y: f32, max_width: f32, look: TextLook) -> PlacedBlock {
        let block = layout_text(text, max_width, &self.text_style(look.font_size));
        let frame = Frame::new(x, y, max_width, block.height);
        PlacedBlock::new(
            frame,
            BlockContent::Text {
                block,
                font_size: look.font_size,
                bold: look.bold,
                color: look.color.to_string(),
                align: look.align,
            },
        )
    }

    fn rich_text(&self, markup: &str, x: f32, y: f32, max_width: f32) -> PlacedBlock {
        let style = self.text_style(self.config.theme.font_size);
        let block = self.rich_text.render(markup, max_width, &style);
        PlacedBlock::new(
            Frame::new(x, y, max_width, block.height),
            BlockContent::RichText(block),
        )
    }

    /// Card whose height fits its wrapped heading and description.
    fn card(
        &self,
        number: Option<String>,
        heading: &str,
        description: &str,
        frame: Frame,
        sizes: (f32, f32),
    ) -> PlacedBlock {
        let (heading_size, description_size) = sizes;
        let number_column = if number.is_some() { CARD_NUMBER_WIDTH } else { 0.0 };
        let inner = (frame.width - CARD_PADDING * 2.0 - number_column).max(1.0);
        let heading = layout_text(heading, inner, &self.text_style(heading_size));
        let description = layout_text(description, inner, &self.text_style(description_size));
        let height = CARD_PADDING * 2.0 + heading.height + CARD_HEADING_GAP + description.height;
        PlacedBlock::new(
            Frame::new(frame.x, frame.y, frame.width, height.max(frame.height)),
            BlockContent::Card {
                number,
                heading,
                heading_size,
                description,
                description_size,
            },
        )
    }

    fn slide(&self, instance: &SlideInstance, blocks: Vec<PlacedBlock>) -> SlideArtifact {
        SlideArtifact {
            layout_id: instance.layout_id().to_string(),
            width: self.config.slide.width,
            height: self.config.slide.height,
            header: SlideHeader::from_instance(instance),
            blocks,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct TextLook<'a> {
    font_size: f32,
    bold: bool,
    color: &'a str,
    align: TextAlign,
}

/// Stretches every block to the tallest one.
fn equalize_heights(blocks: &mut [PlacedBlock]) {
    let tallest = blocks
        .iter()
        .map(|block| block.frame.height)
        .fold(0.0f32, f32::max);
    for block in blocks {
        block.frame.height = tallest;
    }
}

/// Moves every block down by `dy`.
fn shift(blocks: &mut [PlacedBlock], dy: f32) {
    for block in blocks {
        block.frame.y += dy;
    }
}

/// Offset that centres content of `height` inside `frame`, never above its top.
fn center_offset(frame: &Frame, height: f32) -> f32 {
    ((frame.height - height) / 2.0).max(0.0)
}

pub type RenderFn = fn(SlideInstance, &RenderContext<'_>) -> SlideArtifact;

#[derive(Debug, Clone)]
pub struct Layout {
    id: String,
    name: String,
    description: String,
    schema: LayoutSchema,
    render: RenderFn,
}

impl Layout {
    pub fn new(
        id: &str,
        name: &str,
        description: &str,
        fields: Vec<FieldSpec>,
        render: RenderFn,
    ) -> Result<Self, SchemaDefinitionError> {
        Ok(Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            schema: define_schema(id, fields)?,
            render,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn schema(&self) -> &LayoutSchema {
        &self.schema
    }

    pub fn render(&self, instance: SlideInstance, ctx: &RenderContext<'_>) -> SlideArtifact {
        (self.render)(instance, ctx)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LayoutRegistry {
    layouts: IndexMap<String, Layout>,
}

impl LayoutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in layout, in presentation order.
    pub fn builtin() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for layout in [
            chart::layout()?,
            mermaid::layout()?,
            markdown::layout()?,
            column_items::layout()?,
            key_points::layout()?,
            emphasis::layout()?,
            hero::layout()?,
        ] {
            registry.register(layout)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, layout: Layout) -> Result<(), RegistryError> {
        if self.layouts.contains_key(layout.id()) {
            return Err(RegistryError::DuplicateLayout(layout.id().to_string()));
        }
        debug!(layout = layout.id(), "registered layout");
        self.layouts.insert(layout.id().to_string(), layout);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<&Layout, RegistryError> {
        self.layouts
            .get(id)
            .ok_or_else(|| RegistryError::UnknownLayout(id.to_string()))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.layouts.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Layout> {
        self.layouts.values()
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }
}

static BUILTIN: Lazy<LayoutRegistry> = Lazy::new(|| {
    LayoutRegistry::builtin()
        .unwrap_or_else(|err| panic!("built-in layout definitions are inconsistent: {err}"))
});

/// Registry of built-in layouts, checked on first use.
pub fn builtin_registry() -> &'static LayoutRegistry {
    &BUILTIN
}

pub fn get_layout(id: &str) -> Result<&'static Layout, RegistryError> {
    BUILTIN.get(id)
}

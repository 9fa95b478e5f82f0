//! Display-independent description of a rendered slide.

use crate::chart::ChartArtifact;
use crate::diagram::{DiagramSpec, DisplayContent};
use crate::richtext::RichTextBlock;
use crate::schema::{ImageRef, SlideInstance};
use crate::text::TextBlock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentRating {
    Internal,
    Restricted,
    Unclassified,
}

impl ContentRating {
    pub const TAGS: [&'static str; 3] = ["internal", "restricted", "unclassified"];

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "internal" => Some(ContentRating::Internal),
            "restricted" => Some(ContentRating::Restricted),
            "unclassified" => Some(ContentRating::Unclassified),
            _ => None,
        }
    }

    pub fn badge_text(self) -> &'static str {
        match self {
            ContentRating::Internal => "INTERNAL",
            ContentRating::Restricted => "RESTRICTED",
            ContentRating::Unclassified => "UNCLASSIFIED",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlideHeader {
    /// As entered; fractional numbers are shown as given, never truncated.
    pub slide_number: f64,
    pub section_title: String,
    pub rating: ContentRating,
    pub logo: Option<ImageRef>,
}

impl SlideHeader {
    /// Reads the header fields every built-in layout shares.
    pub fn from_instance(instance: &SlideInstance) -> Self {
        Self {
            slide_number: instance.number("slideNumber"),
            section_title: instance.text("sectionTitle").to_string(),
            rating: ContentRating::from_tag(instance.text("contentRating"))
                .unwrap_or(ContentRating::Restricted),
            logo: instance
                .image("companyLogo")
                .filter(|logo| !logo.url.trim().is_empty())
                .cloned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Frame {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Start,
    Middle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DiagramBlock {
    /// Awaiting compilation.
    Pending(DiagramSpec),
    Resolved {
        spec: DiagramSpec,
        display: DisplayContent,
    },
}

impl DiagramBlock {
    pub fn spec(&self) -> &DiagramSpec {
        match self {
            DiagramBlock::Pending(spec) | DiagramBlock::Resolved { spec, .. } => spec,
        }
    }
}

/// Inner padding of a card and the space between its heading and description.
pub const CARD_PADDING: f32 = 24.0;
pub const CARD_HEADING_GAP: f32 = 12.0;
/// Numbered cards reserve a left column of this width for the number.
pub const CARD_NUMBER_WIDTH: f32 = 64.0;
pub const CARD_NUMBER_SIZE: f32 = 32.0;

#[derive(Debug, Clone, PartialEq)]
pub enum BlockContent {
    Text {
        block: TextBlock,
        font_size: f32,
        bold: bool,
        color: String,
        align: TextAlign,
    },
    RichText(RichTextBlock),
    Image(ImageRef),
    Card {
        number: Option<String>,
        heading: TextBlock,
        heading_size: f32,
        description: TextBlock,
        description_size: f32,
    },
    Chart(ChartArtifact),
    Diagram(DiagramBlock),
    Divider,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedBlock {
    pub frame: Frame,
    pub content: BlockContent,
}

impl PlacedBlock {
    pub fn new(frame: Frame, content: BlockContent) -> Self {
        Self { frame, content }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlideArtifact {
    pub layout_id: String,
    pub width: f32,
    pub height: f32,
    pub header: SlideHeader,
    pub blocks: Vec<PlacedBlock>,
}

impl SlideArtifact {
    pub fn diagrams(&self) -> impl Iterator<Item = &DiagramBlock> {
        self.blocks.iter().filter_map(|block| match &block.content {
            BlockContent::Diagram(diagram) => Some(diagram),
            _ => None,
        })
    }

    pub fn charts(&self) -> impl Iterator<Item = &ChartArtifact> {
        self.blocks.iter().filter_map(|block| match &block.content {
            BlockContent::Chart(chart) => Some(chart),
            _ => None,
        })
    }
}

use once_cell::sync::Lazy;
use regex::Regex;

use crate::text::{TextStyle, wrap_line};

static IMAGE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[([^\]]*)\]\([^)]*\)").unwrap());
static LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\([^)]*\)").unwrap());
static STRONG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*|__(.+?)__").unwrap());
static EMPHASIS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*([^*\s][^*]*)\*|\b_([^_]+)_\b").unwrap());
static CODE_SPAN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").unwrap());
static ORDERED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)[.)]\s+(.*)$").unwrap());
static HEADING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#{1,6})\s+(.*)$").unwrap());
static CHECKBOX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-*+]\s+\[([ xX])\]\s+(.*)$").unwrap());
static TABLE_RULE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\|?[\s:|-]+\|?$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Heading(u8),
    Paragraph,
    Bullet,
    Ordered(u32),
    Checkbox { checked: bool },
    Code,
    TableRow { header: bool },
    Rule,
}

/// One laid-out line. `y` is the baseline offset from the top of the block.
#[derive(Debug, Clone, PartialEq)]
pub struct RichLine {
    pub kind: LineKind,
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
    pub bold: bool,
    /// Only the first wrapped line of a list item carries its marker.
    pub marker: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RichTextBlock {
    pub lines: Vec<RichLine>,
    pub width: f32,
    pub height: f32,
}

/// Turns lightweight markup into positioned lines of text.
///
/// Implementations are total: malformed markup degrades to plain text.
pub trait RichTextRenderer: Send + Sync {
    fn render(&self, markup: &str, max_width: f32, style: &TextStyle<'_>) -> RichTextBlock;
}

/// Headings, lists, checkboxes, tables, code fences and rules. Inline emphasis,
/// links and images are reduced to their text.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownLite;

const LIST_INDENT: f32 = 24.0;
const BLOCK_GAP: f32 = 0.5;

enum Block {
    Text {
        kind: LineKind,
        text: String,
        marker: Option<String>,
    },
    Blank,
}

impl RichTextRenderer for MarkdownLite {
    fn render(&self, markup: &str, max_width: f32, style: &TextStyle<'_>) -> RichTextBlock {
        let mut block = RichTextBlock::default();
        let mut cursor = 0.0f32;
        let mut previous_blank = true;

        for parsed in parse_blocks(markup) {
            let (kind, text, marker) = match parsed {
                Block::Blank => {
                    if !previous_blank {
                        cursor += style.line_advance() * BLOCK_GAP;
                    }
                    previous_blank = true;
                    continue;
                }
                Block::Text { kind, text, marker } => (kind, text, marker),
            };
            previous_blank = false;

            let font_size = match kind {
                LineKind::Heading(1) => style.font_size * 1.6,
                LineKind::Heading(2) => style.font_size * 1.35,
                LineKind::Heading(3) => style.font_size * 1.15,
                LineKind::Code => style.font_size * 0.9,
                _ => style.font_size,
            };
            let line_style = TextStyle {
                font_size,
                ..*style
            };
            let indent = match kind {
                LineKind::Bullet | LineKind::Ordered(_) | LineKind::Checkbox { .. } => LIST_INDENT,
                LineKind::Code => LIST_INDENT / 2.0,
                _ => 0.0,
            };
            let wrapped = match kind {
                LineKind::Code | LineKind::TableRow { .. } | LineKind::Rule => vec![text],
                _ => wrap_line(&text, (max_width - indent).max(1.0), &line_style),
            };
            let bold = matches!(kind, LineKind::Heading(_) | LineKind::TableRow { header: true });

            for (index, line) in wrapped.into_iter().enumerate() {
                cursor += line_style.line_advance();
                block.width = block
                    .width
                    .max(indent + crate::text::text_width(&line, &line_style));
                block.lines.push(RichLine {
                    kind,
                    text: line,
                    x: indent,
                    y: cursor - line_style.line_advance() * 0.3,
                    font_size,
                    bold,
                    marker: if index == 0 { marker.clone() } else { None },
                });
            }
        }

        block.width = block.width.min(max_width);
        block.height = cursor;
        block
    }
}

fn parse_blocks(markup: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut in_code = false;
    let mut table_rows = 0usize;

    for raw in markup.replace("\r\n", "\n").split('\n') {
        let trimmed = raw.trim();
        if trimmed.starts_with("```") {
            in_code = !in_code;
            continue;
        }
        if in_code {
            blocks.push(Block::Text {
                kind: LineKind::Code,
                text: raw.trim_end().to_string(),
                marker: None,
            });
            continue;
        }
        if trimmed.is_empty() {
            table_rows = 0;
            blocks.push(Block::Blank);
            continue;
        }

        if trimmed.starts_with('|') {
            if TABLE_RULE_RE.is_match(trimmed) {
                continue;
            }
            let cells: Vec<String> = trimmed
                .trim_matches('|')
                .split('|')
                .map(|cell| strip_inline(cell.trim()))
                .collect();
            blocks.push(Block::Text {
                kind: LineKind::TableRow {
                    header: table_rows == 0,
                },
                text: cells.join("  |  "),
                marker: None,
            });
            table_rows += 1;
            continue;
        }
        table_rows = 0;

        let block = if matches!(trimmed, "---" | "***" | "___") {
            Block::Text {
                kind: LineKind::Rule,
                text: String::new(),
                marker: None,
            }
        } else if let Some(caps) = HEADING_RE.captures(trimmed) {
            Block::Text {
                kind: LineKind::Heading(caps[1].len() as u8),
                text: strip_inline(&caps[2]),
                marker: None,
            }
        } else if let Some(caps) = CHECKBOX_RE.captures(trimmed) {
            let checked = &caps[1] != " ";
            Block::Text {
                kind: LineKind::Checkbox { checked },
                text: strip_inline(&caps[2]),
                marker: Some(if checked { "☑" } else { "☐" }.to_string()),
            }
        } else if let Some(rest) = ["- ", "* ", "+ "]
            .iter()
            .find_map(|prefix| trimmed.strip_prefix(prefix))
        {
            Block::Text {
                kind: LineKind::Bullet,
                text: strip_inline(rest.trim()),
                marker: Some("•".to_string()),
            }
        } else if let Some(caps) = ORDERED_RE.captures(trimmed) {
            let number = caps[1].parse().unwrap_or(1);
            Block::Text {
                kind: LineKind::Ordered(number),
                text: strip_inline(&caps[2]),
                marker: Some(format!("{number}.")),
            }
        } else {
            Block::Text {
                kind: LineKind::Paragraph,
                text: strip_inline(trimmed),
                marker: None,
            }
        };
        blocks.push(block);
    }
    blocks
}

/// Reduces inline markup to its visible text.
pub fn strip_inline(text: &str) -> String {
    let text = IMAGE_RE.replace_all(text, "$1");
    let text = LINK_RE.replace_all(&text, "$1");
    let text = CODE_SPAN_RE.replace_all(&text, "$1");
    let text = STRONG_RE.replace_all(&text, "$1$2");
    let text = EMPHASIS_RE.replace_all(&text, "$1$2");
    text.into_owned()
}

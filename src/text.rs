use crate::text_metrics;

/// Wrapped lines of text with their measured extent.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub width: f32,
    pub height: f32,
}

/// How text is measured and wrapped into a block.
#[derive(Debug, Clone, Copy)]
pub struct TextStyle<'a> {
    pub font_family: &'a str,
    pub font_size: f32,
    pub line_height: f32,
    pub fast_metrics: bool,
}

impl TextStyle<'_> {
    pub fn line_advance(&self) -> f32 {
        self.font_size * self.line_height
    }
}

/// Splits `text` on newlines and wraps each line to `max_width` pixels.
pub fn layout_text(text: &str, max_width: f32, style: &TextStyle<'_>) -> TextBlock {
    let mut lines = Vec::new();
    for line in split_lines(text) {
        if line.is_empty() {
            lines.push(line);
        } else {
            lines.extend(wrap_line(&line, max_width, style));
        }
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    let width = lines
        .iter()
        .map(|line| text_width(line, style))
        .fold(0.0, f32::max);
    let height = lines.len() as f32 * style.line_advance();
    TextBlock {
        lines,
        width,
        height,
    }
}

pub fn split_lines(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .split('\n')
        .map(|line| line.trim().to_string())
        .collect()
}

/// Greedy word wrap. A single word wider than `max_width` gets its own line.
pub fn wrap_line(line: &str, max_width: f32, style: &TextStyle<'_>) -> Vec<String> {
    if text_width(line, style) <= max_width {
        return vec![line.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if text_width(&candidate, style) > max_width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

pub fn text_width(text: &str, style: &TextStyle<'_>) -> f32 {
    if style.fast_metrics {
        return fallback_text_width(text, style.font_size);
    }
    text_metrics::measure_text_width(text, style.font_size, style.font_family)
        .unwrap_or_else(|| fallback_text_width(text, style.font_size))
}

fn fallback_text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_width_factor).sum::<f32>() * font_size
}

/// Per-character advance as a fraction of the font size, calibrated on a
/// common sans-serif stack.
fn char_width_factor(ch: char) -> f32 {
    match ch {
        ' ' => 0.306,
        '\\' | '.' | ',' | ':' | ';' | '|' | '!' | '(' | ')' | '[' | ']' | '{' | '}' => 0.321,
        'I' | 'i' | 'j' | 'l' => 0.25,
        'f' | 't' | 'r' => 0.34,
        'M' | 'W' | 'm' | 'w' => 0.86,
        'A'..='Z' => 0.66,
        'a'..='z' => 0.56,
        '1' => 0.396,
        '0'..='9' => 0.6,
        '@' | '#' | '%' | '&' => 0.946,
        ch if !ch.is_ascii() && ch.len_utf8() >= 3 => 1.0,
        _ => 0.568,
    }
}

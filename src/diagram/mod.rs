//! Diagram rendering through an out-of-process compiler.
//!
//! [`DiagramSlot`] owns one display area. Every change of source or theme
//! starts a new numbered attempt; results from attempts that are no longer the
//! latest are discarded when they arrive.

mod compiler;
mod lifecycle;

use serde::{Deserialize, Serialize};

pub use compiler::{CommandCompiler, DiagramCompiler};
pub use lifecycle::{AttemptOutcome, DiagramSlot, DiagramState, DisplayContent};

/// Heading of the placeholder shown when compilation fails.
pub const ERROR_TITLE: &str = "Error rendering diagram";
pub const ERROR_HINT: &str = "Please check your Mermaid syntax";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramTheme {
    Default,
    Dark,
    Forest,
    Neutral,
}

impl DiagramTheme {
    pub const ALL: [DiagramTheme; 4] = [
        DiagramTheme::Default,
        DiagramTheme::Dark,
        DiagramTheme::Forest,
        DiagramTheme::Neutral,
    ];

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "default" => Some(DiagramTheme::Default),
            "dark" => Some(DiagramTheme::Dark),
            "forest" => Some(DiagramTheme::Forest),
            "neutral" => Some(DiagramTheme::Neutral),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            DiagramTheme::Default => "default",
            DiagramTheme::Dark => "dark",
            DiagramTheme::Forest => "forest",
            DiagramTheme::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiagramSpec {
    pub source: String,
    pub theme: DiagramTheme,
}

impl DiagramSpec {
    pub fn new(source: impl Into<String>, theme: DiagramTheme) -> Self {
        Self {
            source: source.into(),
            theme,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThemeVariables {
    pub primary_color: String,
    pub primary_text_color: String,
    pub primary_border_color: String,
    pub line_color: String,
    pub secondary_color: String,
    pub tertiary_color: String,
}

impl Default for ThemeVariables {
    fn default() -> Self {
        Self {
            primary_color: "#3b82f6".to_string(),
            primary_text_color: "#1f2937".to_string(),
            primary_border_color: "#e5e7eb".to_string(),
            line_color: "#6b7280".to_string(),
            secondary_color: "#f3f4f6".to_string(),
            tertiary_color: "#ffffff".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlowchartOptions {
    pub use_max_width: bool,
    pub html_labels: bool,
    pub curve: String,
}

impl Default for FlowchartOptions {
    fn default() -> Self {
        Self {
            use_max_width: true,
            html_labels: true,
            curve: "basis".to_string(),
        }
    }
}

/// Colour and layout settings passed on every compile so diagrams look the
/// same across slides.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiagramStyle {
    pub theme_variables: ThemeVariables,
    pub flowchart: FlowchartOptions,
}

impl DiagramStyle {
    /// `%%{init: ...}%%` line carrying the theme and style.
    pub fn init_directive(&self, theme: DiagramTheme) -> String {
        let init = serde_json::json!({
            "theme": theme.tag(),
            "themeVariables": self.theme_variables,
            "flowchart": self.flowchart,
        });
        format!("%%{{init: {init}}}%%")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_directive_carries_theme_and_style() {
        let directive = DiagramStyle::default().init_directive(DiagramTheme::Forest);
        assert!(directive.starts_with("%%{init: {"));
        assert!(directive.ends_with("}}%%"));
        assert!(directive.contains(r#""theme":"forest""#));
        assert!(directive.contains(r##""primaryColor":"#3b82f6""##));
        assert!(directive.contains(r#""curve":"basis""#));
        assert!(directive.contains(r#""useMaxWidth":true"#));
    }

    #[test]
    fn theme_tags_round_trip() {
        for theme in DiagramTheme::ALL {
            assert_eq!(DiagramTheme::from_tag(theme.tag()), Some(theme));
        }
        assert_eq!(DiagramTheme::from_tag("Neutral"), None);
    }
}

use serde::{Deserialize, Serialize};

/// Process-wide distinguishing colours, used cyclically for per-category marks.
pub const CHART_PALETTE: [&str; 10] = [
    "#3b82f6", "#ef4444", "#10b981", "#f59e0b", "#8b5cf6", "#06b6d4", "#84cc16", "#f97316",
    "#ec4899", "#6366f1",
];

pub fn palette_color(index: usize) -> &'static str {
    CHART_PALETTE[index % CHART_PALETTE.len()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub title_font_size: f32,
    pub emphasis_font_size: f32,
    pub text_color: String,
    pub muted_text_color: String,
    pub accent_color: String,
    pub border_color: String,
    pub divider_color: String,
    pub card_background: String,
    pub card_shadow: String,
    pub grid_color: String,
    pub axis_color: String,
    pub code_background: String,
    pub background: String,
    pub rating_restricted: String,
    pub rating_internal: String,
    pub rating_unclassified: String,
    pub error_color: String,
}

impl Theme {
    pub fn slide_default() -> Self {
        Self {
            font_family: "ui-sans-serif, system-ui, sans-serif".to_string(),
            font_size: 18.0,
            title_font_size: 40.0,
            emphasis_font_size: 48.0,
            text_color: "#111827".to_string(),
            muted_text_color: "#374151".to_string(),
            accent_color: "#2563eb".to_string(),
            border_color: "#d1d5db".to_string(),
            divider_color: "#e5e7eb".to_string(),
            card_background: "#ffffff".to_string(),
            card_shadow: "rgba(43, 43, 43, 0.2)".to_string(),
            grid_color: "#e5e7eb".to_string(),
            axis_color: "#6b7280".to_string(),
            code_background: "#f3f4f6".to_string(),
            background: "#FFFFFF".to_string(),
            rating_restricted: "#dc2626".to_string(),
            rating_internal: "#ca8a04".to_string(),
            rating_unclassified: "#4b5563".to_string(),
            error_color: "#ef4444".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 17.0,
            text_color: "#1C2430".to_string(),
            muted_text_color: "#4A5568".to_string(),
            accent_color: "#3b82f6".to_string(),
            border_color: "#C7D2E5".to_string(),
            divider_color: "#D7E0F0".to_string(),
            grid_color: "#EEF2F8".to_string(),
            axis_color: "#7A8AA6".to_string(),
            code_background: "#F7FAFF".to_string(),
            ..Self::slide_default()
        }
    }

    /// Resolves a theme by configuration name.
    pub fn named(name: &str) -> Option<Self> {
        match name {
            "modern" => Some(Self::modern()),
            "default" | "base" | "slide" => Some(Self::slide_default()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::slide_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_wraps_around() {
        assert_eq!(palette_color(0), "#3b82f6");
        assert_eq!(palette_color(1), "#ef4444");
        assert_eq!(palette_color(CHART_PALETTE.len()), palette_color(0));
        assert_eq!(palette_color(23), CHART_PALETTE[3]);
    }

    #[test]
    fn named_themes_resolve() {
        assert_eq!(Theme::named("modern").map(|t| t.font_size), Some(17.0));
        assert!(Theme::named("unknown").is_none());
    }
}

//! Color theme built from the configured palettes.

use crate::config::{PaletteConfig, ThemeConfig};
use crate::state::ThemeMode;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders};
use tracing::warn;

/// Resolved colors for one theme mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub background: Color,
    pub foreground: Color,
    pub border: Color,
    pub selection: Color,
    pub muted: Color,
    /// Whether to draw Unicode glyphs (arrows, bullets, braille).
    pub unicode: bool,
}

impl Theme {
    /// Theme for `mode` using the configured palettes.
    pub fn new(config: &ThemeConfig, mode: ThemeMode) -> Self {
        Self::from_palette(config.palette(mode))
    }

    /// Resolve a palette; invalid colors fall back to the terminal default.
    pub fn from_palette(palette: &PaletteConfig) -> Self {
        Self {
            primary: parse_color(&palette.primary),
            secondary: parse_color(&palette.secondary),
            accent: parse_color(&palette.accent),
            success: parse_color(&palette.success),
            warning: parse_color(&palette.warning),
            error: parse_color(&palette.error),
            background: parse_color(&palette.background),
            foreground: parse_color(&palette.foreground),
            border: parse_color(&palette.border),
            selection: parse_color(&palette.selection),
            muted: parse_color(&palette.muted),
            unicode: true,
        }
    }

    pub fn with_unicode(mut self, unicode: bool) -> Self {
        self.unicode = unicode;
        self
    }

    /// Base text style.
    pub fn text(&self) -> Style {
        Style::default().fg(self.foreground).bg(self.background)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn heading(&self) -> Style {
        Style::default()
            .fg(self.primary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn key(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn highlight(&self) -> Style {
        Style::default()
            .bg(self.selection)
            .add_modifier(Modifier::BOLD)
    }

    /// Green for gains (and flat), red for losses.
    pub fn change(&self, is_up: bool) -> Style {
        Style::default().fg(if is_up { self.success } else { self.error })
    }

    /// Bordered block with a title.
    pub fn block<'a>(&self, title: impl Into<String>) -> Block<'a> {
        Block::default()
            .title(format!(" {} ", title.into()))
            .title_style(self.heading())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.border))
            .style(self.text())
    }

    /// Up/down marker for a change.
    pub fn trend_symbol(&self, is_up: bool) -> &'static str {
        match (self.unicode, is_up) {
            (true, true) => "▲",
            (true, false) => "▼",
            (false, true) => "+",
            (false, false) => "-",
        }
    }
}

fn parse_color(value: &str) -> Color {
    value.parse().unwrap_or_else(|_| {
        warn!(color = value, "invalid theme color");
        Color::Reset
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_hex_colors_are_parsed() {
        let theme = Theme::from_palette(&PaletteConfig::dark());
        assert_eq!(theme.success, Color::Rgb(0x66, 0xbb, 0x6a));
        assert_eq!(theme.error, Color::Rgb(0xef, 0x53, 0x50));
    }

    #[test]
    fn test_invalid_color_falls_back() {
        let palette = PaletteConfig {
            accent: "not-a-color".to_string(),
            ..PaletteConfig::dark()
        };
        assert_eq!(Theme::from_palette(&palette).accent, Color::Reset);
    }

    #[test]
    fn test_modes_use_their_palettes() {
        let config = ThemeConfig::default();
        let dark = Theme::new(&config, ThemeMode::Dark);
        let light = Theme::new(&config, ThemeMode::Light);
        assert_ne!(dark.background, light.background);
    }

    #[test]
    fn test_ascii_trend_symbols() {
        let theme = Theme::from_palette(&PaletteConfig::light()).with_unicode(false);
        assert_eq!(theme.trend_symbol(true), "+");
        assert_eq!(theme.trend_symbol(false), "-");
    }
}

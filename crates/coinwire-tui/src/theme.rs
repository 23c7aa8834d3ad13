use ratatui::style::Color;

/// Runtime theme colors
#[derive(Debug, Clone)]
pub struct Theme {
    // Background colors
    pub bg0: Color,
    pub bg1: Color,
    pub bg2: Color,

    // Foreground colors
    pub fg0: Color,
    pub grey0: Color,
    pub grey1: Color,
    pub grey2: Color,

    // Palette colors
    pub yellow: Color,
    pub aqua: Color,
    pub blue: Color,
    pub purple: Color,

    // Semantic colors
    pub selection: Color,
    pub error: Color,
    pub warning: Color,
    pub accent: Color,
}

impl Default for Theme {
    fn default() -> Self {
        // Gruvbox Material dark
        Self {
            bg0: Color::Rgb(0x28, 0x28, 0x28),
            bg1: Color::Rgb(0x32, 0x30, 0x2f),
            bg2: Color::Rgb(0x45, 0x40, 0x3d),
            fg0: Color::Rgb(0xd4, 0xbe, 0x98),
            grey0: Color::Rgb(0x7c, 0x6f, 0x64),
            grey1: Color::Rgb(0x92, 0x83, 0x74),
            grey2: Color::Rgb(0xa8, 0x99, 0x84),
            yellow: Color::Rgb(0xd8, 0xa6, 0x57),
            aqua: Color::Rgb(0x89, 0xb4, 0x82),
            blue: Color::Rgb(0x7d, 0xae, 0xa3),
            purple: Color::Rgb(0xd3, 0x86, 0x9b),
            selection: Color::Rgb(0x45, 0x40, 0x3d),
            error: Color::Rgb(0xea, 0x69, 0x62),
            warning: Color::Rgb(0xe7, 0x8a, 0x4e),
            accent: Color::Rgb(0x89, 0xb4, 0x82),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_palette_keeps_text_readable() {
        let theme = Theme::default();
        for color in [theme.fg0, theme.yellow, theme.accent, theme.error, theme.warning] {
            assert_ne!(color, theme.bg0);
            assert_ne!(color, theme.selection);
        }
        // Status bar and help popup sit on their own backgrounds
        assert_ne!(theme.bg1, theme.bg0);
        assert_ne!(theme.bg2, theme.bg0);
    }
}

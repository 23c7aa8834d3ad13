use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::theme::Theme;

const HELP_ENTRIES: [(&str, &str); 12] = [
    ("j / k", "Move down / up"),
    ("Ctrl-d / Ctrl-u", "Half page down / up"),
    ("gg / G", "Jump to top / bottom"),
    ("Tab / Shift-Tab", "Next / previous filter"),
    ("1..9", "Pick a filter"),
    ("/", "Search title, description and source"),
    ("Esc", "Clear search"),
    ("o / Enter", "Open article in browser"),
    ("r", "Refresh now"),
    ("?", "Toggle this help"),
    ("q", "Quit"),
    ("", "Feeds refresh automatically every few minutes"),
];

pub struct PopupWidget;

impl PopupWidget {
    /// Render the key binding overlay
    pub fn render_help(frame: &mut Frame, theme: &Theme) {
        let area = frame.area();

        let popup_width = 60u16.min(area.width.saturating_sub(4));
        let popup_height = (HELP_ENTRIES.len() as u16 + 4).min(area.height.saturating_sub(2));
        let popup_area = centered_rect(popup_width, popup_height, area);

        // Clear the background area
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(" Help ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.accent))
            .style(Style::default().bg(theme.bg1));

        let mut lines: Vec<Line> = HELP_ENTRIES
            .iter()
            .map(|(keys, description)| {
                Line::from(vec![
                    Span::styled(
                        format!(" {:<18}", keys),
                        Style::default()
                            .fg(theme.yellow)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(truncate_str(description, 38), Style::default().fg(theme.fg0)),
                ])
            })
            .collect();
        lines.push(Line::from(""));
        lines.push(
            Line::from(Span::styled(
                "Press any key to close",
                Style::default().fg(theme.grey1),
            ))
            .alignment(Alignment::Center),
        );

        frame.render_widget(Paragraph::new(lines).block(block), popup_area);
    }
}

/// Helper function to create a centered rect
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Truncate a string to max length with ellipsis
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

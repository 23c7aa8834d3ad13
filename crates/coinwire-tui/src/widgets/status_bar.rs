use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, Mode};

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let status_text = Self::status_text(app);

        let help_hint = " q:quit r:refresh /:search tab:filter o:open ?:help ";
        let padding_len = (area.width as usize)
            .saturating_sub(status_text.width() + help_hint.width());

        let status_color = if app.feed.last_error().is_some() {
            theme.warning
        } else {
            theme.fg0
        };

        let line = Line::from(vec![
            Span::styled(status_text, Style::default().fg(status_color).bg(theme.bg2)),
            Span::styled(" ".repeat(padding_len), Style::default().bg(theme.bg2)),
            Span::styled(help_hint, Style::default().fg(theme.grey2).bg(theme.bg2)),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }

    fn status_text(app: &App) -> String {
        let mode_str = match &app.mode {
            Mode::Normal => "NORMAL",
            Mode::Search(_) => "SEARCH",
            Mode::Help => "HELP",
        };

        let fetch_str = if app.feed.is_fetching() {
            format!("{} Fetching", app.spinner())
        } else {
            "Idle".to_string()
        };

        let updated = app
            .feed
            .last_updated()
            .map(|t| format!("Updated {}", t.format("%H:%M:%S")))
            .unwrap_or_else(|| "Never updated".to_string());

        let summary = format!(
            " {} | {} | {}/{} articles | {} | {}",
            mode_str,
            fetch_str,
            app.visible_count(),
            app.feed.articles().len(),
            app.feed.category(),
            updated
        );

        match &app.status_message {
            Some(msg) => format!("{} | {}", summary, msg),
            None => summary,
        }
    }
}

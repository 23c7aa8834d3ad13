use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Tabs},
    Frame,
};

use crate::app::{App, Mode};

/// Category tags plus the current search text
pub struct FilterBarWidget;

impl FilterBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;

        let search = match app.mode {
            Mode::Search(_) => Line::from(vec![
                Span::styled(" /", Style::default().fg(theme.yellow)),
                Span::styled(app.search_input.clone(), Style::default().fg(theme.fg0)),
                Span::styled("_ ", Style::default().fg(theme.yellow)),
            ]),
            _ if !app.feed.search().is_empty() => Line::from(Span::styled(
                format!(" search: {} ", app.feed.search()),
                Style::default().fg(theme.grey2),
            )),
            _ => Line::from(""),
        };

        let block = Block::default()
            .title(" Filters ")
            .title(search.alignment(Alignment::Right))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.grey0))
            .style(Style::default().bg(theme.bg0));

        let titles: Vec<Line> = app
            .filter_tags
            .iter()
            .enumerate()
            .map(|(i, tag)| {
                if i < 9 {
                    Line::from(format!("{}:{}", i + 1, tag))
                } else {
                    Line::from(tag.clone())
                }
            })
            .collect();

        let tabs = Tabs::new(titles)
            .block(block)
            .select(app.active_filter)
            .style(Style::default().fg(theme.grey1))
            .highlight_style(
                Style::default()
                    .fg(theme.bg0)
                    .bg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            )
            .divider(Span::styled("|", Style::default().fg(theme.grey0)));

        frame.render_widget(tabs, area);
    }
}

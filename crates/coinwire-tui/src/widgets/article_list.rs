use chrono::{DateTime, Utc};
use coinwire_core::{Article, ViewState};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::App;
use crate::theme::Theme;

pub struct ArticleListWidget;

impl ArticleListWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let title = match app.feed.view_state() {
            ViewState::Articles(list) => format!(" News ({}) ", list.len()),
            _ => " News ".to_string(),
        };

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.accent))
            .style(Style::default().bg(theme.bg0));

        match app.feed.view_state() {
            ViewState::Loading => {
                let message = format!("{} Loading crypto news...", app.spinner());
                Self::render_placeholder(frame, area, block, message, theme.grey2);
            }
            ViewState::Error(error) => {
                let message = format!("{}. Press r to retry.", error);
                Self::render_placeholder(frame, area, block, message, theme.error);
            }
            ViewState::NoResults => {
                let message = "No articles match the current filter or search.".to_string();
                Self::render_placeholder(frame, area, block, message, theme.warning);
            }
            ViewState::Articles(articles) => {
                let width = block.inner(area).width.saturating_sub(2) as usize;
                let query = app.feed.search().to_lowercase();
                let now = Utc::now();
                let show_age = app.config.ui.show_timestamps;

                let items: Vec<ListItem> = articles
                    .iter()
                    .enumerate()
                    .map(|(i, article)| {
                        let selected = i == app.selected;
                        Self::card(article, selected, &query, width, now, show_age, theme)
                    })
                    .collect();

                let list = List::new(items)
                    .block(block)
                    .highlight_style(Style::default().bg(theme.selection));

                let mut state = ListState::default();
                state.select(Some(app.selected));

                frame.render_stateful_widget(list, area, &mut state);
            }
        }
    }

    fn render_placeholder(
        frame: &mut Frame,
        area: Rect,
        block: Block<'_>,
        message: String,
        color: ratatui::style::Color,
    ) {
        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(message, Style::default().fg(color))),
        ])
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

        frame.render_widget(paragraph, area);
    }

    /// One card: title, meta line, description, link and a spacer
    fn card<'a>(
        article: &'a Article,
        selected: bool,
        query: &str,
        width: usize,
        now: DateTime<Utc>,
        show_age: bool,
        theme: &Theme,
    ) -> ListItem<'a> {
        let title_style = if selected {
            Style::default()
                .fg(theme.fg0)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.yellow)
        };
        let marker = if selected { "▌" } else { " " };

        let title = truncate_to_width(&article.title, width);
        let mut title_line = vec![Span::styled(marker, Style::default().fg(theme.accent))];
        if query.is_empty() {
            title_line.push(Span::styled(title, title_style));
        } else {
            title_line.extend(highlight_matches(&title, query, title_style, theme));
        }

        let mut meta = vec![
            Span::raw(" "),
            Span::styled(article.source.clone(), Style::default().fg(theme.aqua)),
        ];
        if show_age {
            meta.push(Span::styled(
                format!(" · {}", age_label(article.published_at, now)),
                Style::default().fg(theme.grey1),
            ));
        }
        for category in article.categories.iter().take(4) {
            meta.push(Span::styled(
                format!(" [{}]", category),
                Style::default().fg(theme.purple),
            ));
        }

        let description = if article.description.is_empty() {
            String::new()
        } else {
            truncate_to_width(&article.description, width.saturating_sub(1))
        };

        let link = if article.has_link() {
            Span::styled(
                truncate_to_width(&article.url, width.saturating_sub(1)),
                Style::default().fg(theme.blue).add_modifier(Modifier::UNDERLINED),
            )
        } else {
            Span::styled("no link", Style::default().fg(theme.grey0))
        };

        ListItem::new(vec![
            Line::from(title_line),
            Line::from(meta),
            Line::from(vec![
                Span::raw(" "),
                Span::styled(description, Style::default().fg(theme.grey2)),
            ]),
            Line::from(vec![Span::raw(" "), link]),
            Line::from(""),
        ])
    }
}

/// Highlight matching parts of a string with a different color
fn highlight_matches(text: &str, query: &str, base_style: Style, theme: &Theme) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let text_lower = text.to_lowercase();

    let matches: Vec<(usize, usize)> = text_lower
        .match_indices(query)
        .map(|(start, m)| (start, start + m.len()))
        .collect();

    // Offsets come from the lowercased copy; lowercasing can move char
    // boundaries, so only highlight when every range maps back cleanly
    let aligned = text_lower.len() == text.len()
        && matches
            .iter()
            .all(|&(start, end)| text.is_char_boundary(start) && text.is_char_boundary(end));
    if !aligned {
        return vec![Span::styled(text.to_string(), base_style)];
    }

    let highlight_style = base_style.fg(theme.bg0).bg(theme.yellow);
    let mut last_end = 0;

    for (start, end) in matches {
        if start > last_end {
            spans.push(Span::styled(text[last_end..start].to_string(), base_style));
        }
        spans.push(Span::styled(text[start..end].to_string(), highlight_style));
        last_end = end;
    }

    if last_end < text.len() {
        spans.push(Span::styled(text[last_end..].to_string(), base_style));
    }

    if spans.is_empty() {
        spans.push(Span::styled(text.to_string(), base_style));
    }

    spans
}

/// Relative age such as "just now", "5m ago", "3h ago" or "2d ago"
pub fn age_label(published_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - published_at).num_minutes();
    match minutes {
        i64::MIN..=0 => "just now".to_string(),
        1..=59 => format!("{}m ago", minutes),
        60..=1439 => format!("{}h ago", minutes / 60),
        _ => format!("{}d ago", minutes / 1440),
    }
}

/// Truncate to a display width, ending with "…" when cut
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max_width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

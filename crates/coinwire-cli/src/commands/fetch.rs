use anyhow::{anyhow, Result};
use chrono::Utc;

use coinwire_core::{Aggregator, AppConfig, Article, CycleTrigger, FeedController, UiEvent, ViewState};
use coinwire_tui::widgets::age_label;

pub async fn run(
    config: &AppConfig,
    category: &str,
    search: &str,
    json: bool,
    limit: Option<usize>,
) -> Result<()> {
    let aggregator = Aggregator::from_config(config)?;

    let mut controller = FeedController::new();
    controller.handle_event(UiEvent::FilterSelected(category.to_string()));
    controller.handle_event(UiEvent::SearchChanged(search.to_string()));
    controller.refresh(&aggregator, CycleTrigger::Manual).await;

    let articles: &[Article] = match controller.view_state() {
        ViewState::Articles(list) => list,
        ViewState::Error(error) => return Err(anyhow!("{}", error)),
        ViewState::NoResults | ViewState::Loading => &[],
    };
    let shown = &articles[..limit.unwrap_or(articles.len()).min(articles.len())];

    if json {
        println!("{}", serde_json::to_string_pretty(shown)?);
        return Ok(());
    }

    if shown.is_empty() {
        println!("No articles match the current filter or search.");
        return Ok(());
    }

    let now = Utc::now();
    for article in shown {
        println!("{}", article.title);

        let mut meta = format!("  {} | {}", article.source, age_label(article.published_at, now));
        if !article.categories.is_empty() {
            meta.push_str(&format!(" | {}", article.categories.join(", ")));
        }
        println!("{}", meta);

        if !article.description.is_empty() {
            println!("  {}", article.description);
        }
        if article.has_link() {
            println!("  {}", article.url);
        }
        println!();
    }

    println!(
        "{} of {} articles (category: {})",
        shown.len(),
        controller.articles().len(),
        controller.category()
    );

    Ok(())
}

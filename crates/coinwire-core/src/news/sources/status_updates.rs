use async_trait::async_trait;
use chrono::{DateTime, Utc};
use html2text::render::TrivialDecorator;
use serde::Deserialize;

use super::NewsSource;
use crate::news::client::JsonClient;
use crate::news::models::{placeholder_image, truncate_chars, Article, NO_LINK};
use crate::Result;

pub const DEFAULT_ENDPOINT: &str = "https://api.coingecko.com/api/v3/status_updates?per_page=20";

const TITLE_CHARS: usize = 100;
const DESCRIPTION_CHARS: usize = 150;
// Wide enough that html2text never wraps a status update
const TEXT_WIDTH: usize = 10_000;

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status_updates: Vec<RawUpdate>,
}

#[derive(Debug, Deserialize)]
struct RawUpdate {
    #[serde(default)]
    description: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    project: RawProject,
}

#[derive(Debug, Deserialize)]
struct RawProject {
    #[serde(default)]
    name: String,
    #[serde(default)]
    image: Option<RawImage>,
}

#[derive(Debug, Deserialize)]
struct RawImage {
    #[serde(default)]
    large: Option<String>,
}

/// Announcements posted by crypto projects. Updates carry no link, so
/// cards point at the placeholder target.
pub struct StatusUpdates {
    client: JsonClient,
    endpoint: String,
}

impl StatusUpdates {
    pub fn new(client: JsonClient, endpoint: Option<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
        }
    }
}

#[async_trait]
impl NewsSource for StatusUpdates {
    fn name(&self) -> &str {
        "CoinGecko Status Updates"
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn fetch(&self) -> Result<Vec<Article>> {
        let body = self.client.get_bytes(&self.endpoint).await?;
        parse(&body, Utc::now())
    }
}

pub(crate) fn parse(body: &[u8], now: DateTime<Utc>) -> Result<Vec<Article>> {
    let response: StatusResponse = serde_json::from_slice(body)?;

    let articles = response
        .status_updates
        .into_iter()
        .filter_map(|raw| normalize(raw, now))
        .collect();

    Ok(articles)
}

fn normalize(raw: RawUpdate, now: DateTime<Utc>) -> Option<Article> {
    let project = raw.project.name.trim().to_string();
    let text = plain_text(&raw.description);
    let headline = first_sentence(&text);

    let title = match (project.is_empty(), headline.is_empty()) {
        (true, true) => return None,
        (false, true) => format!("{} posted an update", project),
        (true, false) => truncate_chars(headline, TITLE_CHARS),
        (false, false) => truncate_chars(&format!("{}: {}", project, headline), TITLE_CHARS),
    };

    let published_at = raw
        .created_at
        .as_deref()
        .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
        .map(|ts| ts.with_timezone(&Utc))
        .unwrap_or(now);

    let category = raw
        .category
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| "general".to_string());

    Some(Article {
        title,
        description: truncate_chars(&text, DESCRIPTION_CHARS),
        url: NO_LINK.to_string(),
        image_url: raw
            .project
            .image
            .and_then(|img| img.large)
            .filter(|u| !u.is_empty())
            .unwrap_or_else(placeholder_image),
        source: if project.is_empty() {
            "CoinGecko".to_string()
        } else {
            project
        },
        published_at,
        categories: vec![category, "update".to_string()],
    })
}

/// Strip markup and collapse whitespace. Links keep only their text.
fn plain_text(html: &str) -> String {
    let text = html2text::config::with_decorator(TrivialDecorator::new())
        .string_from_read(html.as_bytes(), TEXT_WIDTH)
        .unwrap_or_else(|_| html.to_string());
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text up to the first terminator that ends a word, so "2.5" or
/// "foo.io" does not cut the sentence short
fn first_sentence(text: &str) -> &str {
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            match chars.peek() {
                None => return text[..i].trim(),
                Some((_, next)) if next.is_whitespace() => return text[..i].trim(),
                _ => {}
            }
        }
    }
    text.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        "2024-03-01T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_parse_status_update() {
        let body = serde_json::json!({
            "status_updates": [{
                "description": "Mainnet v2 is live! Validators should upgrade before block 1,000,000.",
                "category": "Milestone",
                "created_at": "2024-02-20T08:30:00.000Z",
                "user": "team",
                "user_title": "Core",
                "pin": false,
                "project": {
                    "type": "Coin",
                    "id": "cosmos",
                    "name": "Cosmos Hub",
                    "symbol": "atom",
                    "image": { "large": "https://assets.coingecko.com/coins/images/1481/large/cosmos.png" }
                }
            }]
        });

        let articles = parse(body.to_string().as_bytes(), now()).unwrap();
        assert_eq!(articles.len(), 1);

        let a = &articles[0];
        assert_eq!(a.title, "Cosmos Hub: Mainnet v2 is live");
        assert_eq!(a.source, "Cosmos Hub");
        assert_eq!(a.url, NO_LINK);
        assert_eq!(a.categories, vec!["milestone", "update"]);
        assert_eq!(
            a.published_at,
            "2024-02-20T08:30:00Z".parse::<DateTime<Utc>>().unwrap()
        );
        assert!(a.description.starts_with("Mainnet v2 is live!"));
    }

    #[test]
    fn test_bad_timestamp_falls_back_to_now() {
        let body = br#"{"status_updates":[{"description":"Hello","created_at":"yesterday","project":{"name":"Foo"}}]}"#;
        let articles = parse(body, now()).unwrap();
        assert_eq!(articles[0].published_at, now());
        assert_eq!(articles[0].categories, vec!["general", "update"]);
    }

    #[test]
    fn test_description_is_truncated() {
        let long = "word ".repeat(100);
        let body = serde_json::json!({
            "status_updates": [{ "description": long, "project": { "name": "Foo" } }]
        });
        let articles = parse(body.to_string().as_bytes(), now()).unwrap();
        assert!(articles[0].description.chars().count() <= DESCRIPTION_CHARS + 3);
        assert!(articles[0].description.ends_with("..."));
    }

    #[test]
    fn test_empty_update_is_skipped() {
        let body = br#"{"status_updates":[{"description":"","project":{"name":""}}]}"#;
        assert!(parse(body, now()).unwrap().is_empty());
    }

    #[test]
    fn test_first_sentence() {
        assert_eq!(first_sentence("One. Two."), "One");
        assert_eq!(first_sentence("No terminator"), "No terminator");
    }

    #[test]
    fn test_first_sentence_ignores_decimals_and_domains() {
        assert_eq!(
            first_sentence("Version 2.5 of the wallet is now live with staking support."),
            "Version 2.5 of the wallet is now live with staking support"
        );
        assert_eq!(
            first_sentence("Read more on foo.io/blog today! Thanks."),
            "Read more on foo.io/blog today"
        );
    }

    #[test]
    fn test_plain_text_strips_markup() {
        assert_eq!(plain_text("<p>Hello <b>bold</b> <span>world</span></p>"), "Hello bold world");
    }

    #[test]
    fn test_links_keep_only_their_text() {
        let body = serde_json::json!({
            "status_updates": [{
                "description": "<p>Read the <a href=\"https://foo.io/blog\">announcement</a> today</p>",
                "project": { "name": "Foo" }
            }]
        });
        let articles = parse(body.to_string().as_bytes(), now()).unwrap();
        assert_eq!(articles[0].title, "Foo: Read the announcement today");
        assert_eq!(articles[0].description, "Read the announcement today");
    }

    #[test]
    fn test_version_number_stays_in_title() {
        let body = serde_json::json!({
            "status_updates": [{
                "description": "Version 2.5 of the wallet is now live with staking support.",
                "project": { "name": "Foo" }
            }]
        });
        let articles = parse(body.to_string().as_bytes(), now()).unwrap();
        assert_eq!(
            articles[0].title,
            "Foo: Version 2.5 of the wallet is now live with staking support"
        );
    }
}

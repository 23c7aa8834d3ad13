use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::NewsSource;
use crate::news::client::JsonClient;
use crate::news::models::{placeholder_image, truncate_chars, Article, NO_LINK};
use crate::Result;

pub const DEFAULT_ENDPOINT: &str = "https://min-api.cryptocompare.com/data/v2/news/?lang=EN";

const DESCRIPTION_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(rename = "Data")]
    data: Vec<RawNews>,
}

#[derive(Debug, Deserialize)]
struct RawNews {
    #[serde(default)]
    title: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    imageurl: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    source_info: Option<RawSourceInfo>,
    #[serde(default)]
    published_on: Option<i64>,
    #[serde(default)]
    categories: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSourceInfo {
    #[serde(default)]
    name: Option<String>,
}

/// General crypto news headlines
pub struct CryptoCompareNews {
    client: JsonClient,
    endpoint: String,
}

impl CryptoCompareNews {
    pub fn new(client: JsonClient, endpoint: Option<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
        }
    }
}

#[async_trait]
impl NewsSource for CryptoCompareNews {
    fn name(&self) -> &str {
        "CryptoCompare"
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn fetch(&self) -> Result<Vec<Article>> {
        let body = self.client.get_bytes(&self.endpoint).await?;
        parse(&body, Utc::now())
    }
}

/// Map a news payload; `now` stands in for missing publish times
pub(crate) fn parse(body: &[u8], now: DateTime<Utc>) -> Result<Vec<Article>> {
    let response: NewsResponse = serde_json::from_slice(body)?;

    let articles = response
        .data
        .into_iter()
        .filter(|raw| !raw.title.trim().is_empty())
        .map(|raw| normalize(raw, now))
        .collect();

    Ok(articles)
}

fn normalize(raw: RawNews, now: DateTime<Utc>) -> Article {
    let source = raw
        .source_info
        .and_then(|info| info.name)
        .filter(|name| !name.is_empty())
        .or(raw.source.filter(|s| !s.is_empty()))
        .unwrap_or_else(|| "CryptoCompare".to_string());

    let published_at = raw
        .published_on
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or(now);

    let categories = raw
        .categories
        .unwrap_or_default()
        .split('|')
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .collect();

    Article {
        title: raw.title.trim().to_string(),
        description: truncate_chars(raw.body.as_deref().unwrap_or(""), DESCRIPTION_CHARS),
        url: raw
            .url
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| NO_LINK.to_string()),
        image_url: raw
            .imageurl
            .filter(|u| !u.is_empty())
            .unwrap_or_else(placeholder_image),
        source,
        published_at,
        categories,
    }
}

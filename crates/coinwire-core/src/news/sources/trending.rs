use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::NewsSource;
use crate::news::client::JsonClient;
use crate::news::models::{placeholder_image, Article};
use crate::Result;

pub const DEFAULT_ENDPOINT: &str = "https://api.coingecko.com/api/v3/search/trending";

const COIN_PAGE_BASE: &str = "https://www.coingecko.com/en/coins";

#[derive(Debug, Deserialize)]
struct TrendingResponse {
    coins: Vec<RawCoin>,
}

#[derive(Debug, Deserialize)]
struct RawCoin {
    item: RawItem,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    id: String,
    name: String,
    symbol: String,
    #[serde(default)]
    market_cap_rank: Option<u32>,
    #[serde(default)]
    score: Option<u32>,
    #[serde(default)]
    large: Option<String>,
    #[serde(default)]
    data: Option<RawMarketData>,
}

#[derive(Debug, Deserialize)]
struct RawMarketData {
    #[serde(default)]
    price_change_percentage_24h: Option<RawUsdChange>,
}

#[derive(Debug, Deserialize)]
struct RawUsdChange {
    #[serde(default)]
    usd: Option<f64>,
}

/// Coins currently trending in CoinGecko searches. The feed carries no
/// timestamps, so every entry is stamped with the fetch time.
pub struct TrendingCoins {
    client: JsonClient,
    endpoint: String,
}

impl TrendingCoins {
    pub fn new(client: JsonClient, endpoint: Option<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
        }
    }
}

#[async_trait]
impl NewsSource for TrendingCoins {
    fn name(&self) -> &str {
        "CoinGecko Trending"
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
    let response: TrendingResponse = serde_json::from_slice(body)?;

    let articles = response
        .coins
        .into_iter()
        .map(|coin| coin.item)
        .filter(|item| !item.name.trim().is_empty())
        .map(|item| normalize(item, now))
        .collect();

    Ok(articles)
}

fn normalize(item: RawItem, now: DateTime<Utc>) -> Article {
    let symbol = item.symbol.trim().to_uppercase();

    Article {
        title: format!("{} ({}) is trending on CoinGecko", item.name.trim(), symbol),
        description: summary(&item),
        url: format!("{}/{}", COIN_PAGE_BASE, item.id),
        image_url: item
            .large
            .filter(|u| !u.is_empty())
            .unwrap_or_else(placeholder_image),
        source: "CoinGecko".to_string(),
        published_at: now,
        categories: vec!["trending".to_string(), symbol.to_lowercase()],
    }
}

fn summary(item: &RawItem) -> String {
    let mut parts = Vec::new();

    if let Some(rank) = item.market_cap_rank {
        parts.push(format!("Market cap rank #{}.", rank));
    }
    if let Some(score) = item.score {
        parts.push(format!("Trending position #{}.", score + 1));
    }
    let change = item
        .data
        .as_ref()
        .and_then(|d| d.price_change_percentage_24h.as_ref())
        .and_then(|c| c.usd);
    if let Some(change) = change {
        parts.push(format!("24h change {:+.2}%.", change));
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        "2024-03-01T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_parse_trending_coin() {
        let body = serde_json::json!({
            "coins": [{
                "item": {
                    "id": "pepe",
                    "coin_id": 29850,
                    "name": "Pepe",
                    "symbol": "pepe",
                    "market_cap_rank": 24,
                    "large": "https://assets.coingecko.com/coins/images/29850/large/pepe.jpeg",
                    "score": 0,
                    "data": { "price_change_percentage_24h": { "usd": 12.3456 } }
                }
            }],
            "nfts": [],
            "categories": []
        });

        let articles = parse(body.to_string().as_bytes(), now()).unwrap();
        assert_eq!(articles.len(), 1);

        let a = &articles[0];
        assert_eq!(a.title, "Pepe (PEPE) is trending on CoinGecko");
        assert_eq!(a.url, "https://www.coingecko.com/en/coins/pepe");
        assert_eq!(a.source, "CoinGecko");
        assert_eq!(a.published_at, now());
        assert_eq!(a.categories, vec!["trending", "pepe"]);
        assert_eq!(
            a.description,
            "Market cap rank #24. Trending position #1. 24h change +12.35%."
        );
    }

    #[test]
    fn test_summary_omits_missing_figures() {
        let body = br#"{"coins":[{"item":{"id":"x","name":"X","symbol":"x"}}]}"#;
        let articles = parse(body, now()).unwrap();
        assert!(articles[0].description.is_empty());
        assert!(crate::news::models::is_placeholder_image(&articles[0].image_url));
    }

    #[test]
    fn test_missing_coins_field_fails() {
        assert!(parse(br#"{"status":{"error_code":429}}"#, now()).is_err());
    }
}

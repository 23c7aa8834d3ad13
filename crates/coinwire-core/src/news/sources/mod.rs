//! Source adapters.
//!
//! Every adapter fetches one fixed JSON endpoint and maps its records into
//! [`Article`]s. Adapters report failures through [`NewsSource::fetch`];
//! [`fetch_or_empty`] is the boundary that absorbs them so one broken source
//! never aborts the others.

mod cryptocompare;
mod status_updates;
mod trending;

use std::sync::Arc;

use async_trait::async_trait;

pub use cryptocompare::CryptoCompareNews;
pub use status_updates::StatusUpdates;
pub use trending::TrendingCoins;

use super::client::JsonClient;
use super::models::Article;
use crate::config::AppConfig;
use crate::Result;

#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Display name used in logs and `coinwire sources`
    fn name(&self) -> &str;

    /// Endpoint this source reads from
    fn endpoint(&self) -> &str;

    /// Fetch the endpoint and normalize its records
    async fn fetch(&self) -> Result<Vec<Article>>;
}

/// Run a source, degrading any failure to an empty list
pub async fn fetch_or_empty(source: &dyn NewsSource) -> Vec<Article> {
    match source.fetch().await {
        Ok(articles) => {
            tracing::info!("Source '{}': {} articles", source.name(), articles.len());
            articles
        }
        Err(e) => {
            tracing::warn!("Source '{}' failed, contributing nothing: {}", source.name(), e);
            Vec::new()
        }
    }
}

/// Build the enabled sources in their fixed order: news, trending, status updates
pub fn build_sources(config: &AppConfig) -> Result<Vec<Arc<dyn NewsSource>>> {
    let client = JsonClient::new(config)?;
    let sources = &config.sources;
    let mut built: Vec<Arc<dyn NewsSource>> = Vec::new();

    if sources.news.enabled {
        built.push(Arc::new(CryptoCompareNews::new(
            client.clone(),
            sources.news.endpoint.clone(),
        )));
    }
    if sources.trending.enabled {
        built.push(Arc::new(TrendingCoins::new(
            client.clone(),
            sources.trending.endpoint.clone(),
        )));
    }
    if sources.status_updates.enabled {
        built.push(Arc::new(StatusUpdates::new(
            client,
            sources.status_updates.endpoint.clone(),
        )));
    }

    if built.is_empty() {
        tracing::warn!("All sources are disabled in configuration");
    }

    Ok(built)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    struct Failing;

    #[async_trait]
    impl NewsSource for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn endpoint(&self) -> &str {
            "https://example.invalid"
        }

        async fn fetch(&self) -> Result<Vec<Article>> {
            Err(Error::Status {
                status: 503,
                url: self.endpoint().to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_fetch_or_empty_absorbs_errors() {
        assert!(fetch_or_empty(&Failing).await.is_empty());
    }

    #[test]
    fn test_build_sources_respects_enabled_flags() {
        let mut config = AppConfig::default();
        let all = build_sources(&config).unwrap();
        let names: Vec<&str> = all.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["CryptoCompare", "CoinGecko Trending", "CoinGecko Status Updates"]);

        config.sources.trending.enabled = false;
        let some = build_sources(&config).unwrap();
        assert_eq!(some.len(), 2);
        assert!(some.iter().all(|s| s.name() != "CoinGecko Trending"));
    }

    #[test]
    fn test_build_sources_applies_endpoint_override() {
        let mut config = AppConfig::default();
        config.sources.news.endpoint = Some("http://127.0.0.1:9000/news".to_string());
        let sources = build_sources(&config).unwrap();
        assert_eq!(sources[0].endpoint(), "http://127.0.0.1:9000/news");
        assert_eq!(sources[1].endpoint(), trending::DEFAULT_ENDPOINT);
    }
}

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, Proxy};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::AppConfig;
use crate::{Error, Result};

const MAX_RESPONSE_BYTES: usize = 5 * 1024 * 1024;
const CLIENT_USER_AGENT: &str = concat!("coinwire/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client for the JSON sources. One request per call, no retries.
#[derive(Clone)]
pub struct JsonClient {
    client: Client,
}

impl JsonClient {
    /// Create a client from configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Self::build_client(config.sync.request_timeout_secs, &config.sync.proxy_url)?;
        Ok(Self { client })
    }

    /// Build HTTP client with optional proxy
    fn build_client(timeout_secs: u64, proxy_url: &Option<String>) -> Result<Client> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .default_headers(Self::build_headers())
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(10));

        if let Some(ref proxy) = proxy_url {
            let proxy = Proxy::all(proxy)
                .map_err(|e| Error::Config(format!("Invalid proxy URL: {}", e)))?;
            builder = builder.proxy(proxy);
            tracing::info!("Using HTTP proxy for source fetching");
        }

        builder.build().map_err(Error::Http)
    }

    fn build_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        headers
    }

    /// GET a URL and return the raw body; non-2xx and oversized bodies are errors
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        Url::parse(url)?;

        tracing::debug!("Fetching {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = response.bytes().await?;
        ensure_content_size(bytes.len(), url)?;

        Ok(bytes.to_vec())
    }

    /// GET a URL and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.get_bytes(url).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

fn ensure_content_size(size: usize, url: &str) -> Result<()> {
    if size > MAX_RESPONSE_BYTES {
        return Err(Error::TooLarge {
            size,
            url: url.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds_with_defaults() {
        assert!(JsonClient::new(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_proxy_is_config_error() {
        let mut config = AppConfig::default();
        config.sync.proxy_url = Some("http://[invalid".to_string());
        assert!(matches!(JsonClient::new(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_content_size_limit() {
        assert!(ensure_content_size(1024, "https://example.com").is_ok());
        assert!(matches!(
            ensure_content_size(MAX_RESPONSE_BYTES + 1, "https://example.com"),
            Err(Error::TooLarge { .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_url_rejected_before_request() {
        let client = JsonClient::new(&AppConfig::default()).unwrap();
        let err = client.get_bytes("not a url").await.unwrap_err();
        assert!(matches!(err, Error::UrlParse(_)));
    }
}

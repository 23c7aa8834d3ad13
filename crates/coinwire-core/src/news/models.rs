use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Link target used when a source provides no URL
pub const NO_LINK: &str = "#";

/// Number of leading title characters (after lower-casing) that identify a story
pub const DEDUP_PREFIX_CHARS: usize = 50;

/// Fallback images used when a source has no artwork or an image is broken
pub const PLACEHOLDER_IMAGES: [&str; 5] = [
    "https://images.unsplash.com/photo-1518546305927-5a555bb7020d?w=800",
    "https://images.unsplash.com/photo-1621761191319-c6fb62004040?w=800",
    "https://images.unsplash.com/photo-1639762681485-074b7f938ba0?w=800",
    "https://images.unsplash.com/photo-1622630998477-20aa696ecb05?w=800",
    "https://images.unsplash.com/photo-1640340434855-6084b1f4901c?w=800",
];

/// Pick one of the placeholder images at random
pub fn placeholder_image() -> String {
    let index = rand::rng().random_range(0..PLACEHOLDER_IMAGES.len());
    PLACEHOLDER_IMAGES[index].to_string()
}

/// Whether the URL is one of the built-in placeholders
pub fn is_placeholder_image(url: &str) -> bool {
    PLACEHOLDER_IMAGES.contains(&url)
}

/// A normalized headline from any source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    pub image_url: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl Article {
    /// Key used to collapse near-duplicate headlines across sources
    pub fn dedup_key(&self) -> String {
        self.title
            .to_lowercase()
            .chars()
            .take(DEDUP_PREFIX_CHARS)
            .collect()
    }

    /// Lower-cased text matched by the category filter
    pub fn category_text(&self) -> String {
        format!(
            "{} {} {}",
            self.title,
            self.description,
            self.categories.join(" ")
        )
        .to_lowercase()
    }

    /// Lower-cased text matched by free-text search
    pub fn search_text(&self) -> String {
        format!("{} {} {}", self.title, self.description, self.source).to_lowercase()
    }

    /// Whether the article links anywhere
    pub fn has_link(&self) -> bool {
        !self.url.is_empty() && self.url != NO_LINK
    }

    /// Swap a broken image for a random placeholder
    pub fn replace_broken_image(&mut self) {
        if !is_placeholder_image(&self.image_url) {
            tracing::debug!(url = %self.image_url, "Replacing broken image with placeholder");
            self.image_url = placeholder_image();
        }
    }
}

/// Truncate to at most `max_chars` characters, appending "..." when cut
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str) -> Article {
        Article {
            title: title.to_string(),
            description: "Spot ETF inflows".to_string(),
            url: NO_LINK.to_string(),
            image_url: PLACEHOLDER_IMAGES[0].to_string(),
            source: "CoinDesk".to_string(),
            published_at: Utc::now(),
            categories: vec!["btc".to_string(), "market".to_string()],
        }
    }

    #[test]
    fn test_dedup_key_folds_case_and_truncates() {
        let a = article("Bitcoin Surges Past $50000 As Market Rallies On ETF News Today");
        let b = article("BITCOIN SURGES PAST $50000 AS MARKET RALLIES ON ETF INFLOWS");
        assert_eq!(a.dedup_key().chars().count(), 50);
        assert_eq!(a.dedup_key(), "bitcoin surges past $50000 as market rallies on et");
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn test_dedup_key_differs_when_titles_split_early() {
        let a = article("Bitcoin Surges Past $50000 As Market Rallies On ETF News Today");
        let b = article("Bitcoin Surges Past $50000 As Market Rallies Hard");
        assert_eq!(b.dedup_key(), "bitcoin surges past $50000 as market rallies hard");
        assert_ne!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn test_dedup_key_short_title() {
        assert_eq!(article("ETH Merge").dedup_key(), "eth merge");
    }

    #[test]
    fn test_dedup_key_counts_chars_not_bytes() {
        let title = "€".repeat(60);
        assert_eq!(article(&title).dedup_key().chars().count(), 50);
    }

    #[test]
    fn test_haystacks() {
        let a = article("Bitcoin Rally");
        assert!(a.category_text().contains("market"));
        assert!(!a.category_text().contains("coindesk"));
        assert!(a.search_text().contains("coindesk"));
        assert!(!a.search_text().contains("market"));
    }

    #[test]
    fn test_has_link() {
        let mut a = article("x");
        assert!(!a.has_link());
        a.url = "https://example.com".to_string();
        assert!(a.has_link());
    }

    #[test]
    fn test_placeholder_image_from_pool() {
        for _ in 0..20 {
            assert!(is_placeholder_image(&placeholder_image()));
        }
    }

    #[test]
    fn test_replace_broken_image() {
        let mut a = article("x");
        a.image_url = "https://broken.example/img.png".to_string();
        a.replace_broken_image();
        assert!(is_placeholder_image(&a.image_url));
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("abcdefghij", 4), "abcd...");
        assert_eq!(truncate_chars("ab cd ef", 3), "ab...");
    }

    #[test]
    fn test_serializes_iso_timestamp_and_camel_case() {
        let mut a = article("x");
        a.published_at = "2024-01-02T00:00:00Z".parse().unwrap();
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["publishedAt"], "2024-01-02T00:00:00Z");
        assert!(json.get("imageUrl").is_some());
        assert!(json["categories"].is_array());
    }
}

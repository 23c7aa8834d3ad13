use std::fmt;

use crate::news::Article;

/// Sentinel tag that disables category filtering
pub const ALL_CATEGORIES: &str = "all";

/// Active category filter
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Tag(String),
}

impl CategoryFilter {
    /// Parse a tag; "all" (any case) and blank select no filtering
    pub fn parse(tag: &str) -> Self {
        let tag = tag.trim();
        if tag.is_empty() || tag.eq_ignore_ascii_case(ALL_CATEGORIES) {
            Self::All
        } else {
            Self::Tag(tag.to_lowercase())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::All => ALL_CATEGORIES,
            Self::Tag(tag) => tag,
        }
    }

    pub fn matches(&self, article: &Article) -> bool {
        match self {
            Self::All => true,
            Self::Tag(tag) => article.category_text().contains(tag.as_str()),
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Narrow by category, then by free-text search.
///
/// Both stages are case-insensitive substring checks. Category matches
/// against title, description and categories; search matches against title,
/// description and source. The search text is used as typed, whitespace
/// included; only an empty search keeps everything.
pub fn apply_filters(articles: &[Article], category: &CategoryFilter, search: &str) -> Vec<Article> {
    let needle = search.to_lowercase();

    articles
        .iter()
        .filter(|article| category.matches(article))
        .filter(|article| needle.is_empty() || article.search_text().contains(&needle))
        .cloned()
        .collect()
}

use std::collections::HashSet;

use crate::news::Article;

/// Concatenate per-source results in source order
pub fn concat_outcomes(outcomes: Vec<Vec<Article>>) -> Vec<Article> {
    outcomes.into_iter().flatten().collect()
}

/// Newest first. The sort is stable, so equal timestamps keep source order.
pub fn sort_newest_first(articles: &mut [Article]) {
    articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
}

/// Keep the first article for each case-folded 50-character title prefix.
///
/// This is a deliberately lossy heuristic: headlines that only differ after
/// the prefix, or only by case within it, collapse into one entry.
pub fn dedup_by_title_prefix(articles: Vec<Article>) -> Vec<Article> {
    let mut seen = HashSet::new();
    articles
        .into_iter()
        .filter(|article| seen.insert(article.dedup_key()))
        .collect()
}

/// Concatenate, sort and deduplicate one cycle's source results
pub fn merge(outcomes: Vec<Vec<Article>>) -> Vec<Article> {
    let mut merged = concat_outcomes(outcomes);
    let total = merged.len();

    sort_newest_first(&mut merged);
    let merged = dedup_by_title_prefix(merged);

    tracing::debug!(
        "Merged {} articles, {} after deduplication",
        total,
        merged.len()
    );

    merged
}

use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::config::AppConfig;
use crate::news::{build_sources, fetch_or_empty, Article, NewsSource};
use crate::pipeline::merge;
use crate::{Error, Result};

/// Runs one fetch cycle across every configured source
#[derive(Clone)]
pub struct Aggregator {
    sources: Vec<Arc<dyn NewsSource>>,
}

impl Aggregator {
    pub fn new(sources: Vec<Arc<dyn NewsSource>>) -> Self {
        Self { sources }
    }

    /// Build the aggregator with the sources enabled in configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self::new(build_sources(config)?))
    }

    pub fn sources(&self) -> &[Arc<dyn NewsSource>] {
        &self.sources
    }

    /// Fetch every source concurrently, then merge, sort and deduplicate.
    ///
    /// Source failures are absorbed and contribute nothing. The cycle itself
    /// fails only when a source task cannot be joined (panic or cancellation);
    /// every task is still awaited before the error is returned.
    pub async fn run_fetch_cycle(&self) -> Result<Vec<Article>> {
        let mut join_set = JoinSet::new();

        for (index, source) in self.sources.iter().enumerate() {
            let source = Arc::clone(source);
            join_set.spawn(async move { (index, fetch_or_empty(source.as_ref()).await) });
        }

        let mut outcomes: Vec<Option<Vec<Article>>> = vec![None; self.sources.len()];
        let mut failure = None;

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, articles)) => outcomes[index] = Some(articles),
                Err(e) => {
                    tracing::error!("Source task failed: {}", e);
                    failure.get_or_insert_with(|| format!("source task failed: {}", e));
                }
            }
        }

        if let Some(message) = failure {
            return Err(Error::Cycle(message));
        }

        let merged = merge(outcomes.into_iter().flatten().collect());
        tracing::info!(
            "Fetch cycle complete: {} articles from {} sources",
            merged.len(),
            self.sources.len()
        );

        Ok(merged)
    }

    /// Run a fetch cycle on its own task. A cycle that panics or is cancelled
    /// still resolves, as `Error::Cycle`, so callers always get an outcome.
    pub async fn run_detached(&self) -> Result<Vec<Article>> {
        let aggregator = self.clone();
        settle(async move { aggregator.run_fetch_cycle().await }).await
    }
}

async fn settle<F>(cycle: F) -> Result<Vec<Article>>
where
    F: Future<Output = Result<Vec<Article>>> + Send + 'static,
{
    match tokio::spawn(cycle).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("Fetch cycle task failed: {}", e);
            Err(Error::Cycle(format!("fetch cycle task failed: {}", e)))
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, Utc};

    /// Scripted source for cycle tests
    pub(crate) struct StubSource {
        pub name: String,
        pub articles: Vec<Article>,
        pub fail: bool,
        pub panic: bool,
    }

    impl StubSource {
        pub fn ok(name: &str, articles: Vec<Article>) -> Self {
            Self {
                name: name.to_string(),
                articles,
                fail: false,
                panic: false,
            }
        }

        pub fn failing(name: &str) -> Self {
            Self {
                fail: true,
                ..Self::ok(name, Vec::new())
            }
        }

        pub fn panicking(name: &str) -> Self {
            Self {
                panic: true,
                ..Self::ok(name, Vec::new())
            }
        }
    }

    #[async_trait]
    impl NewsSource for StubSource {
        fn name(&self) -> &str {
            &self.name
        }

        fn endpoint(&self) -> &str {
            "stub://"
        }

        async fn fetch(&self) -> Result<Vec<Article>> {
            if self.panic {
                panic!("stub source panicked");
            }
            if self.fail {
                return Err(Error::Other(format!("{} is down", self.name)));
            }
            Ok(self.articles.clone())
        }
    }

    pub(crate) fn article(title: &str, published_at: DateTime<Utc>) -> Article {
        Article {
            title: title.to_string(),
            description: String::new(),
            url: "#".to_string(),
            image_url: String::new(),
            source: "stub".to_string(),
            published_at,
            categories: Vec::new(),
        }
    }

    /// Three sources with distinct titles and strictly decreasing timestamps
    /// across the concatenation, so the merged order equals source order.
    fn batches() -> Vec<Vec<Article>> {
        let base: DateTime<Utc> = "2024-01-10T00:00:00Z".parse().unwrap();
        (0..3)
            .map(|s| {
                (0..2)
                    .map(|i| {
                        let offset = (s * 2 + i) as i64;
                        article(&format!("source {} story {}", s, i), base - Duration::hours(offset))
                    })
                    .collect()
            })
            .collect()
    }

    #[tokio::test]
    async fn test_every_success_failure_combination() {
        let batches = batches();

        for mask in 0u8..8 {
            let sources: Vec<Arc<dyn NewsSource>> = (0..3)
                .map(|i| {
                    let name = format!("source {}", i);
                    let source: Arc<dyn NewsSource> = if mask & (1 << i) != 0 {
                        Arc::new(StubSource::ok(&name, batches[i].clone()))
                    } else {
                        Arc::new(StubSource::failing(&name))
                    };
                    source
                })
                .collect();

            let expected: Vec<Article> = (0..3)
                .filter(|i| mask & (1 << i) != 0)
                .flat_map(|i| batches[i].clone())
                .collect();

            let merged = Aggregator::new(sources).run_fetch_cycle().await.unwrap();
            assert_eq!(merged, expected, "mask {:03b}", mask);
        }
    }

    #[tokio::test]
    async fn test_cycle_dedups_across_sources() {
        let newer = article(
            "Bitcoin Surges Past $50000 As Market Rallies On ETF News Today",
            "2024-01-02T00:00:00Z".parse().unwrap(),
        );
        let older = article(
            "Bitcoin surges past $50000 as market rallies on ETF inflows",
            "2024-01-01T00:00:00Z".parse().unwrap(),
        );

        let aggregator = Aggregator::new(vec![
            Arc::new(StubSource::ok("a", vec![newer.clone()])),
            Arc::new(StubSource::ok("b", vec![older])),
        ]);

        assert_eq!(aggregator.run_fetch_cycle().await.unwrap(), vec![newer]);
    }

    #[tokio::test]
    async fn test_panicking_source_aborts_cycle() {
        let aggregator = Aggregator::new(vec![
            Arc::new(StubSource::ok("a", vec![article("x", Utc::now())])),
            Arc::new(StubSource::panicking("b")),
        ]);

        let err = aggregator.run_fetch_cycle().await.unwrap_err();
        assert!(matches!(err, Error::Cycle(_)));
    }

    #[tokio::test]
    async fn test_dead_cycle_task_still_reports_failure() {
        let outcome = settle(async {
            if true {
                panic!("merge blew up");
            }
            Ok(Vec::new())
        })
        .await;
        assert!(matches!(outcome, Err(Error::Cycle(_))));
    }

    #[tokio::test]
    async fn test_detached_cycle_returns_merged_list() {
        let aggregator = Aggregator::new(vec![Arc::new(StubSource::ok(
            "a",
            vec![article("x", "2024-01-01T00:00:00Z".parse().unwrap())],
        ))]);
        let merged = aggregator.run_detached().await.unwrap();
        assert_eq!(merged.len(), 1);
    }

    #[tokio::test]
    async fn test_no_sources_yields_empty_list() {
        let merged = Aggregator::new(Vec::new()).run_fetch_cycle().await.unwrap();
        assert!(merged.is_empty());
    }
}

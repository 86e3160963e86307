use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;

use crate::app::{Result, TributaryError};
use crate::domain::ParsedFeed;
use crate::fetcher::Fetcher;
use crate::normalizer::Normalizer;

pub const DEFAULT_WORKERS: usize = 10;

/// Fetches and parses many feeds at once.
///
/// Every link gets its own task; a semaphore bounds how many run at the same
/// time. [`fetch_all`](Self::fetch_all) returns only after every task has
/// settled, successfully or not.
pub struct ParallelFetcher {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    semaphore: Arc<Semaphore>,
}

impl ParallelFetcher {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>) -> Self {
        Self::with_workers(fetcher, DEFAULT_WORKERS)
    }

    pub fn with_workers(fetcher: Arc<dyn Fetcher + Send + Sync>, workers: usize) -> Self {
        Self {
            fetcher,
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    /// One `(link, outcome)` per input link, in input order.
    pub async fn fetch_all(
        &self,
        links: Vec<String>,
        normalizer: &Normalizer,
    ) -> Vec<(String, Result<ParsedFeed>)> {
        let handles: Vec<_> = links
            .iter()
            .cloned()
            .map(|link| {
                let fetcher = self.fetcher.clone();
                let semaphore = self.semaphore.clone();
                let normalizer = normalizer.clone();

                tokio::spawn(async move {
                    let _permit = semaphore
                        .acquire()
                        .await
                        .map_err(|e| TributaryError::Other(format!("worker pool closed: {e}")))?;
                    fetch_single_feed(fetcher.as_ref(), &link, &normalizer).await
                })
            })
            .collect();

        links
            .into_iter()
            .zip(join_all(handles).await)
            .map(|(link, joined)| {
                let result = joined.unwrap_or_else(|e| {
                    tracing::error!("Task join error for {}: {}", link, e);
                    Err(TributaryError::Other(format!("fetch task failed: {e}")))
                });
                (link, result)
            })
            .collect()
    }
}

async fn fetch_single_feed(
    fetcher: &(dyn Fetcher + Send + Sync),
    link: &str,
    normalizer: &Normalizer,
) -> Result<ParsedFeed> {
    let body = fetcher.fetch(link).await?;
    normalizer.parse(&body, link)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::mock::{rss, MockFetcher};

    #[tokio::test]
    async fn test_fetch_all_keeps_input_order() {
        let mock = Arc::new(MockFetcher::new());
        mock.respond("https://a.example/rss", rss("A", &[("a1", "First")]));
        mock.respond("https://b.example/rss", rss("B", &[("b1", "Second")]));

        let parallel = ParallelFetcher::with_workers(mock.clone(), 2);
        let results = parallel
            .fetch_all(
                vec!["https://a.example/rss".into(), "https://b.example/rss".into()],
                &Normalizer::new(),
            )
            .await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "https://a.example/rss");
        assert_eq!(results[0].1.as_ref().unwrap().title, "A");
        assert_eq!(results[1].1.as_ref().unwrap().title, "B");
    }

    #[tokio::test]
    async fn test_one_failure_does_not_affect_others() {
        let mock = Arc::new(MockFetcher::new());
        mock.respond("https://ok.example/rss", rss("OK", &[("1", "One")]));
        mock.fail("https://down.example/rss", "connection refused");
        mock.respond("https://junk.example/rss", "<<not xml>>");

        let parallel = ParallelFetcher::new(mock.clone());
        let results = parallel
            .fetch_all(
                vec![
                    "https://down.example/rss".into(),
                    "https://ok.example/rss".into(),
                    "https://junk.example/rss".into(),
                ],
                &Normalizer::new(),
            )
            .await;

        assert!(results[0].1.as_ref().unwrap_err().is_network());
        assert_eq!(results[1].1.as_ref().unwrap().items.len(), 1);
        assert!(matches!(results[2].1, Err(TributaryError::FeedParse(_))));
        assert_eq!(mock.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_all_empty() {
        let parallel = ParallelFetcher::new(Arc::new(MockFetcher::new()));
        assert!(parallel.fetch_all(Vec::new(), &Normalizer::new()).await.is_empty());
    }
}

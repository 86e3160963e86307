use std::sync::Arc;

use crate::app::error::Result;
use crate::config::Config;
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::parallel::ParallelFetcher;
use crate::fetcher::proxy::ProxyFetcher;
use crate::fetcher::Fetcher;
use crate::normalizer::Normalizer;
use crate::scheduler::{Scheduler, SchedulerConfig};
use crate::store::StateHandle;
use crate::workflow::Submission;

/// Wires the state store, fetcher and parser together for one run.
pub struct AppContext {
    pub config: Config,
    pub state: StateHandle,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    pub parallel_fetcher: Arc<ParallelFetcher>,
    pub normalizer: Normalizer,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher + Send + Sync> = if config.proxy.enabled {
            Arc::new(ProxyFetcher::new(&config.proxy, &config.fetch)?)
        } else {
            Arc::new(HttpFetcher::new(&config.fetch)?)
        };
        Ok(Self::with_fetcher(config, fetcher))
    }

    pub fn with_fetcher(config: Config, fetcher: Arc<dyn Fetcher + Send + Sync>) -> Self {
        let parallel_fetcher = Arc::new(ParallelFetcher::with_workers(
            fetcher.clone(),
            config.fetch.workers,
        ));

        Self {
            config,
            state: StateHandle::default(),
            fetcher,
            parallel_fetcher,
            normalizer: Normalizer::new(),
        }
    }

    pub fn submission(&self) -> Submission {
        Submission::new(
            self.state.clone(),
            self.fetcher.clone(),
            self.normalizer.clone(),
        )
    }

    pub fn scheduler(&self) -> Scheduler {
        let config = SchedulerConfig {
            interval: self.config.polling.interval(),
            poll_on_start: true,
        };
        Scheduler::new(
            self.state.clone(),
            self.parallel_fetcher.clone(),
            self.normalizer.clone(),
            config,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::mock::{rss, MockFetcher};
    use crate::workflow::SubmitOutcome;

    #[test]
    fn test_builds_from_default_config() {
        let ctx = AppContext::new(Config::default());
        assert!(ctx.is_ok());
    }

    #[tokio::test]
    async fn test_submission_and_scheduler_share_state() {
        let mock = Arc::new(MockFetcher::new());
        let url = "https://example.com/rss";
        mock.respond(url, rss("Example", &[("1", "One")]));
        let ctx = AppContext::with_fetcher(Config::default(), mock.clone());

        let outcome = ctx.submission().submit(url).await;
        assert!(matches!(outcome, SubmitOutcome::Added { .. }));

        mock.respond(url, rss("Example", &[("2", "Two"), ("1", "One")]));
        let report = ctx.scheduler().run_cycle().await;

        assert_eq!(report.new_posts, 1);
        assert_eq!(ctx.state.read(|s| s.posts.len()), 2);
    }
}

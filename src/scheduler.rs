//! Periodic re-polling of every subscribed feed.
//!
//! Each cycle snapshots the feed list, fetches all feeds concurrently, waits
//! for every fetch to settle, then merges unseen posts in a single write.
//! Failed feeds are skipped until the next cycle; the interval itself is the
//! retry policy. The next cycle is scheduled from the end of the previous
//! one, so slow cycles never overlap.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Notify;

use crate::config::DEFAULT_POLL_INTERVAL_MS;
use crate::fetcher::parallel::ParallelFetcher;
use crate::normalizer::Normalizer;
use crate::store::{merge, StateHandle};

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(DEFAULT_POLL_INTERVAL_MS);

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub interval: Duration,
    /// Run the first cycle immediately instead of after one interval
    pub poll_on_start: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            poll_on_start: true,
        }
    }
}

/// What one cycle did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub polled: usize,
    pub failed: usize,
    pub new_posts: usize,
}

pub struct Scheduler {
    state: StateHandle,
    parallel_fetcher: Arc<ParallelFetcher>,
    normalizer: Normalizer,
    config: SchedulerConfig,
    running: Arc<AtomicBool>,
    wake: Arc<Notify>,
}

impl Scheduler {
    pub fn new(
        state: StateHandle,
        parallel_fetcher: Arc<ParallelFetcher>,
        normalizer: Normalizer,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            state,
            parallel_fetcher,
            normalizer,
            config,
            running: Arc::new(AtomicBool::new(true)),
            wake: Arc::new(Notify::new()),
        }
    }

    /// Poll until [`stop`](Self::stop) is called.
    ///
    /// A cycle already in flight when `stop` arrives is allowed to finish.
    pub async fn run(&self) {
        tracing::info!(
            interval = %format_interval(self.config.interval),
            "Polling scheduler started"
        );

        if !self.config.poll_on_start {
            self.pause().await;
        }

        while self.running.load(Ordering::SeqCst) {
            let report = self.run_cycle().await;
            tracing::debug!(
                polled = report.polled,
                failed = report.failed,
                new_posts = report.new_posts,
                "Polling cycle finished"
            );
            self.pause().await;
        }

        tracing::info!("Polling scheduler stopped");
    }

    async fn pause(&self) {
        if !self.running.load(Ordering::SeqCst) {
            return;
        }
        tokio::select! {
            _ = tokio::time::sleep(self.config.interval) => {},
            _ = self.wake.notified() => {},
        }
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.wake.notify_one();
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// One fetch-all-then-merge pass. Never fails; per-feed errors are
    /// logged and counted.
    pub async fn run_cycle(&self) -> CycleReport {
        let start = Instant::now();
        let links: Vec<String> = self
            .state
            .read(|state| state.feeds.iter().map(|f| f.link.clone()).collect());

        if links.is_empty() {
            return CycleReport::default();
        }

        let results = self
            .parallel_fetcher
            .fetch_all(links, &self.normalizer)
            .await;

        let mut report = CycleReport {
            polled: results.len(),
            ..CycleReport::default()
        };
        let mut fetched = Vec::new();
        for (link, result) in results {
            match result {
                Ok(parsed) => fetched.push((link, parsed.items)),
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(feed = %link, error = %e, "Feed poll failed; retrying next cycle");
                }
            }
        }

        report.new_posts = self.state.update(|store| {
            let mut new_posts = Vec::new();
            let mut markers = Vec::new();

            for (link, items) in fetched {
                if let Some(first) = items.first() {
                    markers.push((link.clone(), first.dedup_key().to_string()));
                }
                let unseen = merge::unseen(&link, items, &store.state().posts);
                if !unseen.is_empty() {
                    tracing::info!("{} new posts from {}", unseen.len(), link);
                }
                new_posts.extend(unseen);
            }

            let added = store.prepend_posts(new_posts).len();
            store.advance_markers(&markers);
            added
        });

        tracing::debug!(elapsed_ms = start.elapsed().as_millis() as u64, "Cycle merged");
        report
    }
}

/// Parse interval strings like "500ms", "5s", "30m", "1h", "1d", or raw seconds.
///
/// Zero and intervals too large to represent are rejected.
pub fn parse_interval(s: &str) -> Result<Duration, String> {
    let s = s.trim().to_lowercase();

    let parse = |digits: &str, unit: &str, scale: u64| {
        digits
            .parse::<u64>()
            .map_err(|_| format!("Invalid {}: {}", unit, digits))?
            .checked_mul(scale)
            .ok_or_else(|| format!("Interval too large: {}", s))
    };

    let interval = if let Some(ms) = s.strip_suffix("ms") {
        parse(ms, "milliseconds", 1).map(Duration::from_millis)
    } else if let Some(hours) = s.strip_suffix('h') {
        parse(hours, "hours", 3600).map(Duration::from_secs)
    } else if let Some(minutes) = s.strip_suffix('m') {
        parse(minutes, "minutes", 60).map(Duration::from_secs)
    } else if let Some(days) = s.strip_suffix('d') {
        parse(days, "days", 86400).map(Duration::from_secs)
    } else if let Some(secs) = s.strip_suffix('s') {
        parse(secs, "seconds", 1).map(Duration::from_secs)
    } else {
        s.parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| format!("Invalid interval: {}. Use format like '5s', '500ms', '1m'", s))
    }?;

    if interval.is_zero() {
        return Err("Interval must be greater than zero".to_string());
    }
    Ok(interval)
}

/// Format an interval for display.
pub fn format_interval(interval: Duration) -> String {
    let millis = interval.as_millis() as u64;
    if millis % 1000 != 0 {
        return format!("{}ms", millis);
    }

    let secs = millis / 1000;
    if secs >= 86400 && secs % 86400 == 0 {
        format!("{}d", secs / 86400)
    } else if secs >= 3600 && secs % 3600 == 0 {
        format!("{}h", secs / 3600)
    } else if secs >= 60 && secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}

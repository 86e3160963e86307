//! # Tributary
//!
//! An always-current RSS aggregator engine.
//!
//! ## Architecture
//!
//! ```text
//!             ┌──────────── Validator
//! Submission ─┤
//!             └──┐
//!                ├─▶ Fetcher → Normalizer → StateStore → Observers
//! Scheduler ─────┘
//! ```
//!
//! - [`workflow`]: validate, fetch, parse and merge one submitted URL
//! - [`scheduler`]: re-poll every feed on a fixed interval
//! - [`store`]: reactive state; every write is pushed to observers
//!
//! ## Quick Start
//!
//! ```bash
//! # Subscribe and keep polling
//! tributary watch https://blog.rust-lang.org/feed.xml
//!
//! # Fetch one feed without subscribing
//! tributary check https://blog.rust-lang.org/feed.xml
//!
//! # Bypass the proxy
//! tributary --direct watch https://blog.rust-lang.org/feed.xml
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the state
/// handle, fetcher and normalizer.
pub mod app;

/// Command-line interface using clap.
///
/// - `watch [urls..]` - Subscribe and poll, reading more input from stdin
/// - `check <url>` - Fetch and parse one feed
/// - `config` - Show the configuration in effect
pub mod cli;

/// Configuration loaded from `~/.config/tributary/config.toml`.
pub mod config;

/// Console rendering of state changes.
pub mod console;

/// Core domain models.
///
/// - [`Feed`](domain::Feed): a subscribed feed, keyed by link
/// - [`Post`](domain::Post): one item with a store-assigned id
/// - [`AppState`](domain::AppState): the root aggregate
pub mod domain;

/// Feed fetching.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for feed fetching
/// - [`ProxyFetcher`](fetcher::proxy::ProxyFetcher): through a read-through proxy
/// - [`HttpFetcher`](fetcher::http_fetcher::HttpFetcher): straight from the origin
/// - [`ParallelFetcher`](fetcher::parallel::ParallelFetcher): Concurrent fetching with semaphore
pub mod fetcher;

/// Feed parsing.
///
/// Converts RSS (and anything else `feed-rs` understands) into
/// [`ParsedFeed`](domain::ParsedFeed).
pub mod normalizer;

/// Fixed-interval polling of all subscribed feeds.
pub mod scheduler;

/// Reactive application state.
///
/// - [`StateStore`](store::StateStore): owns the state, notifies observers
/// - [`StateHandle`](store::StateHandle): shared access across tasks
/// - [`StateChange`](store::StateChange): what changed, with the new value
pub mod store;

/// URL validation for submissions.
pub mod validator;

/// Submission of a single feed URL.
pub mod workflow;

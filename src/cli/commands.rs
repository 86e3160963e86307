use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::app::{AppContext, Result, TributaryError};
use crate::cli::Cli;
use crate::config::Config;
use crate::console::{self, ConsoleView};
use crate::scheduler::{format_interval, parse_interval};
use crate::validator::validate;
use crate::workflow::SubmitOutcome;

/// One line typed while watching.
#[derive(Debug, PartialEq, Eq)]
pub enum Input<'a> {
    Submit(&'a str),
    Read(&'a str),
    Quit,
    Empty,
}

pub fn parse_input(line: &str) -> Input<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    if line == "quit" || line == "exit" {
        return Input::Quit;
    }
    match line.strip_prefix("read ") {
        Some(id) => Input::Read(id.trim()),
        None => Input::Submit(line),
    }
}

/// Resolve the configuration file and apply command-line overrides.
pub fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_path(path)?,
        None => Config::load()?,
    };

    if let Some(workers) = cli.workers {
        config.fetch.workers = workers;
    }
    if cli.direct {
        config.proxy.enabled = false;
    }
    Ok(config)
}

pub async fn watch(
    mut ctx: AppContext,
    urls: &[String],
    interval: Option<&str>,
    json: bool,
) -> Result<()> {
    if let Some(interval) = interval {
        let interval = parse_interval(interval).map_err(TributaryError::Other)?;
        ctx.config.polling.interval_ms = interval.as_millis() as u64;
    }

    ctx.state.subscribe(Box::new(ConsoleView::new(std::io::stdout())));

    let submission = ctx.submission();
    for url in urls {
        report_outcome(url, &submission.submit(url).await);
    }

    let scheduler = Arc::new(ctx.scheduler());
    let runner = scheduler.clone();
    let polling = tokio::spawn(async move { runner.run().await });

    println!(
        "Polling every {}. Type a feed URL to add it, `read <id>` to mark a post, `quit` to exit.",
        format_interval(ctx.config.polling.interval())
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };

        match parse_input(&line) {
            Input::Empty => {}
            Input::Quit => break,
            Input::Read(id) => {
                if !ctx.state.update(|store| store.mark_as_read_str(id)) {
                    println!("No unread post with id {}", id);
                }
            }
            Input::Submit(url) => {
                report_outcome(url, &submission.submit(url).await);
            }
        }
    }

    scheduler.stop();
    if let Err(e) = polling.await {
        tracing::error!("Polling task failed: {}", e);
    }

    if json {
        let snapshot = ctx.state.snapshot();
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        let (feeds, posts, unread) =
            ctx.state.read(|s| (s.feeds.len(), s.posts.len(), s.unread_count()));
        println!("{} feeds, {} posts ({} unread)", feeds, posts, unread);
    }
    Ok(())
}

fn report_outcome(url: &str, outcome: &SubmitOutcome) {
    match outcome {
        SubmitOutcome::Added { new_posts, .. } => {
            tracing::debug!(url, new_posts, "Submission finished");
        }
        SubmitOutcome::Rejected(error) => {
            tracing::debug!(url, key = %error.message_key(), "Submission rejected");
        }
        SubmitOutcome::Failed(error) => {
            tracing::debug!(url, key = %error.message_key(), "Submission failed");
        }
    }
}

pub async fn check(ctx: &AppContext, url: &str, json: bool) -> Result<()> {
    if let Some(error) = validate(url, &[]) {
        return Err(TributaryError::Other(
            console::message(error.message_key()).to_string(),
        ));
    }

    let body = ctx.fetcher.fetch(url).await?;
    let feed = ctx.normalizer.parse(&body, url)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&feed)?);
        return Ok(());
    }

    println!("{}", feed.title);
    if !feed.description.is_empty() {
        println!("  {}", feed.description);
    }
    println!("{} items", feed.items.len());
    for item in &feed.items {
        let date = item
            .published_at
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "          ".to_string());
        println!("  {} {}  <{}>", date, item.title, item.link);
    }
    Ok(())
}

pub fn show_config(config: &Config) -> Result<()> {
    match Config::default_config_path() {
        Ok(path) => println!("# {}", path.display()),
        Err(e) => println!("# {}", e),
    }
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| TributaryError::Other(format!("failed to render config: {e}")))?;
    print!("{}", rendered);
    Ok(())
}

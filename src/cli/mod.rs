pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tributary")]
#[command(about = "An always-current RSS aggregator", long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of parallel workers for polling feeds
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,

    /// Fetch feeds directly instead of through the proxy
    #[arg(long, global = true)]
    pub direct: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Subscribe to feeds and keep polling them.
    ///
    /// While running, each line on stdin is either a feed URL to add or
    /// `read <id>` to mark a post as read.
    Watch {
        /// Feed URLs to subscribe to on start
        urls: Vec<String>,

        /// Polling interval (e.g., "5s", "500ms", "1m")
        #[arg(short, long)]
        interval: Option<String>,

        /// Print the final state as JSON on exit
        #[arg(long)]
        json: bool,
    },
    /// Fetch and parse a single feed once
    Check {
        /// URL of the feed
        url: String,

        /// Print the parsed feed as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the configuration in effect
    Config,
}

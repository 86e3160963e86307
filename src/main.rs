use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tributary::app::AppContext;
use tributary::cli::{commands, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = commands::load_config(&cli)?;

    match cli.command {
        Commands::Watch {
            urls,
            interval,
            json,
        } => {
            let ctx = AppContext::new(config)?;
            commands::watch(ctx, &urls, interval.as_deref(), json).await?;
        }
        Commands::Check { url, json } => {
            let ctx = AppContext::new(config)?;
            commands::check(&ctx, &url, json).await?;
        }
        Commands::Config => {
            commands::show_config(&config)?;
        }
    }

    Ok(())
}

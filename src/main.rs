use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kopite::app::AppContext;
use kopite::cli::commands::{self, ListingArgs};
use kopite::cli::{Cli, Commands};
use kopite::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so listings stay pipeable
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if cli.mobile {
        config.client.mobile = true;
    }

    if let Commands::Config = cli.command {
        commands::show_config(&config)?;
        return Ok(());
    }

    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Listing {
            community,
            sort,
            time,
            media,
            tags,
            legacy,
        } => {
            let args = ListingArgs {
                community,
                sort,
                time,
                media,
                tags,
                legacy,
            };
            commands::show_listing(&ctx, args, cli.json).await?;
        }
        Commands::Search { query, community } => {
            commands::search(&ctx, &query, community.as_deref(), cli.json).await?;
        }
        Commands::Post { id, community } => {
            commands::show_post(&ctx, &id, community.as_deref(), cli.json).await?;
        }
        Commands::Comments { id, community } => {
            commands::show_comments(&ctx, &id, community.as_deref(), cli.json).await?;
        }
        Commands::Config => {}
    }

    Ok(())
}

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use feedkeeper::app::AppContext;
use feedkeeper::cli::{commands, Cli, Commands, SourceAction};
use feedkeeper::config::Config;
use feedkeeper::store::ArticleFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (warnings and errors unless RUST_LOG says otherwise)
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_config_path()?,
    };
    let mut config = Config::load_from(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    let fetch = config.fetch_settings(cli.workers);

    let sources = config.source_set()?;
    let ctx = AppContext::new(sources.storage_location(), &fetch)
        .with_context(|| format!("opening {}", sources.storage_location().display()))?;

    match cli.command {
        Commands::Refresh { json } => {
            commands::refresh(&ctx, &sources, json).await?;
        }
        Commands::List {
            unread,
            source,
            limit,
            json,
        } => {
            let filter = ArticleFilter {
                source,
                unread_only: unread,
                limit,
            };
            commands::list_articles(&ctx, &filter, json)?;
        }
        Commands::Unread => {
            commands::unread(&ctx)?;
        }
        Commands::Open { url } => {
            commands::open_article(&ctx, &url)?;
        }
        Commands::Read { url } => {
            commands::mark_read(&ctx, &url)?;
        }
        Commands::Sources { action } => match action {
            SourceAction::List => commands::list_sources(&sources),
            SourceAction::Add { name, url } => {
                commands::add_source(&ctx, &mut config, &config_path, &name, &url)?;
            }
            SourceAction::Remove { name } => {
                commands::remove_source(&ctx, &mut config, &config_path, &name)?;
            }
        },
        Commands::Watch {
            interval,
            no_initial,
        } => {
            commands::watch(&ctx, &sources, &interval, no_initial).await?;
        }
    }

    Ok(())
}

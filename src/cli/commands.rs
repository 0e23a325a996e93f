use std::path::Path;

use crate::app::{AppContext, FeedkeeperError, Result};
use crate::config::Config;
use crate::domain::{Article, SourceSet};
use crate::ingest::{CancelToken, RefreshReport};
use crate::store::{ArticleFilter, ArticleStore};
use crate::watch::WatchConfig;

pub async fn refresh(ctx: &AppContext, sources: &SourceSet, json: bool) -> Result<()> {
    if sources.is_empty() {
        println!("No sources configured");
        return Ok(());
    }

    let cancel = CancelToken::new();
    cancel_on_signal(cancel.clone());

    if !json {
        println!("Refreshing {} sources...", sources.len());
    }
    let report = ctx.engine.refresh_with_cancel(sources, &cancel).await;

    if json {
        println!("{}", to_json(&report.summaries())?);
        return Ok(());
    }
    print_report(&report);

    let unread = ctx.query.count_unread()?;
    println!("{} unread articles", unread);
    Ok(())
}

pub fn print_report(report: &RefreshReport) {
    for (name, outcome) in report.iter() {
        match outcome {
            Ok(result) if result.inserted > 0 => {
                println!("  {} new articles from {}", result.inserted, name)
            }
            Ok(_) => {}
            Err(e) => eprintln!("  Error updating {}: {}", name, e),
        }
    }

    println!(
        "Refresh complete: {} new articles, {} errors",
        report.total_inserted(),
        report.failures().count()
    );
    if report.was_cancelled() {
        println!("Refresh was cancelled before all sources finished");
    }
}

pub fn list_articles(ctx: &AppContext, filter: &ArticleFilter, json: bool) -> Result<()> {
    let articles = ctx.query.list_filtered(filter)?;

    if json {
        println!("{}", to_json(&articles)?);
        return Ok(());
    }

    if articles.is_empty() {
        println!("No articles");
        return Ok(());
    }

    for article in &articles {
        println!("{}", format_row(article));
    }

    Ok(())
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| FeedkeeperError::Other(e.to_string()))
}

fn format_row(article: &Article) -> String {
    let read_marker = if article.read { " " } else { "●" };
    let date = article
        .published_at
        .with_timezone(&chrono::Local)
        .format("%Y-%m-%d %H:%M");

    format!(
        "{} {} [{}] {}\n    {}",
        read_marker, date, article.source_title, article.title, article.url
    )
}

pub fn unread(ctx: &AppContext) -> Result<()> {
    println!("{}", ctx.query.count_unread()?);
    Ok(())
}

/// Open an article with the system handler, then mark it read.
pub fn open_article(ctx: &AppContext, url: &str) -> Result<()> {
    let article = ctx
        .query
        .get(url)?
        .ok_or_else(|| FeedkeeperError::ArticleNotFound(url.to_string()))?;

    open::that(&article.url)?;
    ctx.store.mark_read(&article.url)?;
    println!("Opened: {}", article.title);
    Ok(())
}

pub fn mark_read(ctx: &AppContext, url: &str) -> Result<()> {
    ctx.store.mark_read(url)?;
    println!("Marked read: {}", url);
    Ok(())
}

pub fn list_sources(sources: &SourceSet) {
    if sources.is_empty() {
        println!("No sources");
        return;
    }

    for source in sources.iter() {
        println!("{}\n  {}", source.name, source.url);
    }
}

/// Add a source. Confirming the change also reconciles the store, which
/// drops articles left over from sources edited out of the file by hand.
pub fn add_source(
    ctx: &AppContext,
    config: &mut Config,
    config_path: &Path,
    name: &str,
    url: &str,
) -> Result<()> {
    let mut sources = config.source_set()?;
    sources.insert(name, url)?;

    let removed = ctx.reconciler.reconcile(&sources)?;
    config.apply(sources);
    config.save_to(config_path)?;

    println!("Added source: {} ({})", name, url);
    if removed > 0 {
        println!("Deleted {} articles from sources no longer configured", removed);
    }
    Ok(())
}

/// Remove a source. Its stored articles are deleted before the new
/// configuration is saved.
pub fn remove_source(
    ctx: &AppContext,
    config: &mut Config,
    config_path: &Path,
    name: &str,
) -> Result<()> {
    let mut sources = config.source_set()?;
    if sources.remove(name).is_none() {
        return Err(FeedkeeperError::InvalidSource(format!(
            "no source named {}",
            name
        )));
    }

    let removed = ctx.reconciler.reconcile(&sources)?;
    config.apply(sources);
    config.save_to(config_path)?;

    println!("Removed source: {} ({} articles deleted)", name, removed);
    Ok(())
}

pub async fn watch(ctx: &AppContext, sources: &SourceSet, interval: &str, no_initial: bool) -> Result<()> {
    let interval_secs = WatchConfig::parse_interval(interval).map_err(FeedkeeperError::Other)?;
    let config = WatchConfig {
        interval_secs,
        refresh_on_start: !no_initial,
    };

    let shutdown = CancelToken::new();
    cancel_on_signal(shutdown.clone());

    println!(
        "Watching {} sources every {} (Ctrl-C to stop)",
        sources.len(),
        WatchConfig::format_interval(interval_secs)
    );
    crate::watch::run(ctx, sources, &config, &shutdown, print_report).await;
    Ok(())
}

/// Cancel `token` on Ctrl-C, or SIGTERM on unix.
fn cancel_on_signal(token: CancelToken) {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = sigterm.recv() => {},
                        _ = tokio::signal::ctrl_c() => {},
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to set up SIGTERM handler: {}", e);
                    let _ = tokio::signal::ctrl_c().await;
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
        }

        tracing::info!("Shutdown requested");
        token.cancel();
    });
}

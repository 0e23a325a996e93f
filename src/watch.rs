//! Periodic refresh loop.
//!
//! Runs a refresh every interval until the shutdown token fires. A shutdown
//! that arrives mid-refresh cancels the fetches still in flight.

use std::time::{Duration, Instant};

use tokio::time::{interval, MissedTickBehavior};

use crate::app::AppContext;
use crate::domain::SourceSet;
use crate::ingest::{cancel, CancelToken, RefreshReport};

/// Watch loop configuration
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Refresh interval in seconds (default: 1800 = 30 minutes)
    pub interval_secs: u64,
    /// Whether to refresh immediately on start
    pub refresh_on_start: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval_secs: 1800,
            refresh_on_start: true,
        }
    }
}

impl WatchConfig {
    /// Parse interval string like "1h", "30m", "6h", "1d"
    pub fn parse_interval(s: &str) -> Result<u64, String> {
        let s = s.trim().to_lowercase();

        let secs = if let Some(hours) = s.strip_suffix('h') {
            hours
                .parse::<u64>()
                .ok()
                .and_then(|h| h.checked_mul(3600))
                .ok_or_else(|| format!("Invalid hours: {}", hours))?
        } else if let Some(minutes) = s.strip_suffix('m') {
            minutes
                .parse::<u64>()
                .ok()
                .and_then(|m| m.checked_mul(60))
                .ok_or_else(|| format!("Invalid minutes: {}", minutes))?
        } else if let Some(days) = s.strip_suffix('d') {
            days.parse::<u64>()
                .ok()
                .and_then(|d| d.checked_mul(86400))
                .ok_or_else(|| format!("Invalid days: {}", days))?
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.parse::<u64>()
                .map_err(|_| format!("Invalid seconds: {}", secs))?
        } else {
            s.parse::<u64>().map_err(|_| {
                format!("Invalid interval: {}. Use format like '30m', '1h', '1d'", s)
            })?
        };

        if secs == 0 {
            return Err("Interval must be greater than zero".to_string());
        }
        Ok(secs)
    }

    /// Format interval for display
    pub fn format_interval(secs: u64) -> String {
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
}

/// Refresh `sources` on a timer until `shutdown` is cancelled, handing each
/// report to `on_report`. Returns the number of refreshes run.
pub async fn run<F>(
    ctx: &AppContext,
    sources: &SourceSet,
    config: &WatchConfig,
    shutdown: &CancelToken,
    mut on_report: F,
) -> usize
where
    F: FnMut(&RefreshReport),
{
    let mut stop = shutdown.subscribe();
    let mut timer = interval(Duration::from_secs(config.interval_secs));
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    if !config.refresh_on_start {
        timer.tick().await; // Skip the first immediate tick
    }

    tracing::info!(
        "Watching {} sources (refresh interval: {})",
        sources.len(),
        WatchConfig::format_interval(config.interval_secs)
    );

    let mut runs = 0;
    loop {
        tokio::select! {
            biased;
            _ = cancel::cancelled(&mut stop) => break,
            _ = timer.tick() => {}
        }

        let start = Instant::now();
        let report = ctx.engine.refresh_with_cancel(sources, shutdown).await;
        runs += 1;

        tracing::info!(
            "Refresh complete: {} new articles, {} failed sources ({:.1}s)",
            report.total_inserted(),
            report.failures().count(),
            start.elapsed().as_secs_f64()
        );
        on_report(&report);

        if shutdown.is_cancelled() {
            break;
        }
    }

    tracing::info!("Watch loop stopped after {} refreshes", runs);
    runs
}

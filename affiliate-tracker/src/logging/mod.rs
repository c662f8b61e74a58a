//! Logging setup: console output, optional daily-rolling file and JSON format.
//!
//! This module provides:
//! - An `EnvFilter` honouring `RUST_LOG`, with a crate default
//! - Local timezone timestamps for logs
//! - Log file retention cleanup (deletes logs older than 7 days)

use chrono::{Local, Utc};
use std::path::Path;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, format::Writer, time::FormatTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::config::LogSettings;

/// Default log filter directive.
pub const DEFAULT_LOG_FILTER: &str = "affiliate_tracker=info,sqlx=warn,tower_http=info";

/// File name prefix for the rolling log; the appender appends `.YYYY-MM-DD`.
pub const LOG_FILE_PREFIX: &str = "affiliate-tracker.log";

/// Log retention period in days.
const LOG_RETENTION_DAYS: i64 = 7;

/// Custom timer that uses the local timezone via chrono.
#[derive(Debug, Clone, Copy)]
struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = Local::now();
        write!(w, "{}", now.format("%Y-%m-%dT%H:%M:%S%.3f%:z"))
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn console_layer(json: bool) -> BoxedLayer {
    if json {
        fmt::layer().json().with_timer(LocalTimer).boxed()
    } else {
        fmt::layer().with_ansi(true).with_timer(LocalTimer).boxed()
    }
}

fn file_layer(writer: tracing_appender::non_blocking::NonBlocking, json: bool) -> BoxedLayer {
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_timer(LocalTimer);
    if json { layer.json().boxed() } else { layer.boxed() }
}

/// Initialize the global subscriber.
///
/// Returns the file writer's guard when file logging is enabled; keep it
/// alive for the lifetime of the process or buffered lines are lost.
pub fn init_logging(settings: &LogSettings) -> crate::Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let mut layers = vec![console_layer(settings.json)];
    let mut guard = None;

    if let Some(dir) = &settings.dir {
        std::fs::create_dir_all(dir)?;

        let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
        let (non_blocking, worker_guard) = tracing_appender::non_blocking(file_appender);
        layers.push(file_layer(non_blocking, settings.json));
        guard = Some(worker_guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| {
            crate::Error::Other(format!("Failed to set global default subscriber: {}", e))
        })?;

    Ok(guard)
}

/// Start the log retention cleanup task.
///
/// Runs daily and deletes log files older than 7 days.
pub fn start_retention_cleanup(log_dir: &Path, cancel_token: CancellationToken) {
    let log_dir = log_dir.to_path_buf();

    tokio::spawn(async move {
        let cleanup_interval = Duration::from_secs(24 * 60 * 60);

        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => {
                    debug!("Log retention cleanup task shutting down");
                    break;
                }
                _ = tokio::time::sleep(cleanup_interval) => {
                    if let Err(e) = cleanup_old_logs(&log_dir, LOG_RETENTION_DAYS).await {
                        warn!(error = %e, "Failed to cleanup old logs");
                    }
                }
            }
        }
    });
}

/// Date encoded in a rolled log file name, if `name` is one of ours.
fn log_file_date(name: &str) -> Option<chrono::NaiveDate> {
    let date = name.strip_prefix(LOG_FILE_PREFIX)?.strip_prefix('.')?;
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Delete log files older than the specified number of days.
async fn cleanup_old_logs(log_dir: &Path, retention_days: i64) -> std::io::Result<usize> {
    let cutoff = (Utc::now() - chrono::Duration::days(retention_days)).date_naive();

    let mut entries = tokio::fs::read_dir(log_dir).await?;
    let mut deleted_count = 0;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let Some(file_date) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(log_file_date)
        else {
            continue;
        };

        if file_date < cutoff {
            if let Err(e) = tokio::fs::remove_file(&path).await {
                warn!(path = %path.display(), error = %e, "Failed to delete old log file");
            } else {
                deleted_count += 1;
                debug!(path = %path.display(), "Deleted old log file");
            }
        }
    }

    if deleted_count > 0 {
        info!(count = deleted_count, "Cleaned up old log files");
    }

    Ok(deleted_count)
}

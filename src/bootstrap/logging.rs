//! Tracing setup driven by [`crate::config::LoggingConfig`], grounded on the
//! teacher's `logging::init` (stdout layer + optional rolling file appender,
//! retention sweep on startup). The teacher's log-buffer/VictoriaLogs layers
//! back a user-facing dashboard and log-search endpoint, both explicitly out
//! of scope here, so only the stdout and file layers survive the transform.

use crate::config::LoggingConfig;
use std::fs;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initializes the global tracing subscriber. Leaks the non-blocking file
/// appender's guard, same as the teacher: this is a long-running daemon
/// process, so there is no shutdown path that needs the guard dropped.
pub fn init(config: &LoggingConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let subscriber = tracing_subscriber::registry().with(env_filter).with(tracing_subscriber::fmt::layer());

    if !config.enabled {
        subscriber.init();
        return;
    }

    if let Err(err) = fs::create_dir_all(&config.directory) {
        eprintln!("failed to create log directory {}: {}", config.directory, err);
    }
    cleanup_old_logs(config);

    let file_appender = match config.rotation.as_str() {
        "hourly" => tracing_appender::rolling::hourly(&config.directory, &config.file_prefix),
        "never" => tracing_appender::rolling::never(&config.directory, &config.file_prefix),
        _ => tracing_appender::rolling::daily(&config.directory, &config.file_prefix),
    };
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    std::mem::forget(guard);

    subscriber.with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false)).init();
}

/// Deletes log files past `max_files` count or `max_age_days` age (0 = unlimited).
fn cleanup_old_logs(config: &LoggingConfig) {
    if config.max_files == 0 && config.max_age_days == 0 {
        return;
    }
    let dir = std::path::Path::new(&config.directory);
    if !dir.exists() {
        return;
    }

    let Ok(entries) = fs::read_dir(dir) else { return };
    let mut files: Vec<_> = entries
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let metadata = entry.metadata().ok()?;
            if !metadata.is_file() {
                return None;
            }
            let name = entry.file_name();
            if !name.to_str()?.starts_with(&config.file_prefix) {
                return None;
            }
            Some((entry.path(), metadata.modified().ok()?))
        })
        .collect();
    files.sort_by(|a, b| b.1.cmp(&a.1));

    let now = std::time::SystemTime::now();
    let max_age = Duration::from_secs(u64::from(config.max_age_days) * 24 * 60 * 60);
    for (idx, (path, modified)) in files.iter().enumerate() {
        let too_many = config.max_files > 0 && idx >= config.max_files as usize;
        let too_old = config.max_age_days > 0 && now.duration_since(*modified).map(|age| age > max_age).unwrap_or(false);
        if (too_many || too_old) && fs::remove_file(path).is_err() {
            eprintln!("failed to delete old log file {path:?}");
        }
    }
}

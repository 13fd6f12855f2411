//! Diagnostic logging.
//!
//! The view owns the terminal, so diagnostics only go to a file. Without
//! `--log-file` or `$TAILBOX_LOG_FILE` no subscriber is installed.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_FILTER_ENV: &str = "TAILBOX_LOG";
pub const LOG_FILE_ENV: &str = "TAILBOX_LOG_FILE";
const DEFAULT_FILTER: &str = "info";

pub fn resolve_log_file(flag: Option<PathBuf>) -> Option<PathBuf> {
    flag.or_else(|| {
        std::env::var_os(LOG_FILE_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    })
}

/// Filter from `$TAILBOX_LOG`, falling back to `info`.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

pub fn build_subscriber(
    log_file: File,
    filter: EnvFilter,
) -> impl tracing::Subscriber + Send + Sync {
    let fmt_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry().with(fmt_layer).with(filter)
}

/// Installs the global subscriber when a log file is configured.
pub fn init(log_file: Option<&Path>) -> anyhow::Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;
    build_subscriber(file, env_filter())
        .try_init()
        .map_err(|err| anyhow!("install log subscriber: {err}"))?;
    tracing::debug!(path = %path.display(), "logging initialized");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::path::PathBuf;

    use tracing_subscriber::EnvFilter;

    use super::{build_subscriber, resolve_log_file};

    #[test]
    fn subscriber_writes_events_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tailbox.log");
        let file = std::fs::File::create(&path).unwrap();

        let subscriber = build_subscriber(file, EnvFilter::new("debug"));
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(lines = 3, "log stream complete");
            tracing::trace!("filtered out");
        });

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("log stream complete"));
        assert!(written.contains("lines=3"));
        assert!(!written.contains("filtered out"));
    }

    #[test]
    fn flag_beats_environment() {
        let flag = Some(PathBuf::from("/tmp/flag.log"));
        assert_eq!(resolve_log_file(flag.clone()), flag);
    }
}

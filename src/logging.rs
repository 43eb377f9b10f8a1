//! Tracing subscriber setup.
//!
//! Stdout carries protocol frames, so all diagnostics go to a log file.
use anyhow::Context;
use std::fs::File;
use std::sync::Arc;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::Config;

/// Install the global subscriber. Failing to create the log file is fatal.
pub fn init(config: &Config) -> anyhow::Result<()> {
    let log_file = File::create(&config.log_file)
        .with_context(|| format!("failed to open log file {}", config.log_file.display()))?;

    build_subscriber(log_file, &config.log_level)?
        .try_init()
        .context("failed to install tracing subscriber")?;
    Ok(())
}

/// `RUST_LOG` wins over the configured level when set.
pub fn build_subscriber(
    log_file: File,
    default_level: &str,
) -> anyhow::Result<impl tracing::Subscriber + Send + Sync> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_level)
            .with_context(|| format!("invalid log level {:?}", default_level))?,
    };

    let fmt_layer = fmt::layer()
        .with_writer(Arc::new(log_file))
        .with_ansi(false);

    Ok(tracing_subscriber::registry().with(fmt_layer).with(env_filter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_events_land_in_log_file() {
        let log_file = NamedTempFile::new().unwrap();
        let subscriber = build_subscriber(log_file.reopen().unwrap(), "debug").unwrap();

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(uri = "file:///x", "dropping malformed frame header");
        });

        let contents = std::fs::read_to_string(log_file.path()).unwrap();
        assert!(contents.contains("dropping malformed frame header"));
        assert!(contents.contains("file:///x"));
    }

    #[test]
    fn test_unwritable_log_path_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            log_file: dir.path().join("missing").join("server.log"),
            log_level: "info".to_string(),
        };
        assert!(init(&config).is_err());
    }
}

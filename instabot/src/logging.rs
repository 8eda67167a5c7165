//! Process logging.
//!
//! Reads `RUST_LOG`; defaults to `instabot=info,warn`. Output goes to stderr
//! in compact format and, with `--logs`, is also appended to a timestamped
//! file in the working directory.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::Local;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "instabot=info,warn";

/// File name for a log file opened now, e.g. `instabot-2024-05-01-13-45-00.log`.
pub fn log_file_name() -> PathBuf {
    PathBuf::from(Local::now().format("instabot-%Y-%m-%d-%H-%M-%S.log").to_string())
}

/// Initialize the tracing subscriber. Returns the log file path when one was
/// opened.
///
/// # Example
/// ```bash
/// RUST_LOG=instabot=debug instabot --fixture account.json run
/// ```
pub fn init(to_file: bool) -> Result<Option<PathBuf>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (file_layer, path) = if to_file {
        let path = log_file_name();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("open log file {}", path.display()))?;
        let layer = fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .compact();
        (Some(layer), Some(path))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(file_layer)
        .init();

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_name_is_timestamped() {
        let name = log_file_name();
        let name = name.to_string_lossy();
        assert!(name.starts_with("instabot-"));
        assert!(name.ends_with(".log"));
        assert_eq!(name.len(), "instabot-2024-05-01-13-45-00.log".len());
    }
}

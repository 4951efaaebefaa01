use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogConfig;

/// Console logging, plus an append-only file when one is configured.
/// `RUST_LOG` overrides the configured filter.
pub fn init(config: &LogConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| config.filter.as_str().into());

    let file_layer = match &config.file {
        Some(path) => {
            let path = expand_home(path, std::env::var("HOME").ok().as_deref());
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create log directory: {}", parent.display())
                })?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init()
        .context("Failed to install log subscriber")?;

    Ok(())
}

fn expand_home(path: &Path, home: Option<&str>) -> PathBuf {
    match (path.strip_prefix("~"), home) {
        (Ok(rest), Some(home)) => Path::new(home).join(rest),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_home() {
        assert_eq!(
            expand_home(Path::new("~/bot.log"), Some("/home/student")),
            PathBuf::from("/home/student/bot.log")
        );
    }

    #[test]
    fn test_plain_path_untouched() {
        assert_eq!(
            expand_home(Path::new("/var/log/bot.log"), Some("/home/student")),
            PathBuf::from("/var/log/bot.log")
        );
        assert_eq!(
            expand_home(Path::new("~/bot.log"), None),
            PathBuf::from("~/bot.log")
        );
    }
}

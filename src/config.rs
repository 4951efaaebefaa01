use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use teloxide::types::{ChatId, Recipient};
use tracing::error;

use crate::error::ConfigError;

pub const PRACTICUM_TOKEN: &str = "PRACTICUM_TOKEN";
pub const TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
pub const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub practicum: PracticumConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PracticumConfig {
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    #[serde(default)]
    pub chat_id: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollConfig {
    #[serde(default = "default_retry_period_secs")]
    pub retry_period_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    /// Optional append-only log file in addition to the console
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_endpoint() -> String {
    "https://practicum.yandex.ru/api/user_api/homework_statuses/".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_retry_period_secs() -> u64 {
    600
}

fn default_log_filter() -> String {
    "info,homework_bot=debug".to_string()
}

impl Default for PracticumConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            endpoint: default_endpoint(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            retry_period_secs: default_retry_period_secs(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: None,
            filter: default_log_filter(),
        }
    }
}

impl Config {
    /// Read settings from a TOML file.
    ///
    /// When `required` is false a missing file yields the built-in defaults,
    /// so the bot can run from environment variables alone.
    pub fn load(path: &Path, required: bool) -> Result<Self> {
        if !required && !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Overlay secrets from the environment. Set variables win over the file.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(PRACTICUM_TOKEN) {
            self.practicum.token = token;
        }
        if let Some(token) = lookup(TELEGRAM_TOKEN) {
            self.telegram.bot_token = token;
        }
        if let Some(chat_id) = lookup(TELEGRAM_CHAT_ID) {
            self.telegram.chat_id = chat_id;
        }
    }

    /// Refuse to start unless every secret is present.
    ///
    /// Each missing name is logged on its own line before failing.
    pub fn check_tokens(&self) -> Result<(), ConfigError> {
        let tokens = [
            (&self.practicum.token, PRACTICUM_TOKEN),
            (&self.telegram.bot_token, TELEGRAM_TOKEN),
            (&self.telegram.chat_id, TELEGRAM_CHAT_ID),
        ];

        let missing: Vec<&'static str> = tokens
            .iter()
            .filter(|(value, _)| value.trim().is_empty())
            .map(|(_, name)| *name)
            .collect();

        for name in &missing {
            error!("Missing required environment variable: \"{}\"", name);
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingConfiguration(missing))
        }
    }

    /// Numeric ids address chats directly; anything else is a `@channel` username.
    pub fn chat_id(&self) -> Recipient {
        let raw = self.telegram.chat_id.trim();
        match raw.parse::<i64>() {
            Ok(id) => Recipient::Id(ChatId(id)),
            Err(_) => Recipient::ChannelUsername(raw.to_string()),
        }
    }

    pub fn retry_period(&self) -> Duration {
        Duration::from_secs(self.poll.retry_period_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.practicum.request_timeout_secs)
    }
}

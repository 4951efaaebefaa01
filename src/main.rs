mod config;
mod error;
mod homework;
mod logging;
mod notifier;
mod poller;
mod practicum;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::notifier::TelegramMessenger;
use crate::poller::Poller;
use crate::practicum::PracticumClient;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // An explicitly named config file must exist; the default one is optional
    let (config_path, required) = match std::env::args().nth(1) {
        Some(path) => (PathBuf::from(path), true),
        None => (PathBuf::from("config.toml"), false),
    };

    let mut config = Config::load(&config_path, required)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    config.apply_env(|name| std::env::var(name).ok());

    logging::init(&config.log)?;

    config.check_tokens()?;
    let chat_id = config.chat_id();

    info!("Configuration loaded successfully");
    info!("  Endpoint: {}", config.practicum.endpoint);
    info!("  Retry period: {}s", config.poll.retry_period_secs);
    info!("  Chat: {:?}", chat_id);
    if let Some(file) = &config.log.file {
        info!("  Log file: {}", file.display());
    }

    let api = PracticumClient::new(
        &config.practicum.endpoint,
        &config.practicum.token,
        config.request_timeout(),
    )
    .context("Failed to build HTTP client")?;
    let messenger = TelegramMessenger::new(&config.telegram.bot_token, chat_id);

    let from_date = chrono::Utc::now().timestamp();
    let poller = Poller::new(api, messenger, config.retry_period(), from_date);

    info!("Bot is starting...");
    poller.run().await;

    Ok(())
}

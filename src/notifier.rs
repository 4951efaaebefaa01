use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::Recipient;
use tracing::{debug, error};

/// Delivers text to the single configured chat.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
}

#[cfg(test)]
#[async_trait]
impl<T: Messenger + ?Sized> Messenger for std::sync::Arc<T> {
    async fn send(&self, text: &str) -> Result<()> {
        (**self).send(text).await
    }
}

/// Telegram delivery through the Bot API
pub struct TelegramMessenger {
    bot: Bot,
    chat_id: Recipient,
}

impl TelegramMessenger {
    pub fn new(bot_token: &str, chat_id: Recipient) -> Self {
        Self {
            bot: Bot::new(bot_token),
            chat_id,
        }
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send(&self, text: &str) -> Result<()> {
        self.bot
            .send_message(self.chat_id.clone(), text)
            .await
            .context("Telegram rejected the message")?;
        Ok(())
    }
}

/// Best-effort delivery: failures are logged, never propagated.
pub async fn send_message<M: Messenger + ?Sized>(messenger: &M, message: &str) -> bool {
    match messenger.send(message).await {
        Ok(()) => {
            debug!("Bot sent message: \"{}\"", message);
            true
        }
        Err(e) => {
            error!("Failed to send Telegram message: {:#}", e);
            false
        }
    }
}

//! Telegram adapter (teloxide).
//!
//! This crate implements the `relaybot-core` MessagingPort over Telegram Bot API.

use async_trait::async_trait;

use teloxide::{prelude::*, types::ParseMode};

use tokio::time::sleep;

pub mod convert;
pub mod handlers;
pub mod router;

use relaybot_core::{
    domain::{ChatId, MessageId, MessageRef, UserId},
    errors::Error,
    messaging::{port::MessagingPort, types::MessagingCapabilities},
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn tg_msg_id(message_id: MessageId) -> teloxide::types::MessageId {
        teloxide::types::MessageId(message_id.0)
    }

    fn tg_user(user_id: UserId) -> Result<teloxide::types::UserId> {
        u64::try_from(user_id.0)
            .map(teloxide::types::UserId)
            .map_err(|_| Error::External(format!("invalid telegram user id: {}", user_id.0)))
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }

    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, teloxide::RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => match e {
                    teloxide::RequestError::RetryAfter(d) if attempts < MAX_RETRIES => {
                        attempts += 1;
                        tracing::debug!(retry_after = ?d, "telegram flood control, retrying");
                        sleep(d).await;
                        continue;
                    }
                    other => return Err(Self::map_err(other)),
                },
            }
        }
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    fn capabilities(&self) -> MessagingCapabilities {
        MessagingCapabilities {
            supports_profile_photos: true,
            max_message_len: 4096,
        }
    }

    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef> {
        let msg = self
            .with_retry(|| {
                self.bot
                    .send_message(Self::tg_chat(chat_id), html.to_string())
                    .parse_mode(ParseMode::Html)
                    .disable_web_page_preview(true)
            })
            .await?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        })
    }

    async fn reply_html(&self, to: MessageRef, html: &str) -> Result<MessageRef> {
        let msg = self
            .with_retry(|| {
                self.bot
                    .send_message(Self::tg_chat(to.chat_id), html.to_string())
                    .parse_mode(ParseMode::Html)
                    .disable_web_page_preview(true)
                    .reply_to_message_id(Self::tg_msg_id(to.message_id))
            })
            .await?;

        Ok(MessageRef {
            chat_id: to.chat_id,
            message_id: MessageId(msg.id.0),
        })
    }

    async fn profile_photo_count(&self, user_id: UserId) -> Result<u32> {
        let user = Self::tg_user(user_id)?;
        let photos = self
            .with_retry(|| self.bot.get_user_profile_photos(user).limit(1))
            .await?;
        Ok(photos.total_count)
    }
}

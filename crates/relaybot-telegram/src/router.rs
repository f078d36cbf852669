use std::sync::Arc;

use teloxide::{dispatching::Dispatcher as TgDispatcher, dptree, prelude::*};

use relaybot_core::{
    config::Config,
    dispatcher::Dispatcher,
    messaging::port::MessagingPort,
    relay::{RelayRegistry, RelayService},
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    /// Wire a fresh (empty) registry, the relay service and the dispatcher.
    pub fn new(cfg: Arc<Config>, messenger: Arc<dyn MessagingPort>) -> Self {
        let registry = Arc::new(RelayRegistry::new());
        let relay = Arc::new(RelayService::new(
            registry,
            messenger,
            cfg.admin_id,
            cfg.send_timeout,
        ));
        let dispatcher = Arc::new(Dispatcher::new(cfg.clone(), relay));
        Self { cfg, dispatcher }
    }
}

pub async fn run_polling(cfg: Arc<Config>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    // Basic startup info.
    match bot.get_me().await {
        Ok(me) => tracing::info!(bot = %me.username(), "relay bot started"),
        Err(e) => tracing::warn!("get_me failed: {e}"),
    }
    tracing::info!(
        admin_id = cfg.admin_id.0,
        admin_username = %cfg.admin_username,
        "relaying to admin"
    );

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let state = Arc::new(AppState::new(cfg, messenger));

    let handler =
        dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    // Updates are processed sequentially per chat and concurrently across chats.
    TgDispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use relaybot_core::{
        domain::{ChatId, MessageId, MessageRef, UserId},
        errors::Error,
        messaging::types::MessagingCapabilities,
        Result,
    };

    struct NullMessenger;

    #[async_trait]
    impl MessagingPort for NullMessenger {
        fn capabilities(&self) -> MessagingCapabilities {
            MessagingCapabilities {
                supports_profile_photos: false,
                max_message_len: 4096,
            }
        }

        async fn send_html(&self, chat_id: ChatId, _html: &str) -> Result<MessageRef> {
            Ok(MessageRef {
                chat_id,
                message_id: MessageId(1),
            })
        }

        async fn reply_html(&self, to: MessageRef, _html: &str) -> Result<MessageRef> {
            Ok(to)
        }

        async fn profile_photo_count(&self, _user_id: UserId) -> Result<u32> {
            Err(Error::External("unsupported".to_string()))
        }
    }

    #[tokio::test]
    async fn app_state_starts_with_empty_registry() {
        let cfg = Arc::new(Config::new("x", 42, "admin"));
        let state = AppState::new(cfg, Arc::new(NullMessenger));
        assert!(state.dispatcher.relay().registry().is_empty().await);
        assert_eq!(state.cfg.admin_id, UserId(42));
    }
}

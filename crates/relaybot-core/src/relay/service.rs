use std::{future::Future, sync::Arc, time::Duration};

use crate::{
    domain::{ChatId, MessageRef, Origin, UserId},
    errors::Error,
    formatting::{admin_reply_html, forward_details_html},
    messaging::{port::MessagingPort, types::IncomingMessage},
    relay::registry::RelayRegistry,
    Result,
};

/// What happened to an admin reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteOutcome {
    /// The reply was sent to the originating chat.
    Delivered { origin: Origin, message: MessageRef },
    /// No registered forwarded message found in the reply chain.
    NotFound,
    /// The reply carries no text or caption.
    UnsupportedContent,
}

/// Forwards user messages into the admin chat and routes admin replies back.
pub struct RelayService {
    registry: Arc<RelayRegistry>,
    messenger: Arc<dyn MessagingPort>,
    admin_chat: ChatId,
    send_timeout: Duration,
}

impl RelayService {
    pub fn new(
        registry: Arc<RelayRegistry>,
        messenger: Arc<dyn MessagingPort>,
        admin_id: UserId,
        send_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            messenger,
            admin_chat: admin_id.into(),
            send_timeout,
        }
    }

    pub fn registry(&self) -> &Arc<RelayRegistry> {
        &self.registry
    }

    /// Reply in an existing chat (acknowledgements, notices), bounded like
    /// every other outbound send.
    pub async fn reply(&self, to: MessageRef, html: &str) -> Result<MessageRef> {
        self.bounded(self.messenger.reply_html(to, html)).await
    }

    /// Send `msg` (plus sender/chat metadata) to the admin chat and remember
    /// where it came from. Nothing is registered unless the send succeeds.
    pub async fn forward(&self, msg: &IncomingMessage) -> Result<MessageRef> {
        let sender = msg.sender.as_ref().ok_or(Error::MissingSender)?;
        let origin = Origin {
            chat_id: msg.chat.id,
            user_id: sender.id,
        };

        let photo_count = self.fetch_photo_count(sender.id).await;
        let max_len = self.messenger.capabilities().max_message_len;
        let html = forward_details_html(msg, sender, photo_count, max_len);

        let sent = self
            .bounded(self.messenger.send_html(self.admin_chat, &html))
            .await?;

        if !self.registry.register(sent.message_id, origin).await {
            tracing::warn!(
                forwarded_id = sent.message_id.0,
                "forwarded message id already registered; keeping first origin"
            );
        }
        tracing::info!(
            chat_id = origin.chat_id.0,
            user_id = origin.user_id.0,
            forwarded_id = sent.message_id.0,
            "forwarded user message to admin"
        );

        Ok(sent)
    }

    /// Resolve the conversation an admin reply belongs to and deliver it.
    pub async fn resolve_and_route(&self, reply: &IncomingMessage) -> Result<RouteOutcome> {
        let Some(content) = reply.content() else {
            return Ok(RouteOutcome::UnsupportedContent);
        };
        let Some(replied_to) = reply.reply_to.as_deref() else {
            return Ok(RouteOutcome::NotFound);
        };

        let Some(resolved) = self.registry.resolve(replied_to).await else {
            tracing::info!(
                replied_to = replied_to.message_id.0,
                "admin reply does not resolve to a known user"
            );
            return Ok(RouteOutcome::NotFound);
        };

        let origin = resolved.origin;
        let html = admin_reply_html(content, self.messenger.capabilities().max_message_len);
        let message = self
            .bounded(self.messenger.send_html(origin.chat_id, &html))
            .await?;

        tracing::info!(
            chat_id = origin.chat_id.0,
            user_id = origin.user_id.0,
            forwarded_id = resolved.forwarded_id.0,
            hops = resolved.hops,
            "routed admin reply"
        );

        Ok(RouteOutcome::Delivered { origin, message })
    }

    /// Best-effort profile metadata; failures become `None`.
    async fn fetch_photo_count(&self, user_id: UserId) -> Option<u32> {
        if !self.messenger.capabilities().supports_profile_photos {
            return None;
        }
        match self
            .bounded(self.messenger.profile_photo_count(user_id))
            .await
        {
            Ok(n) => Some(n),
            Err(e) => {
                tracing::debug!(user_id = user_id.0, "profile photo lookup failed: {e}");
                None
            }
        }
    }

    async fn bounded<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.send_timeout, fut)
            .await
            .map_err(|_| Error::Timeout(self.send_timeout))?
    }
}

use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef, UserId},
    messaging::types::MessagingCapabilities,
    Result,
};

/// Cross-messenger port.
///
/// Telegram is the only implementation today; the relay core talks to the
/// transport exclusively through this trait.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    fn capabilities(&self) -> MessagingCapabilities;

    /// Send an HTML message (link previews disabled) and return its reference.
    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef>;

    /// Send an HTML message as a reply to `to`.
    async fn reply_html(&self, to: MessageRef, html: &str) -> Result<MessageRef>;

    /// Number of profile photos the user has.
    async fn profile_photo_count(&self, user_id: UserId) -> Result<u32>;
}

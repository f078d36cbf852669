use chrono::{DateTime, Utc};

use crate::domain::{ChatId, MessageId, MessageRef, UserId};

/// Kind of chat an update arrived from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
}

impl ChatKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChatKind::Private => "private",
            ChatKind::Group => "group",
            ChatKind::Supergroup => "supergroup",
            ChatKind::Channel => "channel",
        }
    }
}

#[derive(Clone, Debug)]
pub struct ChatInfo {
    pub id: ChatId,
    pub kind: ChatKind,
    pub title: Option<String>,
    pub username: Option<String>,
}

#[derive(Clone, Debug)]
pub struct Sender {
    pub id: UserId,
    pub username: Option<String>,
    pub full_name: String,
    pub language_code: Option<String>,
    pub is_premium: Option<bool>,
}

/// Cross-messenger incoming message.
///
/// `reply_to` holds the replied-to message exactly as the transport delivered
/// it; that message may carry its own `reply_to`, forming the reply chain.
#[derive(Clone, Debug)]
pub struct IncomingMessage {
    pub message_id: MessageId,
    pub chat: ChatInfo,
    pub sender: Option<Sender>,
    pub date: Option<DateTime<Utc>>,
    pub text: Option<String>,
    pub caption: Option<String>,
    pub reply_to: Option<Box<IncomingMessage>>,
}

impl IncomingMessage {
    /// Text, or the caption for media messages.
    pub fn content(&self) -> Option<&str> {
        self.text.as_deref().or(self.caption.as_deref())
    }

    pub fn message_ref(&self) -> MessageRef {
        MessageRef {
            chat_id: self.chat.id,
            message_id: self.message_id,
        }
    }

    pub fn sender_id(&self) -> Option<UserId> {
        self.sender.as_ref().map(|s| s.id)
    }

    pub fn is_reply(&self) -> bool {
        self.reply_to.is_some()
    }

    /// Walk this message and the messages it replies to, nearest first.
    pub fn reply_chain(&self) -> ReplyChain<'_> {
        ReplyChain { next: Some(self) }
    }
}

pub struct ReplyChain<'a> {
    next: Option<&'a IncomingMessage>,
}

impl<'a> Iterator for ReplyChain<'a> {
    type Item = &'a IncomingMessage;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.next?;
        self.next = cur.reply_to.as_deref();
        Some(cur)
    }
}

/// Capabilities / feature flags of a messenger implementation.
#[derive(Clone, Copy, Debug)]
pub struct MessagingCapabilities {
    pub supports_profile_photos: bool,
    /// Longest accepted message body, in UTF-16 code units.
    pub max_message_len: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(id: i32, text: Option<&str>, caption: Option<&str>) -> IncomingMessage {
        IncomingMessage {
            message_id: MessageId(id),
            chat: ChatInfo {
                id: ChatId(1),
                kind: ChatKind::Private,
                title: None,
                username: None,
            },
            sender: None,
            date: None,
            text: text.map(str::to_string),
            caption: caption.map(str::to_string),
            reply_to: None,
        }
    }

    #[test]
    fn content_prefers_text_over_caption() {
        assert_eq!(msg(1, Some("t"), Some("c")).content(), Some("t"));
        assert_eq!(msg(1, None, Some("c")).content(), Some("c"));
        assert_eq!(msg(1, None, None).content(), None);
    }

    #[test]
    fn reply_chain_yields_nearest_first() {
        let mut root = msg(3, None, None);
        let mut mid = msg(2, None, None);
        mid.reply_to = Some(Box::new(msg(1, None, None)));
        root.reply_to = Some(Box::new(mid));

        let ids: Vec<i32> = root.reply_chain().map(|m| m.message_id.0).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }
}

/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a Telegram message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// Where a relayed message came from.
///
/// For direct messages `chat_id` equals `user_id`; group chats keep them apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Origin {
    pub chat_id: ChatId,
    pub user_id: UserId,
}

impl Origin {
    pub fn direct(user_id: UserId) -> Self {
        Self {
            chat_id: ChatId(user_id.0),
            user_id,
        }
    }
}

impl From<UserId> for ChatId {
    fn from(u: UserId) -> Self {
        ChatId(u.0)
    }
}

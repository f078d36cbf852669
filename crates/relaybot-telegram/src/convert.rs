//! Telegram `Message` → transport-neutral `IncomingMessage`.

use teloxide::types::{Chat, Message, User};

use relaybot_core::{
    domain::{ChatId, MessageId, UserId},
    messaging::types::{ChatInfo, ChatKind, IncomingMessage, Sender},
};

pub fn incoming_from_message(msg: &Message) -> IncomingMessage {
    IncomingMessage {
        message_id: MessageId(msg.id.0),
        chat: chat_info(&msg.chat),
        sender: msg.from().map(sender),
        date: Some(msg.date),
        text: msg.text().map(str::to_string),
        caption: msg.caption().map(str::to_string),
        // Telegram nests the replied-to message (which may carry its own
        // reply target); keep the whole chain.
        reply_to: msg
            .reply_to_message()
            .map(|r| Box::new(incoming_from_message(r))),
    }
}

fn chat_info(chat: &Chat) -> ChatInfo {
    let kind = if chat.is_private() {
        ChatKind::Private
    } else if chat.is_supergroup() {
        ChatKind::Supergroup
    } else if chat.is_channel() {
        ChatKind::Channel
    } else {
        ChatKind::Group
    };

    ChatInfo {
        id: ChatId(chat.id.0),
        kind,
        title: chat.title().map(str::to_string),
        username: chat.username().map(str::to_string),
    }
}

fn sender(user: &User) -> Sender {
    Sender {
        id: UserId(user.id.0 as i64),
        username: user.username.clone(),
        full_name: user.full_name(),
        language_code: user.language_code.clone(),
        is_premium: Some(user.is_premium),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(json: serde_json::Value) -> Message {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn converts_private_text_message() {
        let msg = message(serde_json::json!({
            "message_id": 77,
            "date": 1_767_323_045,
            "chat": { "id": 123, "type": "private", "first_name": "Alice" },
            "from": {
                "id": 123,
                "is_bot": false,
                "first_name": "Alice",
                "last_name": "Smith",
                "username": "alice",
                "language_code": "en"
            },
            "text": "hello"
        }));

        let incoming = incoming_from_message(&msg);
        assert_eq!(incoming.message_id, MessageId(77));
        assert_eq!(incoming.chat.id, ChatId(123));
        assert_eq!(incoming.chat.kind, ChatKind::Private);
        assert_eq!(incoming.content(), Some("hello"));
        assert!(incoming.reply_to.is_none());

        let sender = incoming.sender.unwrap();
        assert_eq!(sender.id, UserId(123));
        assert_eq!(sender.full_name, "Alice Smith");
        assert_eq!(sender.username.as_deref(), Some("alice"));
        assert_eq!(sender.language_code.as_deref(), Some("en"));
    }

    #[test]
    fn keeps_reply_target() {
        let msg = message(serde_json::json!({
            "message_id": 20,
            "date": 1_767_323_045,
            "chat": { "id": 42, "type": "private", "first_name": "Admin" },
            "from": { "id": 42, "is_bot": false, "first_name": "Admin" },
            "text": "hi there",
            "reply_to_message": {
                "message_id": 9001,
                "date": 1_767_323_000,
                "chat": { "id": 42, "type": "private", "first_name": "Admin" },
                "from": { "id": 999, "is_bot": true, "first_name": "Relay" },
                "text": "forwarded"
            }
        }));

        let incoming = incoming_from_message(&msg);
        let ids: Vec<i32> = incoming.reply_chain().map(|m| m.message_id.0).collect();
        assert_eq!(ids, vec![20, 9001]);
    }

    #[test]
    fn converts_supergroup_caption() {
        let msg = message(serde_json::json!({
            "message_id": 5,
            "date": 1_767_323_045,
            "chat": {
                "id": -1_001_234,
                "type": "supergroup",
                "title": "Support",
                "username": "support_group"
            },
            "from": { "id": 7, "is_bot": false, "first_name": "Bob" },
            "photo": [
                { "file_id": "a", "file_unique_id": "b", "width": 10, "height": 10 }
            ],
            "caption": "look"
        }));

        let incoming = incoming_from_message(&msg);
        assert_eq!(incoming.chat.kind, ChatKind::Supergroup);
        assert_eq!(incoming.chat.title.as_deref(), Some("Support"));
        assert_eq!(incoming.chat.username.as_deref(), Some("support_group"));
        assert_eq!(incoming.text, None);
        assert_eq!(incoming.content(), Some("look"));
    }
}

//! Formatting utilities (Telegram HTML for forwarded messages and replies).

use chrono::{DateTime, Utc};

use crate::messaging::types::{IncomingMessage, Sender};

pub const WELCOME_TEXT: &str = "👋 Welcome!\n\n\
Send your message here and admin will reply.\n\
Use /contact for direct admin contact.";

pub const FORWARD_ACK_TEXT: &str = "✅ Message sent to admin. Please wait for reply.";
pub const FORWARD_FAILED_TEXT: &str =
    "⚠️ Could not deliver your message to admin. Please try again later.";
pub const ROUTE_NOT_FOUND_TEXT: &str =
    "⚠️ Cannot find original user (bot restart or old message).";
pub const UNSUPPORTED_CONTENT_TEXT: &str = "⚠️ Only text replies supported.";
pub const ROUTE_FAILED_TEXT: &str = "⚠️ Failed to deliver reply to user.";

const UNKNOWN: &str = "unknown";
const ELLIPSIS: &str = "…";
const ADMIN_REPLY_PREFIX: &str = "💬 <b>Admin reply</b>:\n\n";

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn format_utc(dt: Option<DateTime<Utc>>) -> String {
    match dt {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => UNKNOWN.to_string(),
    }
}

pub fn contact_html(admin_username: &str) -> String {
    let admin = escape_html(admin_username);
    format!("📞 Contact admin: @{admin}\nhttps://t.me/{admin}")
}

/// Length as Telegram counts it (UTF-16 code units).
pub fn text_len(s: &str) -> usize {
    s.encode_utf16().count()
}

/// Cut already-escaped HTML so it fits `max_len`, marking the cut with an
/// ellipsis. Never splits a char or an `&...;` entity.
fn fit_escaped(escaped: &str, max_len: usize) -> String {
    if text_len(escaped) <= max_len {
        return escaped.to_string();
    }
    let budget = max_len.saturating_sub(text_len(ELLIPSIS));
    let mut used = 0;
    let mut end = 0;
    for (i, c) in escaped.char_indices() {
        used += c.len_utf16();
        if used > budget {
            break;
        }
        end = i + c.len_utf8();
    }
    let mut head = &escaped[..end];
    if let Some(amp) = head.rfind('&') {
        if !head[amp..].contains(';') {
            head = &head[..amp];
        }
    }
    format!("{head}{ELLIPSIS}")
}

/// Body delivered to the user when the admin replies, cut to `max_len`.
pub fn admin_reply_html(reply: &str, max_len: usize) -> String {
    let budget = max_len.saturating_sub(text_len(ADMIN_REPLY_PREFIX));
    format!("{ADMIN_REPLY_PREFIX}{}", fit_escaped(&escape_html(reply), budget))
}

/// Body of the message forwarded into the admin chat.
///
/// `photo_count` is best-effort metadata; `None` renders as `unknown`. The
/// message text is cut so the whole body fits `max_len`.
pub fn forward_details_html(
    msg: &IncomingMessage,
    sender: &Sender,
    photo_count: Option<u32>,
    max_len: usize,
) -> String {
    let username = sender
        .username
        .as_deref()
        .map(|u| format!("@{}", escape_html(u)))
        .unwrap_or_else(|| "no_username".to_string());
    let lang = sender
        .language_code
        .as_deref()
        .map(escape_html)
        .unwrap_or_else(|| UNKNOWN.to_string());
    let premium = sender
        .is_premium
        .map(|p| p.to_string())
        .unwrap_or_else(|| UNKNOWN.to_string());
    let photos = photo_count
        .map(|c| c.to_string())
        .unwrap_or_else(|| UNKNOWN.to_string());

    let chat_title = msg
        .chat
        .title
        .as_deref()
        .filter(|t| !t.is_empty())
        .map(escape_html)
        .unwrap_or_else(|| "n/a".to_string());
    let chat_username = msg
        .chat
        .username
        .as_deref()
        .map(|u| format!("@{}", escape_html(u)))
        .unwrap_or_else(|| "n/a".to_string());

    let head = format!(
        "🧷 <b>REPLY TO THIS MESSAGE TO REPLY TO USER</b>\n\
──────────────────────────────\n\
📩 <b>New message</b>\n\
🕒 <b>Date:</b> {date}\n\n\
👤 <b>Name:</b> {name}\n\
🔗 <b>Username:</b> {username}\n\
🆔 <b>User ID:</b> <code>{user_id}</code>\n\
🌐 <b>Language:</b> <code>{lang}</code>\n\
⭐ <b>Premium:</b> <code>{premium}</code>\n\
🖼️ <b>Profile photos:</b> <code>{photos}</code>\n\n\
💬 <b>Chat type:</b> <code>{chat_type}</code>\n\
🏷️ <b>Chat title:</b> {chat_title}\n\
🔗 <b>Chat username:</b> {chat_username}\n\
🆔 <b>Chat ID:</b> <code>{chat_id}</code>\n\
🧾 <b>Message ID:</b> <code>{message_id}</code>\n\n\
📝 <b>Message:</b>\n",
        date = format_utc(msg.date),
        name = escape_html(&sender.full_name),
        user_id = sender.id.0,
        chat_type = msg.chat.kind.as_str(),
        chat_id = msg.chat.id.0,
        message_id = msg.message_id.0,
    );

    let text = match msg.content() {
        Some(content) => {
            fit_escaped(&escape_html(content), max_len.saturating_sub(text_len(&head)))
        }
        None => "(no text)".to_string(),
    };
    head + &text
}

//! Telegram update handlers.
//!
//! Every message update is converted to the transport-neutral model and handed
//! to the core dispatcher, which decides between command, admin reply and user
//! message.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use crate::convert::incoming_from_message;
use crate::router::AppState;

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let incoming = incoming_from_message(&msg);
    let route = state.dispatcher.handle(&incoming).await;
    tracing::debug!(
        chat_id = msg.chat.id.0,
        message_id = msg.id.0,
        ?route,
        "message handled"
    );
    // Per-event failures are handled (and logged) inside the dispatcher; never
    // fail the update, or teloxide would log it again without context.
    Ok(())
}

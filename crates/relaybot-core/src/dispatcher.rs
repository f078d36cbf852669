//! Ingress classification and per-event handling.
//!
//! Order matters: commands first, then admin replies, then user messages. The
//! admin's chat looks like any other private chat, so the admin check has to
//! run before the generic user-message path.

use std::sync::Arc;

use crate::{
    config::Config,
    domain::{MessageRef, UserId},
    formatting::{
        contact_html, FORWARD_ACK_TEXT, FORWARD_FAILED_TEXT, ROUTE_FAILED_TEXT,
        ROUTE_NOT_FOUND_TEXT, UNSUPPORTED_CONTENT_TEXT, WELCOME_TEXT,
    },
    messaging::types::IncomingMessage,
    relay::{RelayService, RouteOutcome},
    Result,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BotCommand {
    /// `/start` and `/help`.
    Start,
    /// `/contact`.
    Contact,
}

impl BotCommand {
    pub fn parse(text: &str) -> Option<Self> {
        Self::from_name(&parse_command(text)?)
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "start" | "help" => Some(BotCommand::Start),
            "contact" => Some(BotCommand::Contact),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    NoSender,
    UnknownCommand,
    AdminNotReply,
    NoContent,
}

/// Exactly one route per inbound event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Command(BotCommand),
    AdminReply,
    UserMessage,
    Ignored(IgnoreReason),
}

/// Lowercased command name without the `@botname` suffix, or `None` if the
/// text does not start with a bot command token (`/[A-Za-z0-9_]+`).
fn parse_command(text: &str) -> Option<String> {
    let first = text.split_whitespace().next()?;
    let name = first.strip_prefix('/')?;
    let name = name.split('@').next().unwrap_or("");
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    Some(name.to_lowercase())
}

pub fn classify(msg: &IncomingMessage, admin_id: UserId) -> Route {
    let Some(sender_id) = msg.sender_id() else {
        return Route::Ignored(IgnoreReason::NoSender);
    };

    if let Some(name) = msg.text.as_deref().and_then(parse_command) {
        return match BotCommand::from_name(&name) {
            Some(cmd) => Route::Command(cmd),
            None => Route::Ignored(IgnoreReason::UnknownCommand),
        };
    }

    if sender_id == admin_id {
        if msg.is_reply() {
            return Route::AdminReply;
        }
        return Route::Ignored(IgnoreReason::AdminNotReply);
    }

    if msg.content().is_none() {
        return Route::Ignored(IgnoreReason::NoContent);
    }
    Route::UserMessage
}

/// Handles one inbound event end to end.
///
/// Failures never escape `handle`: they are logged, the party who can act on
/// them gets a notice (best effort), and the next event starts clean.
pub struct Dispatcher {
    cfg: Arc<Config>,
    relay: Arc<RelayService>,
}

impl Dispatcher {
    pub fn new(cfg: Arc<Config>, relay: Arc<RelayService>) -> Self {
        Self { cfg, relay }
    }

    pub fn relay(&self) -> &Arc<RelayService> {
        &self.relay
    }

    pub async fn handle(&self, msg: &IncomingMessage) -> Route {
        let route = classify(msg, self.cfg.admin_id);
        let res = match route {
            Route::Command(cmd) => self.handle_command(msg, cmd).await,
            Route::AdminReply => self.handle_admin_reply(msg).await,
            Route::UserMessage => self.handle_user_message(msg).await,
            Route::Ignored(reason) => {
                tracing::debug!(
                    chat_id = msg.chat.id.0,
                    message_id = msg.message_id.0,
                    ?reason,
                    "ignoring message"
                );
                Ok(())
            }
        };

        match res {
            Err(e) if e.is_transport() => tracing::warn!(
                chat_id = msg.chat.id.0,
                message_id = msg.message_id.0,
                ?route,
                "failed to handle message: {e}"
            ),
            Err(e) => tracing::error!(
                chat_id = msg.chat.id.0,
                message_id = msg.message_id.0,
                ?route,
                "failed to handle message: {e}"
            ),
            Ok(()) => {}
        }
        route
    }

    async fn handle_command(&self, msg: &IncomingMessage, cmd: BotCommand) -> Result<()> {
        let html = match cmd {
            BotCommand::Start => WELCOME_TEXT.to_string(),
            BotCommand::Contact => contact_html(&self.cfg.admin_username),
        };
        self.reply(msg.message_ref(), &html).await
    }

    async fn handle_user_message(&self, msg: &IncomingMessage) -> Result<()> {
        match self.relay.forward(msg).await {
            Ok(_) => self.reply(msg.message_ref(), FORWARD_ACK_TEXT).await,
            Err(e) => {
                self.notify(msg.message_ref(), FORWARD_FAILED_TEXT).await;
                Err(e)
            }
        }
    }

    async fn handle_admin_reply(&self, msg: &IncomingMessage) -> Result<()> {
        let notice = match self.relay.resolve_and_route(msg).await {
            Ok(RouteOutcome::Delivered { .. }) => return Ok(()),
            Ok(RouteOutcome::NotFound) => ROUTE_NOT_FOUND_TEXT,
            Ok(RouteOutcome::UnsupportedContent) => UNSUPPORTED_CONTENT_TEXT,
            Err(e) => {
                self.notify(msg.message_ref(), ROUTE_FAILED_TEXT).await;
                return Err(e);
            }
        };
        self.reply(msg.message_ref(), notice).await
    }

    async fn reply(&self, to: MessageRef, html: &str) -> Result<()> {
        self.relay.reply(to, html).await?;
        Ok(())
    }

    /// Failure notices are best effort; the original error is what gets logged.
    async fn notify(&self, to: MessageRef, html: &str) {
        if let Err(e) = self.reply(to, html).await {
            tracing::debug!(chat_id = to.chat_id.0, "failed to send failure notice: {e}");
        }
    }
}

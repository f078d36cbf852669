use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::{
    domain::{MessageId, Origin},
    messaging::types::IncomingMessage,
};

/// Maximum number of messages inspected when walking a reply chain.
pub const MAX_HOPS: usize = 8;

/// Result of a reply-chain walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolved {
    pub origin: Origin,
    /// Forwarded message the walk stopped at.
    pub forwarded_id: MessageId,
    /// Links followed before the registered id was found (0 = direct reply).
    pub hops: usize,
}

/// Maps forwarded (admin chat) message ids to the conversation they came from.
///
/// Entries are write-once and live for the process lifetime.
#[derive(Debug, Default)]
pub struct RelayRegistry {
    entries: RwLock<HashMap<MessageId, Origin>>,
}

impl RelayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `forwarded_id → origin`. Returns false (and keeps the existing
    /// entry untouched) if the id was already registered.
    pub async fn register(&self, forwarded_id: MessageId, origin: Origin) -> bool {
        let mut entries = self.entries.write().await;
        if entries.contains_key(&forwarded_id) {
            return false;
        }
        entries.insert(forwarded_id, origin);
        true
    }

    pub async fn lookup(&self, forwarded_id: MessageId) -> Option<Origin> {
        self.entries.read().await.get(&forwarded_id).copied()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Walk upward from `replied_to` through its reply targets and return the
    /// first registered origin. At most `MAX_HOPS` messages are inspected.
    pub async fn resolve(&self, replied_to: &IncomingMessage) -> Option<Resolved> {
        let entries = self.entries.read().await;
        replied_to
            .reply_chain()
            .take(MAX_HOPS)
            .enumerate()
            .find_map(|(hops, msg)| {
                entries.get(&msg.message_id).map(|origin| Resolved {
                    origin: *origin,
                    forwarded_id: msg.message_id,
                    hops,
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChatId, UserId};
    use crate::messaging::types::{ChatInfo, ChatKind};

    fn admin_msg(id: i32) -> IncomingMessage {
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
            text: Some(format!("message {id}")),
            caption: None,
            reply_to: None,
        }
    }

    /// Chain of `len` messages, nearest first: ids `1000, 1001, ...`, each
    /// replying to the next one.
    fn chain(len: usize) -> IncomingMessage {
        let mut cur: Option<IncomingMessage> = None;
        for i in (0..len).rev() {
            let mut m = admin_msg(1000 + i as i32);
            m.reply_to = cur.take().map(Box::new);
            cur = Some(m);
        }
        cur.unwrap()
    }

    #[tokio::test]
    async fn register_is_write_once() {
        let reg = RelayRegistry::new();
        let first = Origin::direct(UserId(1));
        let second = Origin::direct(UserId(2));

        assert!(reg.register(MessageId(10), first).await);
        assert!(!reg.register(MessageId(10), second).await);
        assert_eq!(reg.lookup(MessageId(10)).await, Some(first));
        assert_eq!(reg.len().await, 1);
    }

    #[tokio::test]
    async fn lookup_is_exact_key_only() {
        let reg = RelayRegistry::new();
        assert!(reg.is_empty().await);
        reg.register(MessageId(10), Origin::direct(UserId(1))).await;
        assert_eq!(reg.lookup(MessageId(11)).await, None);
        assert_eq!(reg.lookup(MessageId(9)).await, None);
    }

    #[tokio::test]
    async fn resolves_direct_reply() {
        let reg = RelayRegistry::new();
        let origin = Origin {
            chat_id: ChatId(-100),
            user_id: UserId(5),
        };
        reg.register(MessageId(1000), origin).await;

        let resolved = reg.resolve(&chain(1)).await.unwrap();
        assert_eq!(resolved.origin, origin);
        assert_eq!(resolved.forwarded_id, MessageId(1000));
        assert_eq!(resolved.hops, 0);
    }

    #[tokio::test]
    async fn resolves_through_every_depth_within_bound() {
        for depth in 0..MAX_HOPS {
            let reg = RelayRegistry::new();
            let origin = Origin::direct(UserId(42));
            reg.register(MessageId(1000 + depth as i32), origin).await;

            let resolved = reg.resolve(&chain(depth + 1)).await;
            assert_eq!(
                resolved.map(|r| (r.origin, r.hops)),
                Some((origin, depth)),
                "depth {depth}"
            );
        }
    }

    #[tokio::test]
    async fn stops_at_hop_bound() {
        let reg = RelayRegistry::new();
        reg.register(MessageId(1000 + MAX_HOPS as i32), Origin::direct(UserId(42)))
            .await;

        assert_eq!(reg.resolve(&chain(MAX_HOPS + 1)).await, None);
    }

    #[tokio::test]
    async fn nearest_registered_message_wins() {
        let reg = RelayRegistry::new();
        let near = Origin::direct(UserId(1));
        let far = Origin::direct(UserId(2));
        reg.register(MessageId(1001), near).await;
        reg.register(MessageId(1003), far).await;

        let resolved = reg.resolve(&chain(4)).await.unwrap();
        assert_eq!(resolved.origin, near);
        assert_eq!(resolved.hops, 1);
    }

    #[tokio::test]
    async fn unknown_chain_is_not_found() {
        let reg = RelayRegistry::new();
        reg.register(MessageId(1), Origin::direct(UserId(1))).await;
        assert_eq!(reg.resolve(&chain(3)).await, None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_registration_keeps_every_entry() {
        let reg = std::sync::Arc::new(RelayRegistry::new());
        let mut tasks = Vec::new();
        for i in 0..64 {
            let reg = reg.clone();
            tasks.push(tokio::spawn(async move {
                reg.register(MessageId(i), Origin::direct(UserId(i as i64)))
                    .await
            }));
        }
        for t in tasks {
            assert!(t.await.unwrap());
        }
        assert_eq!(reg.len().await, 64);
        assert_eq!(reg.lookup(MessageId(17)).await, Some(Origin::direct(UserId(17))));
    }
}

use axum::extract::ws::Message;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::RwLock;
use uuid::Uuid;

pub mod handlers;
pub mod message_types;
pub mod session;

struct Subscriber {
    user_id: Uuid,
    tx: UnboundedSender<Message>,
}

/// Process-wide registry of room broadcast groups: chat id -> live connection
/// handles. Group mutation and fan-out iteration are serialized per registry,
/// so a connection never receives a message after it has fully left a room
/// and receives every message published while it is in one. Sends go through
/// unbounded channels, so one slow or dead recipient cannot stall the rest.
#[derive(Default, Clone)]
pub struct ConnectionRegistry {
    // chat_id -> connection_id -> subscriber
    inner: Arc<RwLock<HashMap<Uuid, HashMap<Uuid, Subscriber>>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn join(
        &self,
        chat_id: Uuid,
        connection_id: Uuid,
        user_id: Uuid,
        tx: UnboundedSender<Message>,
    ) {
        let mut guard = self.inner.write().await;
        guard
            .entry(chat_id)
            .or_default()
            .insert(connection_id, Subscriber { user_id, tx });
    }

    pub async fn leave(&self, chat_id: Uuid, connection_id: Uuid) {
        let mut guard = self.inner.write().await;
        if let Some(group) = guard.get_mut(&chat_id) {
            group.remove(&connection_id);
            if group.is_empty() {
                guard.remove(&chat_id);
            }
        }
    }

    /// Remove the connection from every group it joined. Idempotent.
    pub async fn drop_connection(&self, connection_id: Uuid) {
        let mut guard = self.inner.write().await;
        guard.retain(|_, group| {
            group.remove(&connection_id);
            !group.is_empty()
        });
    }

    /// Evict all of a user's connections from one room, e.g. after their
    /// participation was revoked mid-session.
    pub async fn evict_user(&self, chat_id: Uuid, user_id: Uuid) {
        let mut guard = self.inner.write().await;
        if let Some(group) = guard.get_mut(&chat_id) {
            group.retain(|_, sub| sub.user_id != user_id);
            if group.is_empty() {
                guard.remove(&chat_id);
            }
        }
    }

    /// Tear down a room's broadcast group entirely (chat deleted).
    pub async fn close_room(&self, chat_id: Uuid) {
        self.inner.write().await.remove(&chat_id);
    }

    /// Fan out to every connection currently in the room, pruning dead
    /// senders as it goes.
    pub async fn broadcast(&self, chat_id: Uuid, msg: Message) {
        let mut guard = self.inner.write().await;
        if let Some(group) = guard.get_mut(&chat_id) {
            group.retain(|_, sub| sub.tx.send(msg.clone()).is_ok());
            if group.is_empty() {
                guard.remove(&chat_id);
            }
        }
    }

    pub async fn room_size(&self, chat_id: Uuid) -> usize {
        self.inner
            .read()
            .await
            .get(&chat_id)
            .map_or(0, HashMap::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    #[tokio::test]
    async fn broadcast_prunes_dead_senders() {
        let registry = ConnectionRegistry::new();
        let chat = Uuid::new_v4();
        let user = Uuid::new_v4();

        let (tx_live, mut rx_live) = unbounded_channel();
        let (tx_dead, rx_dead) = unbounded_channel();
        drop(rx_dead);

        registry.join(chat, Uuid::new_v4(), user, tx_live).await;
        registry.join(chat, Uuid::new_v4(), user, tx_dead).await;
        assert_eq!(registry.room_size(chat).await, 2);

        registry
            .broadcast(chat, Message::Text("hello".into()))
            .await;

        assert!(matches!(rx_live.try_recv(), Ok(Message::Text(t)) if t == "hello"));
        assert_eq!(registry.room_size(chat).await, 1);
    }

    #[tokio::test]
    async fn drop_connection_is_idempotent_and_leaves_other_rooms_alone() {
        let registry = ConnectionRegistry::new();
        let (chat_a, chat_b) = (Uuid::new_v4(), Uuid::new_v4());
        let conn = Uuid::new_v4();
        let other_conn = Uuid::new_v4();
        let user = Uuid::new_v4();

        let (tx, _rx) = unbounded_channel();
        let (tx2, _rx2) = unbounded_channel();
        registry.join(chat_a, conn, user, tx.clone()).await;
        registry.join(chat_b, conn, user, tx).await;
        registry.join(chat_b, other_conn, user, tx2).await;

        registry.drop_connection(conn).await;
        registry.drop_connection(conn).await;

        assert_eq!(registry.room_size(chat_a).await, 0);
        assert_eq!(registry.room_size(chat_b).await, 1);
    }

    #[tokio::test]
    async fn evicted_user_receives_nothing_afterwards() {
        let registry = ConnectionRegistry::new();
        let chat = Uuid::new_v4();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

        let (tx_a, mut rx_a) = unbounded_channel();
        let (tx_b, mut rx_b) = unbounded_channel();
        registry.join(chat, Uuid::new_v4(), alice, tx_a).await;
        registry.join(chat, Uuid::new_v4(), bob, tx_b).await;

        registry.evict_user(chat, bob).await;
        registry.broadcast(chat, Message::Text("after".into())).await;

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_err());
    }
}

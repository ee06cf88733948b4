use axum::extract::ws::Message;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};
use uuid::Uuid;

use crate::services::MessageService;
use crate::state::AppState;
use crate::store;
use crate::websocket::message_types::{WsInboundEvent, WsOutboundEvent};

/// Per-connection state. One user may hold several sessions at once. Room
/// membership lives in the registry only; the session itself holds no record
/// of what it joined, so every subscribe is answered from current state.
pub struct Session {
    pub connection_id: Uuid,
    pub user_id: Uuid,
    pub tx: UnboundedSender<Message>,
}

impl Session {
    pub fn new(user_id: Uuid, tx: UnboundedSender<Message>) -> Self {
        Self {
            connection_id: Uuid::new_v4(),
            user_id,
            tx,
        }
    }

    pub async fn handle_event(&self, state: &AppState, event: WsInboundEvent) {
        match event {
            WsInboundEvent::Subscribe { chat_id } => self.handle_subscribe(state, chat_id).await,
            WsInboundEvent::Message { chat_id, content } => {
                self.handle_publish(state, chat_id, &content).await
            }
        }
    }

    /// Join a room's broadcast group. Participation is checked against the
    /// store at the moment of the request, never remembered: a connection
    /// evicted after a membership change can subscribe again once the user is
    /// re-added. A non-participant's subscribe is dropped without a reply, so
    /// probing for a chat's existence reveals nothing. Re-subscribing while
    /// already joined is a no-op (the registry insert is keyed by connection).
    pub async fn handle_subscribe(&self, state: &AppState, chat_id: Uuid) {
        match store::chats::is_participant(&state.db, chat_id, self.user_id).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(%chat_id, user_id = %self.user_id, "subscribe refused: not a participant");
                return;
            }
            Err(e) => {
                warn!(%chat_id, error = %e, "subscribe failed");
                return;
            }
        }

        state
            .registry
            .join(chat_id, self.connection_id, self.user_id, self.tx.clone())
            .await;
        info!(%chat_id, user_id = %self.user_id, "subscribed to chat");
    }

    /// Persist the message, then fan the stored view out to the room. The
    /// sender's own connections receive the broadcast too. A persistence
    /// failure is logged and the frame is dropped; nothing is broadcast that
    /// was not stored.
    pub async fn handle_publish(&self, state: &AppState, chat_id: Uuid, content: &str) {
        let view = match MessageService::send(&state.db, chat_id, self.user_id, content, None).await
        {
            Ok(view) => view,
            Err(e) => {
                tracing::error!(%chat_id, user_id = %self.user_id, error = %e, "message rejected");
                return;
            }
        };

        let outbound = WsOutboundEvent::Message { message: view };
        match serde_json::to_string(&outbound) {
            Ok(payload) => state.registry.broadcast(chat_id, Message::Text(payload)).await,
            Err(e) => tracing::error!(%chat_id, error = %e, "failed to encode broadcast"),
        }
    }

    /// Detach this connection from every group it joined.
    pub async fn disconnect(&self, state: &AppState) {
        state.registry.drop_connection(self.connection_id).await;
        info!(user_id = %self.user_id, "websocket session closed");
    }
}

use chrono::Utc;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Message, MessageView};
use crate::store;

pub struct MessageService;

impl MessageService {
    /// Persist a message and return the fully populated view that gets
    /// broadcast to the room. Messages are immutable once created; the chat
    /// must exist at creation time.
    pub async fn send(
        db: &Pool<Sqlite>,
        chat_id: Uuid,
        sender_id: Uuid,
        content: &str,
        file_url: Option<&str>,
    ) -> AppResult<MessageView> {
        if content.trim().is_empty() {
            return Err(AppError::Validation("message content is required".into()));
        }
        store::chats::find(db, chat_id)
            .await?
            .ok_or(AppError::NotFound("chat not found"))?;

        let message = Message {
            id: Uuid::new_v4(),
            chat_id,
            sender_id,
            content: content.to_string(),
            file_url: file_url.map(str::to_string),
            created_at: Utc::now(),
        };
        store::messages::create(db, &message).await?;

        store::messages::view(db, message.id)
            .await?
            .ok_or(AppError::Internal)
    }

    /// Chat history in creation order. Participants only; senders in a team
    /// chat carry their current team role.
    pub async fn history(
        db: &Pool<Sqlite>,
        actor_id: Uuid,
        chat_id: Uuid,
    ) -> AppResult<Vec<MessageView>> {
        let chat = store::chats::find(db, chat_id)
            .await?
            .ok_or(AppError::NotFound("chat not found"))?;
        if !store::chats::is_participant(db, chat_id, actor_id).await? {
            return Err(AppError::Permission(
                "you are not a participant of this chat",
            ));
        }

        Ok(store::messages::list_for_chat(db, chat_id, chat.team_id).await?)
    }
}

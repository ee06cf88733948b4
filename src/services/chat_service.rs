use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Chat, ChatListItem, LastMessage};
use crate::store;

pub struct ChatService;

impl ChatService {
    /// Ad-hoc chats carry no team; their roster is managed directly and the
    /// creator is the first participant.
    pub async fn create_adhoc(db: &Pool<Sqlite>, creator_id: Uuid, name: &str) -> AppResult<Chat> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("chat name is required".into()));
        }

        let now = Utc::now();
        let chat = Chat {
            id: Uuid::new_v4(),
            name: name.to_string(),
            is_team_chat: false,
            team_id: None,
            created_at: now,
        };

        let mut tx = db.begin().await?;
        store::chats::create(&mut *tx, &chat).await?;
        store::chats::create_participant(&mut *tx, chat.id, creator_id, now).await?;
        tx.commit().await?;

        Ok(chat)
    }

    /// The user's chat list with a one-message preview, most recent activity
    /// first; chats without messages sort last.
    pub async fn list_for_user(db: &Pool<Sqlite>, user_id: Uuid) -> AppResult<Vec<ChatListItem>> {
        let chats = store::chats::list_for_user(db, user_id).await?;

        let mut items: Vec<(Option<DateTime<Utc>>, ChatListItem)> =
            Vec::with_capacity(chats.len());
        for chat in chats {
            let last = store::messages::last_for_chat(db, chat.id).await?;
            let last_message = last.map(|m| LastMessage {
                text: m.content,
                sender_id: m.sender_id,
                sender_name: m.sender_name,
                created_at: m.created_at,
            });
            let sort_key = last_message.as_ref().map(|m| m.created_at);
            items.push((
                sort_key,
                ChatListItem {
                    id: chat.id,
                    name: chat.name,
                    is_team_chat: chat.is_team_chat,
                    last_message,
                },
            ));
        }
        items.sort_by(|a, b| b.0.cmp(&a.0));

        Ok(items.into_iter().map(|(_, item)| item).collect())
    }

    /// Delete a chat with its messages and participants in one transaction.
    /// Team chats are creator-only; an ad-hoc chat may be deleted by any of
    /// its participants. Returns the chat id for broadcast-group teardown.
    pub async fn delete_chat(db: &Pool<Sqlite>, actor_id: Uuid, chat_id: Uuid) -> AppResult<Uuid> {
        let chat = store::chats::find(db, chat_id)
            .await?
            .ok_or(AppError::NotFound("chat not found"))?;

        match chat.team_id {
            Some(team_id) => {
                let team = store::teams::find(db, team_id)
                    .await?
                    .ok_or(AppError::NotFound("team not found"))?;
                if team.created_by != actor_id {
                    return Err(AppError::Permission(
                        "only the team creator can delete a team chat",
                    ));
                }
            }
            None => {
                if !store::chats::is_participant(db, chat_id, actor_id).await? {
                    return Err(AppError::Permission(
                        "you are not a participant of this chat",
                    ));
                }
            }
        }

        let mut tx = db.begin().await?;
        store::messages::delete_for_chat(&mut *tx, chat_id).await?;
        store::chats::delete_participants(&mut *tx, chat_id).await?;
        store::chats::delete(&mut *tx, chat_id).await?;
        tx.commit().await?;

        Ok(chat_id)
    }
}

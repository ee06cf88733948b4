use sqlx::SqliteExecutor;
use uuid::Uuid;

use crate::models::{Message, MessageView};

pub async fn create<'e>(db: impl SqliteExecutor<'e>, message: &Message) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO messages (id, chat_id, sender_id, content, file_url, created_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(message.id)
    .bind(message.chat_id)
    .bind(message.sender_id)
    .bind(&message.content)
    .bind(&message.file_url)
    .bind(message.created_at)
    .execute(db)
    .await?;
    Ok(())
}

/// Single message joined with its sender identity.
pub async fn view<'e>(
    db: impl SqliteExecutor<'e>,
    id: Uuid,
) -> Result<Option<MessageView>, sqlx::Error> {
    sqlx::query_as::<_, MessageView>(
        "SELECT m.id, m.chat_id, m.sender_id, \
                u.first_name || ' ' || u.last_name AS sender_name, \
                m.content, m.file_url, m.created_at, NULL AS sender_role \
         FROM messages m \
         JOIN users u ON u.id = m.sender_id \
         WHERE m.id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

/// Chat history in display order. When `team_id` is set, each sender is
/// annotated with their current role in the owning team.
pub async fn list_for_chat<'e>(
    db: impl SqliteExecutor<'e>,
    chat_id: Uuid,
    team_id: Option<Uuid>,
) -> Result<Vec<MessageView>, sqlx::Error> {
    sqlx::query_as::<_, MessageView>(
        "SELECT m.id, m.chat_id, m.sender_id, \
                u.first_name || ' ' || u.last_name AS sender_name, \
                m.content, m.file_url, m.created_at, tm.role AS sender_role \
         FROM messages m \
         JOIN users u ON u.id = m.sender_id \
         LEFT JOIN team_members tm ON tm.user_id = m.sender_id AND tm.team_id = ? \
         WHERE m.chat_id = ? \
         ORDER BY m.created_at ASC",
    )
    .bind(team_id)
    .bind(chat_id)
    .fetch_all(db)
    .await
}

/// Most recent message of a chat, for chat-list previews.
pub async fn last_for_chat<'e>(
    db: impl SqliteExecutor<'e>,
    chat_id: Uuid,
) -> Result<Option<MessageView>, sqlx::Error> {
    sqlx::query_as::<_, MessageView>(
        "SELECT m.id, m.chat_id, m.sender_id, \
                u.first_name || ' ' || u.last_name AS sender_name, \
                m.content, m.file_url, m.created_at, NULL AS sender_role \
         FROM messages m \
         JOIN users u ON u.id = m.sender_id \
         WHERE m.chat_id = ? \
         ORDER BY m.created_at DESC \
         LIMIT 1",
    )
    .bind(chat_id)
    .fetch_optional(db)
    .await
}

pub async fn delete_for_chat<'e>(
    db: impl SqliteExecutor<'e>,
    chat_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM messages WHERE chat_id = ?")
        .bind(chat_id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn count_for_chat<'e>(
    db: impl SqliteExecutor<'e>,
    chat_id: Uuid,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM messages WHERE chat_id = ?")
        .bind(chat_id)
        .fetch_one(db)
        .await
}

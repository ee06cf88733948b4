use chrono::{DateTime, Utc};
use sqlx::SqliteExecutor;
use uuid::Uuid;

use crate::models::{Chat, ChatSummary};

pub async fn create<'e>(db: impl SqliteExecutor<'e>, chat: &Chat) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO chats (id, name, is_team_chat, team_id, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(chat.id)
    .bind(&chat.name)
    .bind(chat.is_team_chat)
    .bind(chat.team_id)
    .bind(chat.created_at)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn find<'e>(db: impl SqliteExecutor<'e>, id: Uuid) -> Result<Option<Chat>, sqlx::Error> {
    sqlx::query_as::<_, Chat>("SELECT * FROM chats WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn delete<'e>(db: impl SqliteExecutor<'e>, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM chats WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn list_for_team<'e>(
    db: impl SqliteExecutor<'e>,
    team_id: Uuid,
) -> Result<Vec<Chat>, sqlx::Error> {
    sqlx::query_as::<_, Chat>("SELECT * FROM chats WHERE team_id = ? ORDER BY created_at DESC")
        .bind(team_id)
        .fetch_all(db)
        .await
}

pub async fn summaries_for_team<'e>(
    db: impl SqliteExecutor<'e>,
    team_id: Uuid,
) -> Result<Vec<ChatSummary>, sqlx::Error> {
    sqlx::query_as::<_, ChatSummary>(
        "SELECT id, name, is_team_chat FROM chats WHERE team_id = ? ORDER BY created_at ASC",
    )
    .bind(team_id)
    .fetch_all(db)
    .await
}

/// Chats the user participates in (team and ad-hoc alike).
pub async fn list_for_user<'e>(
    db: impl SqliteExecutor<'e>,
    user_id: Uuid,
) -> Result<Vec<Chat>, sqlx::Error> {
    sqlx::query_as::<_, Chat>(
        "SELECT c.* FROM chats c \
         JOIN chat_participants cp ON cp.chat_id = c.id \
         WHERE cp.user_id = ?",
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn create_participant<'e>(
    db: impl SqliteExecutor<'e>,
    chat_id: Uuid,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO chat_participants (chat_id, user_id, created_at) VALUES (?, ?, ?)")
        .bind(chat_id)
        .bind(user_id)
        .bind(now)
        .execute(db)
        .await?;
    Ok(())
}

/// Bulk insert: one participant row for the user in every chat owned by the
/// team, evaluated against the current transaction snapshot.
pub async fn create_participant_in_team_chats<'e>(
    db: impl SqliteExecutor<'e>,
    team_id: Uuid,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO chat_participants (chat_id, user_id, created_at) \
         SELECT id, ?, ? FROM chats WHERE team_id = ?",
    )
    .bind(user_id)
    .bind(now)
    .bind(team_id)
    .execute(db)
    .await?;
    Ok(())
}

/// Bulk insert: one participant row in the chat for every current member of
/// the team.
pub async fn create_participants_from_team<'e>(
    db: impl SqliteExecutor<'e>,
    chat_id: Uuid,
    team_id: Uuid,
    now: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO chat_participants (chat_id, user_id, created_at) \
         SELECT ?, user_id, ? FROM team_members WHERE team_id = ?",
    )
    .bind(chat_id)
    .bind(now)
    .bind(team_id)
    .execute(db)
    .await?;
    Ok(())
}

/// Remove the user from every chat owned by the team.
pub async fn delete_participant_from_team_chats<'e>(
    db: impl SqliteExecutor<'e>,
    team_id: Uuid,
    user_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "DELETE FROM chat_participants \
         WHERE user_id = ? AND chat_id IN (SELECT id FROM chats WHERE team_id = ?)",
    )
    .bind(user_id)
    .bind(team_id)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn delete_participants<'e>(
    db: impl SqliteExecutor<'e>,
    chat_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM chat_participants WHERE chat_id = ?")
        .bind(chat_id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn is_participant<'e>(
    db: impl SqliteExecutor<'e>,
    chat_id: Uuid,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let row: Option<i64> = sqlx::query_scalar(
        "SELECT 1 FROM chat_participants WHERE chat_id = ? AND user_id = ? LIMIT 1",
    )
    .bind(chat_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(row.is_some())
}

pub async fn participant_user_ids<'e>(
    db: impl SqliteExecutor<'e>,
    chat_id: Uuid,
) -> Result<Vec<Uuid>, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM chat_participants WHERE chat_id = ?")
        .bind(chat_id)
        .fetch_all(db)
        .await
}

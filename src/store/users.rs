use sqlx::SqliteExecutor;
use uuid::Uuid;

use crate::models::{User, UserProfile};

pub async fn create<'e>(db: impl SqliteExecutor<'e>, user: &User) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO users (id, first_name, last_name, email, password_hash, created_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(user.id)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.created_at)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn find_by_id<'e>(
    db: impl SqliteExecutor<'e>,
    id: Uuid,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

/// Substring match over emails (SQLite LIKE is case-insensitive for ASCII).
pub async fn search_by_email<'e>(
    db: impl SqliteExecutor<'e>,
    fragment: &str,
) -> Result<Vec<UserProfile>, sqlx::Error> {
    sqlx::query_as::<_, UserProfile>(
        "SELECT id, first_name, last_name, email FROM users \
         WHERE email LIKE ? \
         ORDER BY email",
    )
    .bind(format!("%{fragment}%"))
    .fetch_all(db)
    .await
}

pub async fn find_by_email<'e>(
    db: impl SqliteExecutor<'e>,
    email: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(db)
        .await
}

use sqlx::SqliteExecutor;
use uuid::Uuid;

use crate::models::user::PublicUser;
use crate::models::{MemberView, Team, TeamMemberRow};

pub async fn create<'e>(db: impl SqliteExecutor<'e>, team: &Team) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO teams (id, name, description, created_by, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(team.id)
    .bind(&team.name)
    .bind(&team.description)
    .bind(team.created_by)
    .bind(team.created_at)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn find<'e>(db: impl SqliteExecutor<'e>, id: Uuid) -> Result<Option<Team>, sqlx::Error> {
    sqlx::query_as::<_, Team>("SELECT * FROM teams WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn update<'e>(
    db: impl SqliteExecutor<'e>,
    id: Uuid,
    name: &str,
    description: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE teams SET name = ?, description = ? WHERE id = ?")
        .bind(name)
        .bind(description)
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn delete<'e>(db: impl SqliteExecutor<'e>, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM teams WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

/// Teams the user belongs to, newest first.
pub async fn list_for_user<'e>(
    db: impl SqliteExecutor<'e>,
    user_id: Uuid,
) -> Result<Vec<Team>, sqlx::Error> {
    sqlx::query_as::<_, Team>(
        "SELECT t.* FROM teams t \
         JOIN team_members tm ON tm.team_id = t.id \
         WHERE tm.user_id = ? \
         ORDER BY t.created_at DESC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn create_member<'e>(
    db: impl SqliteExecutor<'e>,
    team_id: Uuid,
    user_id: Uuid,
    role: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO team_members (team_id, user_id, role) VALUES (?, ?, ?)")
        .bind(team_id)
        .bind(user_id)
        .bind(role)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn find_member<'e>(
    db: impl SqliteExecutor<'e>,
    team_id: Uuid,
    user_id: Uuid,
) -> Result<Option<TeamMemberRow>, sqlx::Error> {
    sqlx::query_as::<_, TeamMemberRow>(
        "SELECT * FROM team_members WHERE team_id = ? AND user_id = ?",
    )
    .bind(team_id)
    .bind(user_id)
    .fetch_optional(db)
    .await
}

pub async fn delete_member<'e>(
    db: impl SqliteExecutor<'e>,
    team_id: Uuid,
    user_id: Uuid,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM team_members WHERE team_id = ? AND user_id = ?")
        .bind(team_id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete_members<'e>(
    db: impl SqliteExecutor<'e>,
    team_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM team_members WHERE team_id = ?")
        .bind(team_id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn update_member_role<'e>(
    db: impl SqliteExecutor<'e>,
    team_id: Uuid,
    user_id: Uuid,
    role: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE team_members SET role = ? WHERE team_id = ? AND user_id = ?")
        .bind(role)
        .bind(team_id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

#[derive(sqlx::FromRow)]
struct MemberUserRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    role: String,
}

/// Roster with user identity, in join order.
pub async fn list_members<'e>(
    db: impl SqliteExecutor<'e>,
    team_id: Uuid,
) -> Result<Vec<MemberView>, sqlx::Error> {
    let rows = sqlx::query_as::<_, MemberUserRow>(
        "SELECT u.id, u.first_name, u.last_name, tm.role \
         FROM team_members tm \
         JOIN users u ON u.id = tm.user_id \
         WHERE tm.team_id = ? \
         ORDER BY u.first_name, u.last_name",
    )
    .bind(team_id)
    .fetch_all(db)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| MemberView {
            user: PublicUser {
                id: row.id,
                first_name: row.first_name,
                last_name: row.last_name,
            },
            role: row.role,
        })
        .collect())
}

pub async fn member_user_ids<'e>(
    db: impl SqliteExecutor<'e>,
    team_id: Uuid,
) -> Result<Vec<Uuid>, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM team_members WHERE team_id = ?")
        .bind(team_id)
        .fetch_all(db)
        .await
}

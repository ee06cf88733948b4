//! Membership consistency engine.
//!
//! Every mutation here is atomic: the team roster and the rosters of all chats
//! owned by the team are written inside one transaction, so a concurrent
//! reader either sees none of the operation or all of it. The standing
//! invariant is that for every team chat, participants(chat) == members(team).

use chrono::Utc;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::error::{is_unique_violation, AppError, AppResult};
use crate::models::user::PublicUser;
use crate::models::{Chat, Team, TeamView};
use crate::store;

const MIN_TEAM_NAME_LEN: usize = 3;

pub struct TeamService;

impl TeamService {
    /// Create a team together with its first team chat. The creator becomes
    /// the sole initial member with role `admin` and the sole participant of
    /// the new chat.
    pub async fn create_team(
        db: &Pool<Sqlite>,
        creator_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<TeamView> {
        let name = name.trim();
        if name.chars().count() < MIN_TEAM_NAME_LEN {
            return Err(AppError::Validation(format!(
                "team name must be at least {MIN_TEAM_NAME_LEN} characters"
            )));
        }

        let now = Utc::now();
        let team = Team {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.map(str::to_string),
            created_by: creator_id,
            created_at: now,
        };
        let chat = Chat {
            id: Uuid::new_v4(),
            name: format!("Чат команды {name}"),
            is_team_chat: true,
            team_id: Some(team.id),
            created_at: now,
        };

        let mut tx = db.begin().await?;
        store::teams::create(&mut *tx, &team).await?;
        store::teams::create_member(&mut *tx, team.id, creator_id, "admin").await?;
        store::chats::create(&mut *tx, &chat).await?;
        store::chats::create_participant(&mut *tx, chat.id, creator_id, now).await?;
        tx.commit().await?;

        Self::team_view(db, team.id).await
    }

    /// Add a user (resolved by email) to the team and to every chat the team
    /// currently owns. The chat set and the membership insert share one
    /// transaction snapshot, so a concurrent chat creation or removal either
    /// fully precedes or fully follows this call.
    pub async fn add_team_member(
        db: &Pool<Sqlite>,
        actor_id: Uuid,
        team_id: Uuid,
        target_email: &str,
        role: &str,
    ) -> AppResult<TeamView> {
        let team = Self::require_team(db, team_id).await?;
        if team.created_by != actor_id {
            return Err(AppError::Permission("only the team creator can add members"));
        }

        let target = store::users::find_by_email(db, target_email)
            .await?
            .ok_or(AppError::NotFound("no user with this email"))?;

        if store::teams::find_member(db, team_id, target.id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("user is already a team member"));
        }

        let now = Utc::now();
        let mut tx = db.begin().await?;
        store::teams::create_member(&mut *tx, team_id, target.id, role)
            .await
            .map_err(|e| conflict_on_unique(e, "user is already a team member"))?;
        store::chats::create_participant_in_team_chats(&mut *tx, team_id, target.id, now)
            .await
            .map_err(|e| conflict_on_unique(e, "user is already a chat participant"))?;
        tx.commit().await?;

        Self::team_view(db, team_id).await
    }

    /// Remove a member from the team and from every chat the team owns, in
    /// one transaction. The creator can never be removed.
    pub async fn remove_team_member(
        db: &Pool<Sqlite>,
        actor_id: Uuid,
        team_id: Uuid,
        target_user_id: Uuid,
    ) -> AppResult<TeamView> {
        let team = Self::require_team(db, team_id).await?;
        if team.created_by != actor_id {
            return Err(AppError::Permission(
                "only the team creator can remove members",
            ));
        }
        if target_user_id == actor_id {
            return Err(AppError::Invariant(
                "the team creator cannot be removed from the team",
            ));
        }

        let mut tx = db.begin().await?;
        let removed = store::teams::delete_member(&mut *tx, team_id, target_user_id).await?;
        if removed == 0 {
            return Err(AppError::NotFound("user is not a member of this team"));
        }
        store::chats::delete_participant_from_team_chats(&mut *tx, team_id, target_user_id).await?;
        tx.commit().await?;

        Self::team_view(db, team_id).await
    }

    /// Role is an in-place label change; chat rosters are never touched.
    pub async fn update_member_role(
        db: &Pool<Sqlite>,
        actor_id: Uuid,
        team_id: Uuid,
        target_user_id: Uuid,
        role: &str,
    ) -> AppResult<TeamView> {
        let team = Self::require_team(db, team_id).await?;
        if team.created_by != actor_id {
            return Err(AppError::Permission("only the team creator can change roles"));
        }

        let updated = store::teams::update_member_role(db, team_id, target_user_id, role).await?;
        if updated == 0 {
            return Err(AppError::NotFound("user is not a member of this team"));
        }

        Self::team_view(db, team_id).await
    }

    /// Any current member may open an additional team chat. The full current
    /// roster is copied into the chat in the creating transaction, so the
    /// mirror invariant holds from the chat's first instant.
    pub async fn create_team_chat(
        db: &Pool<Sqlite>,
        actor_id: Uuid,
        team_id: Uuid,
        name: &str,
    ) -> AppResult<Chat> {
        Self::require_team(db, team_id).await?;
        if store::teams::find_member(db, team_id, actor_id)
            .await?
            .is_none()
        {
            return Err(AppError::Permission("you are not a member of this team"));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("chat name is required".into()));
        }

        let now = Utc::now();
        let chat = Chat {
            id: Uuid::new_v4(),
            name: name.to_string(),
            is_team_chat: true,
            team_id: Some(team_id),
            created_at: now,
        };

        let mut tx = db.begin().await?;
        store::chats::create(&mut *tx, &chat).await?;
        store::chats::create_participants_from_team(&mut *tx, chat.id, team_id, now).await?;
        tx.commit().await?;

        Ok(chat)
    }

    pub async fn update_team(
        db: &Pool<Sqlite>,
        actor_id: Uuid,
        team_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<TeamView> {
        let team = Self::require_team(db, team_id).await?;
        if team.created_by != actor_id {
            return Err(AppError::Permission(
                "only the team creator can update the team",
            ));
        }
        let name = name.trim();
        if name.chars().count() < MIN_TEAM_NAME_LEN {
            return Err(AppError::Validation(format!(
                "team name must be at least {MIN_TEAM_NAME_LEN} characters"
            )));
        }

        store::teams::update(db, team_id, name, description).await?;
        Self::team_view(db, team_id).await
    }

    /// Delete the team with an explicit ordered cascade: for every owned chat,
    /// messages then participants then the chat itself; finally members and
    /// the team row. Returns the ids of the deleted chats so their broadcast
    /// groups can be closed.
    pub async fn delete_team(
        db: &Pool<Sqlite>,
        actor_id: Uuid,
        team_id: Uuid,
    ) -> AppResult<Vec<Uuid>> {
        let team = Self::require_team(db, team_id).await?;
        if team.created_by != actor_id {
            return Err(AppError::Permission(
                "only the team creator can delete the team",
            ));
        }

        let mut tx = db.begin().await?;
        let chats = store::chats::list_for_team(&mut *tx, team_id).await?;
        for chat in &chats {
            store::messages::delete_for_chat(&mut *tx, chat.id).await?;
            store::chats::delete_participants(&mut *tx, chat.id).await?;
            store::chats::delete(&mut *tx, chat.id).await?;
        }
        store::teams::delete_members(&mut *tx, team_id).await?;
        store::teams::delete(&mut *tx, team_id).await?;
        tx.commit().await?;

        Ok(chats.into_iter().map(|c| c.id).collect())
    }

    /// Teams the user belongs to, newest first, each fully populated.
    pub async fn list_teams(db: &Pool<Sqlite>, user_id: Uuid) -> AppResult<Vec<TeamView>> {
        let teams = store::teams::list_for_user(db, user_id).await?;
        let mut views = Vec::with_capacity(teams.len());
        for team in teams {
            views.push(Self::team_view(db, team.id).await?);
        }
        Ok(views)
    }

    /// Membership doubles as visibility: a non-member gets the same NotFound
    /// as for an absent team.
    pub async fn get_team(db: &Pool<Sqlite>, user_id: Uuid, team_id: Uuid) -> AppResult<TeamView> {
        Self::require_team(db, team_id).await?;
        if store::teams::find_member(db, team_id, user_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound("team not found"));
        }
        Self::team_view(db, team_id).await
    }

    pub async fn list_team_chats(
        db: &Pool<Sqlite>,
        user_id: Uuid,
        team_id: Uuid,
    ) -> AppResult<Vec<Chat>> {
        Self::require_team(db, team_id).await?;
        if store::teams::find_member(db, team_id, user_id)
            .await?
            .is_none()
        {
            return Err(AppError::Permission("you are not a member of this team"));
        }
        Ok(store::chats::list_for_team(db, team_id).await?)
    }

    pub async fn team_view(db: &Pool<Sqlite>, team_id: Uuid) -> AppResult<TeamView> {
        let team = Self::require_team(db, team_id).await?;
        let creator = store::users::find_by_id(db, team.created_by)
            .await?
            .map(|u| PublicUser::from(&u))
            .ok_or(AppError::Internal)?;
        let members = store::teams::list_members(db, team_id).await?;
        let team_chats = store::chats::summaries_for_team(db, team_id).await?;

        Ok(TeamView {
            id: team.id,
            name: team.name,
            description: team.description,
            creator,
            created_at: team.created_at,
            members,
            team_chats,
        })
    }

    async fn require_team(db: &Pool<Sqlite>, team_id: Uuid) -> AppResult<Team> {
        store::teams::find(db, team_id)
            .await?
            .ok_or(AppError::NotFound("team not found"))
    }
}

fn conflict_on_unique(err: sqlx::Error, message: &'static str) -> AppError {
    if is_unique_violation(&err) {
        AppError::Conflict(message)
    } else {
        AppError::Database(err)
    }
}

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::guards::User;
use crate::models::{Chat, TeamView};
use crate::services::TeamService;
use crate::state::AppState;
use crate::store;

#[derive(Debug, Deserialize)]
pub struct TeamRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub email: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "member".to_string()
}

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct TeamChatRequest {
    pub name: String,
}

pub async fn create_team(
    State(state): State<AppState>,
    user: User,
    Json(req): Json<TeamRequest>,
) -> AppResult<(StatusCode, Json<TeamView>)> {
    let view =
        TeamService::create_team(&state.db, user.id, &req.name, req.description.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn list_teams(
    State(state): State<AppState>,
    user: User,
) -> AppResult<Json<Vec<TeamView>>> {
    Ok(Json(TeamService::list_teams(&state.db, user.id).await?))
}

pub async fn get_team(
    State(state): State<AppState>,
    user: User,
    Path(team_id): Path<Uuid>,
) -> AppResult<Json<TeamView>> {
    Ok(Json(TeamService::get_team(&state.db, user.id, team_id).await?))
}

pub async fn update_team(
    State(state): State<AppState>,
    user: User,
    Path(team_id): Path<Uuid>,
    Json(req): Json<TeamRequest>,
) -> AppResult<Json<TeamView>> {
    let view = TeamService::update_team(
        &state.db,
        user.id,
        team_id,
        &req.name,
        req.description.as_deref(),
    )
    .await?;
    Ok(Json(view))
}

pub async fn delete_team(
    State(state): State<AppState>,
    user: User,
    Path(team_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let chat_ids = TeamService::delete_team(&state.db, user.id, team_id).await?;
    for chat_id in chat_ids {
        state.registry.close_room(chat_id).await;
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_member(
    State(state): State<AppState>,
    user: User,
    Path(team_id): Path<Uuid>,
    Json(req): Json<AddMemberRequest>,
) -> AppResult<Json<TeamView>> {
    let view =
        TeamService::add_team_member(&state.db, user.id, team_id, &req.email, &req.role).await?;
    Ok(Json(view))
}

pub async fn remove_member(
    State(state): State<AppState>,
    user: User,
    Path((team_id, target_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<TeamView>> {
    let view = TeamService::remove_team_member(&state.db, user.id, team_id, target_id).await?;

    // Revoke live delivery after the commit: the removed user's open
    // connections must stop receiving team chat traffic immediately.
    evict_from_team_chats(&state, team_id, target_id).await;

    Ok(Json(view))
}

/// Post-commit sweep: drop the user's live connections from every chat the
/// team owns. The removal already committed, so a store error here is logged
/// rather than surfaced to the caller.
pub async fn evict_from_team_chats(state: &AppState, team_id: Uuid, user_id: Uuid) {
    match store::chats::list_for_team(&state.db, team_id).await {
        Ok(chats) => {
            for chat in chats {
                state.registry.evict_user(chat.id, user_id).await;
            }
        }
        Err(e) => {
            tracing::warn!(%team_id, %user_id, error = %e, "post-removal eviction sweep skipped")
        }
    }
}

pub async fn update_member_role(
    State(state): State<AppState>,
    user: User,
    Path((team_id, target_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<RoleRequest>,
) -> AppResult<Json<TeamView>> {
    let view =
        TeamService::update_member_role(&state.db, user.id, team_id, target_id, &req.role).await?;
    Ok(Json(view))
}

pub async fn create_team_chat(
    State(state): State<AppState>,
    user: User,
    Path(team_id): Path<Uuid>,
    Json(req): Json<TeamChatRequest>,
) -> AppResult<(StatusCode, Json<Chat>)> {
    let chat = TeamService::create_team_chat(&state.db, user.id, team_id, &req.name).await?;
    Ok((StatusCode::CREATED, Json(chat)))
}

pub async fn list_team_chats(
    State(state): State<AppState>,
    user: User,
    Path(team_id): Path<Uuid>,
) -> AppResult<Json<Vec<Chat>>> {
    Ok(Json(
        TeamService::list_team_chats(&state.db, user.id, team_id).await?,
    ))
}

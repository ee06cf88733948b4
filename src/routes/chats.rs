use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::guards::User;
use crate::models::{Chat, ChatListItem, MessageView};
use crate::services::{ChatService, MessageService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateChatRequest {
    pub name: String,
}

pub async fn create_chat(
    State(state): State<AppState>,
    user: User,
    Json(req): Json<CreateChatRequest>,
) -> AppResult<(StatusCode, Json<Chat>)> {
    let chat = ChatService::create_adhoc(&state.db, user.id, &req.name).await?;
    Ok((StatusCode::CREATED, Json(chat)))
}

pub async fn list_chats(
    State(state): State<AppState>,
    user: User,
) -> AppResult<Json<Vec<ChatListItem>>> {
    Ok(Json(ChatService::list_for_user(&state.db, user.id).await?))
}

pub async fn delete_chat(
    State(state): State<AppState>,
    user: User,
    Path(chat_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let deleted = ChatService::delete_chat(&state.db, user.id, chat_id).await?;
    state.registry.close_room(deleted).await;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn message_history(
    State(state): State<AppState>,
    user: User,
    Path(chat_id): Path<Uuid>,
) -> AppResult<Json<Vec<MessageView>>> {
    Ok(Json(
        MessageService::history(&state.db, user.id, chat_id).await?,
    ))
}

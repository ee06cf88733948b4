use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::guards::User;
use crate::models::UserProfile;
use crate::state::AppState;
use crate::store;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub email: String,
}

/// Email discovery for the add-member flow: substring match over the
/// directory, visible to any authenticated user.
pub async fn search(
    State(state): State<AppState>,
    _user: User,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<UserProfile>>> {
    let fragment = query.email.trim();
    if fragment.is_empty() {
        return Err(AppError::Validation("email query is required".into()));
    }
    Ok(Json(store::users::search_by_email(&state.db, fragment).await?))
}

pub async fn me(State(state): State<AppState>, user: User) -> AppResult<Json<UserProfile>> {
    let user = store::users::find_by_id(&state.db, user.id)
        .await?
        .ok_or(AppError::Internal)?;
    Ok(Json(UserProfile::from(&user)))
}

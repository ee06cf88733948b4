use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::auth::issue_token;
use crate::models::PublicUser;
use crate::services::AuthService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let user = AuthService::register(
        &state.db,
        &req.first_name,
        &req.last_name,
        &req.email,
        &req.password,
    )
    .await?;
    let token = issue_token(user.id, &state.config.jwt_secret, state.config.token_ttl_secs)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: PublicUser::from(&user),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = AuthService::login(&state.db, &req.email, &req.password).await?;
    let token = issue_token(user.id, &state.config.jwt_secret, state.config.token_ttl_secs)?;

    Ok(Json(AuthResponse {
        token,
        user: PublicUser::from(&user),
    }))
}

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AuthFailure};
use crate::state::AppState;
use crate::store;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
}

/// Issue a signed identity token bound to a user id and expiry.
pub fn issue_token(user_id: Uuid, secret: &str, ttl_secs: i64) -> Result<String, AppError> {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: Utc::now().timestamp() + ttl_secs,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AppError::Internal)
}

/// Validate a presented token and return the user id it is bound to. The
/// caller still has to check the user exists.
pub fn verify_token(token: &str, secret: &str) -> Result<Uuid, AuthFailure> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthFailure::Expired,
        _ => AuthFailure::Malformed,
    })?;

    Uuid::parse_str(&data.claims.sub).map_err(|_| AuthFailure::Malformed)
}

/// Bearer-token middleware: rejects the request before any domain logic runs
/// and passes the authenticated user id along in request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .ok_or(AppError::Authentication(AuthFailure::Missing))?;

    let user_id =
        verify_token(token, &state.config.jwt_secret).map_err(AppError::Authentication)?;

    // The token may outlive the account; resolve against the directory.
    store::users::find_by_id(&state.db, user_id)
        .await?
        .ok_or(AppError::Authentication(AuthFailure::UnknownUser))?;

    req.extensions_mut().insert(user_id);
    Ok(next.run(req).await)
}

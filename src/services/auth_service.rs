use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::error::{is_unique_violation, AppError, AppResult, AuthFailure};
use crate::models::User;
use crate::store;

pub struct AuthService;

impl AuthService {
    pub async fn register(
        db: &Pool<Sqlite>,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
    ) -> AppResult<User> {
        let first_name = first_name.trim();
        let last_name = last_name.trim();
        let email = email.trim();
        if first_name.is_empty() || last_name.is_empty() {
            return Err(AppError::Validation("first and last name are required".into()));
        }
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::Validation("a valid email is required".into()));
        }
        if password.is_empty() {
            return Err(AppError::Validation("password is required".into()));
        }

        let password_hash = hash(password, DEFAULT_COST).map_err(|_| AppError::Internal)?;
        let user = User {
            id: Uuid::new_v4(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            password_hash,
            created_at: Utc::now(),
        };

        store::users::create(db, &user).await.map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("email is already in use")
            } else {
                AppError::Database(e)
            }
        })?;

        Ok(user)
    }

    pub async fn login(db: &Pool<Sqlite>, email: &str, password: &str) -> AppResult<User> {
        let user = store::users::find_by_email(db, email.trim())
            .await?
            .ok_or(AppError::Authentication(AuthFailure::BadCredentials))?;

        let ok = verify(password, &user.password_hash).map_err(|_| AppError::Internal)?;
        if !ok {
            return Err(AppError::Authentication(AuthFailure::BadCredentials));
        }
        Ok(user)
    }
}

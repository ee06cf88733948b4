#![allow(dead_code)]

use chrono::Utc;
use sqlx::sqlite::SqlitePoolOptions;
use uuid::Uuid;

use teamchat_service::config::Config;
use teamchat_service::db::MIGRATOR;
use teamchat_service::models::User;
use teamchat_service::state::AppState;
use teamchat_service::store;

/// Fresh in-memory database per test. A single pooled connection keeps every
/// query on the same in-memory instance.
pub async fn test_state() -> AppState {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    MIGRATOR.run(&pool).await.expect("migrations");

    AppState::new(pool, Config::test_defaults())
}

/// Insert a user directly, skipping password hashing.
pub async fn create_user(state: &AppState, first_name: &str, last_name: &str, email: &str) -> User {
    let user = User {
        id: Uuid::new_v4(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: email.to_string(),
        password_hash: "x".to_string(),
        created_at: Utc::now(),
    };
    store::users::create(&state.db, &user).await.expect("user insert");
    user
}

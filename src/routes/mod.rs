use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::auth::auth_middleware;
use crate::state::AppState;
use crate::websocket::handlers::ws_handler;

pub mod auth;
pub mod chats;
pub mod teams;
pub mod users;

pub fn build_router(state: AppState) -> Router {
    let secured = Router::new()
        .route("/users/search", get(users::search))
        .route("/users/me", get(users::me))
        .route("/teams", post(teams::create_team).get(teams::list_teams))
        .route(
            "/teams/:team_id",
            get(teams::get_team)
                .put(teams::update_team)
                .delete(teams::delete_team),
        )
        .route("/teams/:team_id/members", post(teams::add_member))
        .route(
            "/teams/:team_id/members/:user_id",
            delete(teams::remove_member),
        )
        .route(
            "/teams/:team_id/members/:user_id/role",
            put(teams::update_member_role),
        )
        .route(
            "/teams/:team_id/chats",
            post(teams::create_team_chat).get(teams::list_team_chats),
        )
        .route("/chats", post(chats::create_chat).get(chats::list_chats))
        .route("/chats/:chat_id", delete(chats::delete_chat))
        .route("/chats/:chat_id/messages", get(chats::message_history))
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/health", get(health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/ws", get(ws_handler))
        .nest("/api", secured)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

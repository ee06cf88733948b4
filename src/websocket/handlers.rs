use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc::unbounded_channel;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{AppError, AuthFailure};
use crate::state::AppState;
use crate::store;
use crate::websocket::message_types::WsInboundEvent;
use crate::websocket::session::Session;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    token: Option<String>,
}

/// Upgrade entry point. The token travels in the `token` query parameter
/// (browser WebSocket clients cannot set headers) or an Authorization header;
/// it is validated before the upgrade completes so a bad token gets a plain
/// 401 instead of a dead socket.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let token = query
        .token
        .or_else(|| {
            headers
                .get(axum::http::header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.strip_prefix("Bearer "))
                .map(str::to_string)
        })
        .ok_or(AppError::Authentication(AuthFailure::Missing))?;

    let user_id = crate::middleware::auth::verify_token(&token, &state.config.jwt_secret)
        .map_err(AppError::Authentication)?;
    store::users::find_by_id(&state.db, user_id)
        .await?
        .ok_or(AppError::Authentication(AuthFailure::UnknownUser))?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, user_id)))
}

async fn handle_socket(socket: WebSocket, state: AppState, user_id: Uuid) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut rx) = unbounded_channel::<Message>();
    let session = Session::new(user_id, tx);
    info!(%user_id, connection_id = %session.connection_id, "websocket connected");

    loop {
        tokio::select! {
            outbound = rx.recv() => {
                match outbound {
                    Some(msg) => {
                        if ws_tx.send(msg).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
            inbound = ws_rx.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<WsInboundEvent>(&text) {
                            Ok(event) => session.handle_event(&state, event).await,
                            Err(e) => debug!(%user_id, error = %e, "ignoring unparseable frame"),
                        }
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        if ws_tx.send(Message::Pong(payload)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(%user_id, error = %e, "websocket read error");
                        break;
                    }
                }
            }
        }
    }

    session.disconnect(&state).await;
}

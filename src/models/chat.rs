use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Chat {
    pub id: Uuid,
    pub name: String,
    pub is_team_chat: bool,
    pub team_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChatSummary {
    pub id: Uuid,
    pub name: String,
    pub is_team_chat: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastMessage {
    pub text: String,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub created_at: DateTime<Utc>,
}

/// Entry in the user's chat list, newest activity first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatListItem {
    pub id: Uuid,
    pub name: String,
    pub is_team_chat: bool,
    pub last_message: Option<LastMessage>,
}

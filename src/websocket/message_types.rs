use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::MessageView;

/// Client-to-server events carried as JSON text frames.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsInboundEvent {
    /// Join a chat's broadcast group for this connection.
    Subscribe { chat_id: Uuid },
    /// Persist a message and fan it out to the room.
    Message { chat_id: Uuid, content: String },
}

/// Server-to-client events.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsOutboundEvent {
    Message { message: MessageView },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_event_parses() {
        let chat_id = Uuid::new_v4();
        let raw = format!(r#"{{"type":"subscribe","chat_id":"{chat_id}"}}"#);
        let event: WsInboundEvent = serde_json::from_str(&raw).unwrap();
        assert!(matches!(event, WsInboundEvent::Subscribe { chat_id: id } if id == chat_id));
    }

    #[test]
    fn message_event_parses() {
        let chat_id = Uuid::new_v4();
        let raw = format!(r#"{{"type":"message","chat_id":"{chat_id}","content":"hi"}}"#);
        let event: WsInboundEvent = serde_json::from_str(&raw).unwrap();
        match event {
            WsInboundEvent::Message { chat_id: id, content } => {
                assert_eq!(id, chat_id);
                assert_eq!(content, "hi");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn unknown_event_type_is_an_error() {
        assert!(serde_json::from_str::<WsInboundEvent>(r#"{"type":"typing"}"#).is_err());
    }
}

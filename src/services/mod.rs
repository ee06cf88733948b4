pub mod auth_service;
pub mod chat_service;
pub mod message_service;
pub mod team_service;

pub use auth_service::AuthService;
pub use chat_service::ChatService;
pub use message_service::MessageService;
pub use team_service::TeamService;

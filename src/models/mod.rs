pub mod chat;
pub mod message;
pub mod team;
pub mod user;

pub use chat::{Chat, ChatListItem, ChatSummary, LastMessage};
pub use message::{Message, MessageView};
pub use team::{MemberView, Team, TeamMemberRow, TeamView};
pub use user::{PublicUser, User, UserProfile};

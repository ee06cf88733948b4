//! Directory Store: thin typed accessors over the relational tables. Owns no
//! domain logic. Every function runs exactly one statement against the passed
//! executor, so callers decide the transactional scope (`pool` for standalone
//! reads, `&mut *tx` inside an engine transaction).

pub mod chats;
pub mod messages;
pub mod teams;
pub mod users;

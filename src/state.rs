use std::sync::Arc;

use sqlx::{Pool, Sqlite};

use crate::config::Config;
use crate::websocket::ConnectionRegistry;

#[derive(Clone)]
pub struct AppState {
    pub db: Pool<Sqlite>,
    pub registry: ConnectionRegistry,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: Pool<Sqlite>, config: Config) -> Self {
        Self {
            db,
            registry: ConnectionRegistry::new(),
            config: Arc::new(config),
        }
    }
}

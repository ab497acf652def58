use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::domain::KanbanError;
use crate::infrastructure::TxPolicy;
use crate::services::{BoardService, CardService};

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: Option<SqlitePool>,
    pub tx_policy: TxPolicy,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: Option<SqlitePool>, config: Arc<Config>) -> Self {
        Self {
            db,
            tx_policy: TxPolicy::from_config(&config),
            config,
        }
    }

    pub fn require_db(&self) -> Result<&SqlitePool, KanbanError> {
        self.db
            .as_ref()
            .ok_or_else(|| KanbanError::Unavailable("Database not available".into()))
    }

    pub fn cards(&self) -> Result<CardService, KanbanError> {
        Ok(CardService::new(self.require_db()?.clone(), self.tx_policy))
    }

    pub fn boards(&self) -> Result<BoardService, KanbanError> {
        Ok(BoardService::new(self.require_db()?.clone(), self.tx_policy))
    }
}

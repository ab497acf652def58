use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::domain::{Board, BoardWithCards, KanbanError};
use crate::infrastructure::{run_atomic, TxPolicy};
use crate::services::CardService;

const DEFAULT_BOARD_TITLE: &str = "Untitled board";

/// Minimal board lifecycle. Cards only need a stable board id; deleting a
/// board cascades to its cards through the foreign key.
#[derive(Debug, Clone)]
pub struct BoardService {
    pool: SqlitePool,
    policy: TxPolicy,
}

impl BoardService {
    pub fn new(pool: SqlitePool, policy: TxPolicy) -> Self {
        Self { pool, policy }
    }

    pub async fn create(&self, title: Option<String>) -> Result<Board, KanbanError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let title = title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BOARD_TITLE.into());

        let board: Board = sqlx::query_as(
            "INSERT INTO boards (id, title, created_at, updated_at) VALUES (?, ?, ?, ?) RETURNING *",
        )
        .bind(&id)
        .bind(&title)
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(board_id = board.id.as_str(), "Board created");
        Ok(board)
    }

    pub async fn find_one(&self, id: &str) -> Result<BoardWithCards, KanbanError> {
        let board: Board = sqlx::query_as("SELECT * FROM boards WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| KanbanError::NotFound(format!("Board {} not found", id)))?;

        let cards = CardService::new(self.pool.clone(), self.policy)
            .find_by_board(id)
            .await?;

        Ok(BoardWithCards { board, cards })
    }

    pub async fn update_title(&self, id: &str, title: &str) -> Result<Board, KanbanError> {
        if title.trim().is_empty() {
            return Err(KanbanError::BadRequest("Board title must not be empty".into()));
        }

        let id = id.to_string();
        let title = title.to_string();

        run_atomic(&self.pool, &self.policy, "update_board_title", move |conn| {
            Box::pin(update_title_tx(conn, id.clone(), title.clone()))
        })
        .await
    }

    pub async fn remove(&self, id: &str) -> Result<Board, KanbanError> {
        let id = id.to_string();

        let board = run_atomic(&self.pool, &self.policy, "remove_board", move |conn| {
            Box::pin(remove_tx(conn, id.clone()))
        })
        .await?;

        tracing::info!(board_id = board.id.as_str(), "Board removed");
        Ok(board)
    }
}

async fn update_title_tx(
    conn: &mut SqliteConnection,
    id: String,
    title: String,
) -> Result<Board, KanbanError> {
    sqlx::query_as("UPDATE boards SET title = ?, updated_at = ? WHERE id = ? RETURNING *")
        .bind(&title)
        .bind(Utc::now().to_rfc3339())
        .bind(&id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| KanbanError::NotFound(format!("Board {} not found", id)))
}

async fn remove_tx(conn: &mut SqliteConnection, id: String) -> Result<Board, KanbanError> {
    sqlx::query_as("DELETE FROM boards WHERE id = ? RETURNING *")
        .bind(&id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| KanbanError::NotFound(format!("Board {} not found", id)))
}

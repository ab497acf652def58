use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::domain::ordering::{self, Placement, Shift, Slot};
use crate::domain::{Card, Column, KanbanError};
use crate::infrastructure::{run_atomic, TxPolicy};

/// Card operations that keep every `(board, column)` partition ordered
/// `1..=N`. Each mutating call is a single [`run_atomic`] unit of work.
#[derive(Debug, Clone)]
pub struct CardService {
    pool: SqlitePool,
    policy: TxPolicy,
}

impl CardService {
    pub fn new(pool: SqlitePool, policy: TxPolicy) -> Self {
        Self { pool, policy }
    }

    // ── Reads ──────────────────────────────────────────────────

    pub async fn find_one(&self, id: &str) -> Result<Option<Card>, KanbanError> {
        let card = sqlx::query_as("SELECT * FROM cards WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(card)
    }

    pub async fn find_by_board(&self, board_id: &str) -> Result<Vec<Card>, KanbanError> {
        let mut cards: Vec<Card> = sqlx::query_as("SELECT * FROM cards WHERE board_id = ?")
            .bind(board_id)
            .fetch_all(&self.pool)
            .await?;

        cards.sort_by_key(|card| (card.column, card.order));
        Ok(cards)
    }

    // ── Mutations ──────────────────────────────────────────────

    /// Append a new card to the board's TODO column.
    pub async fn create(&self, board_id: &str) -> Result<Card, KanbanError> {
        let board_id = board_id.to_string();

        let card = run_atomic(&self.pool, &self.policy, "create", move |conn| {
            Box::pin(create_tx(conn, board_id.clone()))
        })
        .await?;

        tracing::info!(
            card_id = card.id.as_str(),
            board_id = card.board_id.as_str(),
            order = card.order,
            "Card created"
        );

        Ok(card)
    }

    pub async fn update_content(
        &self,
        id: &str,
        title: &str,
        description: &str,
    ) -> Result<Card, KanbanError> {
        let id = id.to_string();
        let title = title.to_string();
        let description = description.to_string();

        run_atomic(&self.pool, &self.policy, "update_content", move |conn| {
            Box::pin(update_content_tx(
                conn,
                id.clone(),
                title.clone(),
                description.clone(),
            ))
        })
        .await
    }

    /// Move a card to `new_order` within its current column.
    pub async fn reorder(&self, id: &str, new_order: i64) -> Result<Card, KanbanError> {
        let id = id.to_string();

        let card = run_atomic(&self.pool, &self.policy, "reorder", move |conn| {
            Box::pin(reorder_tx(conn, id.clone(), new_order))
        })
        .await?;

        tracing::info!(
            card_id = card.id.as_str(),
            column = %card.column,
            order = card.order,
            "Card reordered"
        );

        Ok(card)
    }

    /// Move a card to the end of `new_column`, closing the gap it leaves.
    pub async fn change_column(&self, id: &str, new_column: Column) -> Result<Card, KanbanError> {
        let id = id.to_string();

        let card = run_atomic(&self.pool, &self.policy, "change_column", move |conn| {
            Box::pin(change_column_tx(conn, id.clone(), new_column))
        })
        .await?;

        tracing::info!(
            card_id = card.id.as_str(),
            column = %card.column,
            order = card.order,
            "Card moved to column"
        );

        Ok(card)
    }

    /// Delete a card and close the gap in its column. Returns the removed card.
    pub async fn remove(&self, id: &str) -> Result<Card, KanbanError> {
        let id = id.to_string();

        let card = run_atomic(&self.pool, &self.policy, "remove", move |conn| {
            Box::pin(remove_tx(conn, id.clone()))
        })
        .await?;

        tracing::info!(
            card_id = card.id.as_str(),
            column = %card.column,
            order = card.order,
            "Card removed"
        );

        Ok(card)
    }
}

// ── Units of work ──────────────────────────────────────────────

async fn create_tx(conn: &mut SqliteConnection, board_id: String) -> Result<Card, KanbanError> {
    ensure_board(conn, &board_id).await?;

    let snapshot = fetch_partition(conn, &board_id, Column::Todo, None).await?;
    let slots: Vec<Slot<'_>> = snapshot.iter().map(Slot::from).collect();
    let placement = ordering::append(Column::Todo, &slots);

    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    let card: Card = sqlx::query_as(
        r#"INSERT INTO cards (id, board_id, "column", "order", created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?) RETURNING *"#,
    )
    .bind(&id)
    .bind(&board_id)
    .bind(placement.column)
    .bind(placement.order)
    .bind(&now)
    .bind(&now)
    .fetch_one(&mut *conn)
    .await?;

    Ok(card)
}

async fn update_content_tx(
    conn: &mut SqliteConnection,
    id: String,
    title: String,
    description: String,
) -> Result<Card, KanbanError> {
    fetch_card(conn, &id).await?;

    let card: Card = sqlx::query_as(
        "UPDATE cards SET title = ?, description = ?, updated_at = ? WHERE id = ? RETURNING *",
    )
    .bind(&title)
    .bind(&description)
    .bind(Utc::now().to_rfc3339())
    .bind(&id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(card)
}

async fn reorder_tx(
    conn: &mut SqliteConnection,
    id: String,
    new_order: i64,
) -> Result<Card, KanbanError> {
    let card = fetch_card(conn, &id).await?;
    let others = fetch_partition(conn, &card.board_id, card.column, Some(&card.id)).await?;
    let slots: Vec<Slot<'_>> = others.iter().map(Slot::from).collect();

    let plan = ordering::reorder(card.column, card.order, &slots, new_order)?;
    if plan.shifts.is_empty() && plan.placement.order == card.order {
        return Ok(card);
    }

    let now = Utc::now().to_rfc3339();
    apply_shifts(conn, &plan.shifts, &now).await?;
    place_card(conn, &card.id, plan.placement, &now).await
}

async fn change_column_tx(
    conn: &mut SqliteConnection,
    id: String,
    new_column: Column,
) -> Result<Card, KanbanError> {
    let card = fetch_card(conn, &id).await?;
    let source_rest = fetch_partition(conn, &card.board_id, card.column, Some(&card.id)).await?;
    let target = if new_column == card.column {
        source_rest.clone()
    } else {
        fetch_partition(conn, &card.board_id, new_column, Some(&card.id)).await?
    };

    let source_slots: Vec<Slot<'_>> = source_rest.iter().map(Slot::from).collect();
    let target_slots: Vec<Slot<'_>> = target.iter().map(Slot::from).collect();
    let plan = ordering::move_to_column(card.order, &source_slots, new_column, &target_slots);

    let now = Utc::now().to_rfc3339();
    apply_shifts(conn, &plan.shifts, &now).await?;
    place_card(conn, &card.id, plan.placement, &now).await
}

async fn remove_tx(conn: &mut SqliteConnection, id: String) -> Result<Card, KanbanError> {
    let card = fetch_card(conn, &id).await?;
    let rest = fetch_partition(conn, &card.board_id, card.column, Some(&card.id)).await?;
    let slots: Vec<Slot<'_>> = rest.iter().map(Slot::from).collect();
    let shifts = ordering::remove(card.order, &slots);

    sqlx::query("DELETE FROM cards WHERE id = ?")
        .bind(&card.id)
        .execute(&mut *conn)
        .await?;

    apply_shifts(conn, &shifts, &Utc::now().to_rfc3339()).await?;

    Ok(card)
}

// ── Transaction-scoped helpers ─────────────────────────────────

async fn fetch_card(conn: &mut SqliteConnection, id: &str) -> Result<Card, KanbanError> {
    sqlx::query_as("SELECT * FROM cards WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| KanbanError::NotFound(format!("Card {} not found", id)))
}

async fn ensure_board(conn: &mut SqliteConnection, board_id: &str) -> Result<(), KanbanError> {
    let exists: Option<(String,)> = sqlx::query_as("SELECT id FROM boards WHERE id = ?")
        .bind(board_id)
        .fetch_optional(&mut *conn)
        .await?;

    match exists {
        Some(_) => Ok(()),
        None => Err(KanbanError::NotFound(format!(
            "Board {} not found",
            board_id
        ))),
    }
}

/// Cards in one `(board, column)` partition, optionally without `exclude`.
async fn fetch_partition(
    conn: &mut SqliteConnection,
    board_id: &str,
    column: Column,
    exclude: Option<&str>,
) -> Result<Vec<Card>, KanbanError> {
    let cards: Vec<Card> = sqlx::query_as(
        r#"SELECT * FROM cards WHERE board_id = ? AND "column" = ? AND id != ? ORDER BY "order" ASC"#,
    )
    .bind(board_id)
    .bind(column)
    .bind(exclude.unwrap_or_default())
    .fetch_all(&mut *conn)
    .await?;

    Ok(cards)
}

async fn apply_shifts(
    conn: &mut SqliteConnection,
    shifts: &[Shift],
    now: &str,
) -> Result<(), KanbanError> {
    for shift in shifts {
        sqlx::query(r#"UPDATE cards SET "order" = "order" + ?, updated_at = ? WHERE id = ?"#)
            .bind(shift.delta)
            .bind(now)
            .bind(&shift.card_id)
            .execute(&mut *conn)
            .await?;
    }

    if !shifts.is_empty() {
        tracing::debug!(count = shifts.len(), "Applied order shifts");
    }

    Ok(())
}

async fn place_card(
    conn: &mut SqliteConnection,
    id: &str,
    placement: Placement,
    now: &str,
) -> Result<Card, KanbanError> {
    let card: Card = sqlx::query_as(
        r#"UPDATE cards SET "column" = ?, "order" = ?, updated_at = ? WHERE id = ? RETURNING *"#,
    )
    .bind(placement.column)
    .bind(placement.order)
    .bind(now)
    .bind(id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(card)
}

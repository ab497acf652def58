use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::Row;

use crate::domain::ordering::is_contiguous;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub async fn init_db(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let connect_options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(connect_options)
        .await?;

    MIGRATOR.run(&pool).await?;

    tracing::info!("Database initialized with WAL mode enabled");

    Ok(pool)
}

pub async fn verify_wal_mode(pool: &SqlitePool) -> Result<String, sqlx::Error> {
    let row = sqlx::query("PRAGMA journal_mode").fetch_one(pool).await?;

    Ok(row.get::<String, _>(0))
}

/// A `(board, column)` partition whose orders are not `1..=N`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokenPartition {
    pub board_id: String,
    pub column: String,
    pub orders: Vec<i64>,
}

/// Scan every partition and report the ones that violate contiguity.
pub async fn audit_partitions(pool: &SqlitePool) -> Result<Vec<BrokenPartition>, sqlx::Error> {
    let rows = sqlx::query(r#"SELECT board_id, "column", "order" FROM cards"#)
        .fetch_all(pool)
        .await?;

    let mut partitions: BTreeMap<(String, String), Vec<i64>> = BTreeMap::new();
    for row in rows {
        partitions
            .entry((row.get("board_id"), row.get("column")))
            .or_default()
            .push(row.get("order"));
    }

    Ok(partitions
        .into_iter()
        .filter(|(_, orders)| !is_contiguous(orders.iter().copied()))
        .map(|((board_id, column), mut orders)| {
            orders.sort_unstable();
            BrokenPartition {
                board_id,
                column,
                orders,
            }
        })
        .collect())
}

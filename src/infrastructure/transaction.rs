//! Atomic units of work against the card store.
//!
//! Each mutating card operation runs as one read-compute-write cycle inside a
//! single SQLite transaction. The database runs in WAL mode, so a transaction
//! that read a partition and then tries to write after another writer has
//! committed fails with `SQLITE_BUSY_SNAPSHOT` instead of writing against a
//! stale snapshot. Those failures are retried here with a fresh transaction;
//! every other error is returned to the caller untouched.

use std::time::Duration;

use futures::future::BoxFuture;
use rand::Rng;
use sqlx::{SqliteConnection, SqlitePool};

use crate::config::Config;
use crate::domain::KanbanError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub base_backoff: Duration,
    /// Bound on the whole unit of work, retries included.
    pub timeout: Duration,
}

impl TxPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_retries: config.tx_max_retries,
            base_backoff: config.tx_backoff(),
            timeout: config.tx_timeout(),
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let base = self.base_backoff.as_millis() as u64;
        let exp = base.saturating_mul(1u64 << attempt.min(10));
        let jitter = if base == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=base)
        };
        Duration::from_millis(exp.saturating_add(jitter))
    }
}

impl Default for TxPolicy {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Run `work` inside a transaction and commit it.
///
/// If `work` fails the transaction is rolled back and the error returned.
/// Conflicts with concurrent writers re-run `work` from scratch up to
/// `policy.max_retries` times before surfacing [`KanbanError::Conflict`].
pub async fn run_atomic<T, F>(
    pool: &SqlitePool,
    policy: &TxPolicy,
    op: &'static str,
    mut work: F,
) -> Result<T, KanbanError>
where
    T: Send,
    F: for<'c> FnMut(&'c mut SqliteConnection) -> BoxFuture<'c, Result<T, KanbanError>> + Send,
{
    match tokio::time::timeout(policy.timeout, retry(pool, policy, op, &mut work)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::error!(op, timeout = ?policy.timeout, "Unit of work timed out");
            Err(KanbanError::Unavailable(format!(
                "{} timed out after {:?}",
                op, policy.timeout
            )))
        }
    }
}

async fn retry<T, F>(
    pool: &SqlitePool,
    policy: &TxPolicy,
    op: &'static str,
    work: &mut F,
) -> Result<T, KanbanError>
where
    T: Send,
    F: for<'c> FnMut(&'c mut SqliteConnection) -> BoxFuture<'c, Result<T, KanbanError>> + Send,
{
    let mut attempt = 0;
    loop {
        match attempt_once(pool, work).await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_conflict() => {
                if attempt >= policy.max_retries {
                    tracing::error!(op, attempts = attempt + 1, error = %err, "Giving up after repeated conflicts");
                    return Err(KanbanError::Conflict(format!(
                        "{} conflicted with concurrent writers {} times",
                        op,
                        attempt + 1
                    )));
                }
                let delay = policy.backoff(attempt);
                tracing::warn!(op, attempt = attempt + 1, ?delay, error = %err, "Transaction conflict, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

async fn attempt_once<T, F>(pool: &SqlitePool, work: &mut F) -> Result<T, KanbanError>
where
    F: for<'c> FnMut(&'c mut SqliteConnection) -> BoxFuture<'c, Result<T, KanbanError>>,
{
    let mut tx = pool.begin().await.map_err(storage_error)?;
    // Dropping `tx` on the error path rolls the transaction back.
    let value = work(&mut *tx).await?;
    tx.commit().await?;
    Ok(value)
}

fn storage_error(err: sqlx::Error) -> KanbanError {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            KanbanError::Unavailable(err.to_string())
        }
        other => KanbanError::Database(other),
    }
}

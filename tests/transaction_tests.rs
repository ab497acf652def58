mod common;

use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Connection, SqliteConnection};

use kanban_cards::domain::KanbanError;
use kanban_cards::infrastructure::{run_atomic, TxPolicy};

use common::setup_test_db;

fn policy(max_retries: u32, timeout: Duration) -> TxPolicy {
    TxPolicy {
        max_retries,
        base_backoff: Duration::from_millis(1),
        timeout,
    }
}

async fn board_count(pool: &sqlx::SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM boards")
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn insert_board(conn: &mut SqliteConnection) -> Result<(), KanbanError> {
    sqlx::query("INSERT INTO boards (id, title, created_at, updated_at) VALUES ('b1', 'Board', 'now', 'now')")
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn insert_board_then_fail(conn: &mut SqliteConnection) -> Result<(), KanbanError> {
    insert_board(conn).await?;
    Err(KanbanError::NotFound("Card missing not found".into()))
}

async fn conflict_until(calls: Arc<AtomicU32>, succeed_on: u32) -> Result<u32, KanbanError> {
    let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
    if call >= succeed_on {
        Ok(call)
    } else {
        Err(KanbanError::Conflict("concurrent writer".into()))
    }
}

async fn sleep_for(delay: Duration) -> Result<(), KanbanError> {
    tokio::time::sleep(delay).await;
    Ok(())
}

#[tokio::test]
async fn committed_work_is_visible() {
    let db = setup_test_db().await;

    run_atomic(&db.pool, &policy(0, Duration::from_secs(5)), "insert", |conn| {
        Box::pin(insert_board(conn))
    })
    .await
    .unwrap();

    assert_eq!(board_count(&db.pool).await, 1);
}

#[tokio::test]
async fn failed_work_is_rolled_back() {
    let db = setup_test_db().await;

    let result = run_atomic(
        &db.pool,
        &policy(3, Duration::from_secs(5)),
        "insert_then_fail",
        |conn| Box::pin(insert_board_then_fail(conn)),
    )
    .await;

    assert!(matches!(result, Err(KanbanError::NotFound(_))));
    assert_eq!(board_count(&db.pool).await, 0);
}

#[tokio::test]
async fn conflicts_are_retried_until_exhausted() {
    let db = setup_test_db().await;
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);

    let result = run_atomic(
        &db.pool,
        &policy(3, Duration::from_secs(5)),
        "always_conflicts",
        move |_conn| Box::pin(conflict_until(Arc::clone(&counter), u32::MAX)),
    )
    .await;

    assert_eq!(calls.load(Ordering::SeqCst), 4);
    match result {
        Err(KanbanError::Conflict(msg)) => {
            assert!(msg.contains("always_conflicts"));
            assert!(msg.contains("4 times"));
        }
        other => panic!("expected Conflict, got {:?}", other),
    }
}

#[tokio::test]
async fn conflict_then_success_returns_value() {
    let db = setup_test_db().await;
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);

    let value = run_atomic(
        &db.pool,
        &policy(5, Duration::from_secs(5)),
        "settles",
        move |_conn| Box::pin(conflict_until(Arc::clone(&counter), 3)),
    )
    .await
    .unwrap();

    assert_eq!(value, 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn non_conflict_errors_are_not_retried() {
    let db = setup_test_db().await;
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);

    let result = run_atomic(
        &db.pool,
        &policy(5, Duration::from_secs(5)),
        "not_found",
        move |_conn| {
            let counter = Arc::clone(&counter);
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(KanbanError::NotFound("Card x not found".into()))
            })
        },
    )
    .await;

    assert!(matches!(result, Err(KanbanError::NotFound(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn slow_work_times_out_as_unavailable() {
    let db = setup_test_db().await;

    let result = run_atomic(
        &db.pool,
        &policy(0, Duration::from_millis(50)),
        "slow",
        |_conn| Box::pin(sleep_for(Duration::from_secs(1))),
    )
    .await;

    match result {
        Err(KanbanError::Unavailable(msg)) => assert!(msg.contains("slow timed out")),
        other => panic!("expected Unavailable, got {:?}", other),
    }
}

#[tokio::test]
async fn locked_database_error_is_a_conflict() {
    let db = setup_test_db().await;
    let options = SqliteConnectOptions::from_str(&db.url)
        .unwrap()
        .busy_timeout(Duration::ZERO);

    let mut holder = SqliteConnection::connect_with(&options).await.unwrap();
    let mut writer = SqliteConnection::connect_with(&options).await.unwrap();

    sqlx::query("BEGIN IMMEDIATE")
        .execute(&mut holder)
        .await
        .unwrap();

    let err = sqlx::query(
        "INSERT INTO boards (id, title, created_at, updated_at) VALUES ('b2', 'Board', 'now', 'now')",
    )
    .execute(&mut writer)
    .await
    .expect_err("write should fail while another connection holds the write lock");

    assert!(KanbanError::from(err).is_conflict());

    sqlx::query("ROLLBACK").execute(&mut holder).await.unwrap();
}

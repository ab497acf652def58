#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;

use kanban_cards::api::{create_router, AppState};
use kanban_cards::config::Config;
use kanban_cards::domain::ordering::is_contiguous;
use kanban_cards::domain::{Card, Column};
use kanban_cards::infrastructure::db;
use kanban_cards::infrastructure::TxPolicy;
use kanban_cards::services::{BoardService, CardService};

/// A WAL database on disk so that pooled connections share state.
pub struct TestDb {
    pub pool: SqlitePool,
    pub url: String,
    _dir: TempDir,
}

pub async fn setup_test_db() -> TestDb {
    let dir = TempDir::new().expect("temporary directory should be created");
    let url = format!("sqlite:{}", dir.path().join("kanban.db").display());
    let pool = db::init_db(&url, 8)
        .await
        .expect("Failed to create test database");

    TestDb {
        pool,
        url,
        _dir: dir,
    }
}

pub fn test_policy() -> TxPolicy {
    TxPolicy {
        max_retries: 50,
        base_backoff: Duration::from_millis(1),
        timeout: Duration::from_secs(30),
    }
}

pub fn services(pool: &SqlitePool) -> (BoardService, CardService) {
    (
        BoardService::new(pool.clone(), test_policy()),
        CardService::new(pool.clone(), test_policy()),
    )
}

pub fn test_app(pool: &SqlitePool) -> Router {
    let config = Arc::new(Config {
        database_url: "sqlite::memory:".to_string(),
        cors_origin: "http://localhost:5173".to_string(),
        ..Config::default()
    });
    let mut state = AppState::new(Some(pool.clone()), Arc::clone(&config));
    state.tx_policy = test_policy();
    create_router(state, &config)
}

pub async fn make_request(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<String>,
) -> (StatusCode, String) {
    let mut request = Request::builder().uri(uri).method(method);

    if body.is_some() {
        request = request.header("content-type", "application/json");
    }

    let request = request
        .body(Body::from(body.unwrap_or_default()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body_str = String::from_utf8(body.to_vec()).unwrap();

    (status, body_str)
}

/// Card ids of one column, in order.
pub fn column_ids(cards: &[Card], column: Column) -> Vec<String> {
    let mut in_column: Vec<&Card> = cards.iter().filter(|c| c.column == column).collect();
    in_column.sort_by_key(|c| c.order);
    in_column.into_iter().map(|c| c.id.clone()).collect()
}

pub fn order_of(cards: &[Card], id: &str) -> i64 {
    cards
        .iter()
        .find(|c| c.id == id)
        .map(|c| c.order)
        .expect("card should exist")
}

pub fn assert_partitions_contiguous(cards: &[Card]) {
    let mut partitions: BTreeMap<(&str, Column), Vec<i64>> = BTreeMap::new();
    for card in cards {
        partitions
            .entry((card.board_id.as_str(), card.column))
            .or_default()
            .push(card.order);
    }
    for ((board_id, column), orders) in partitions {
        assert!(
            is_contiguous(orders.iter().copied()),
            "partition {}/{} is not contiguous: {:?}",
            board_id,
            column,
            orders
        );
    }
}

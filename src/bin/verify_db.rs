use kanban_cards::infrastructure::db;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let database_url = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| "sqlite:kanban.db".into());

    let pool = db::init_db(&database_url, 1).await?;

    let journal_mode = db::verify_wal_mode(&pool).await?;
    println!("Journal mode: {}", journal_mode);

    let card_count: i64 = sqlx::query_scalar("SELECT count(*) FROM cards")
        .fetch_one(&pool)
        .await?;
    println!("Card count: {}", card_count);

    let broken = db::audit_partitions(&pool).await?;
    if broken.is_empty() {
        println!("All partitions are ordered 1..N");
        return Ok(());
    }

    for partition in &broken {
        println!(
            "Broken partition board={} column={} orders={:?}",
            partition.board_id, partition.column, partition.orders
        );
    }
    anyhow::bail!("{} partition(s) violate contiguous ordering", broken.len())
}

mod models;

pub use models::*;

use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;

pub type DbPool = Arc<PgPool>;

pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(Arc::new(pool))
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn save_scan_result(
    pool: &PgPool,
    user_id: &str,
    image_url: &str,
    is_ai: bool,
    confidence: f64,
    raw_result: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO scan_results (user_id, image_url, is_ai, confidence, raw_result)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(user_id)
    .bind(image_url)
    .bind(is_ai)
    .bind(confidence)
    .bind(raw_result)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_scan_history(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<ScanRecord>, sqlx::Error> {
    sqlx::query_as::<_, ScanRecord>(
        "SELECT * FROM scan_results WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn count_scans_since(
    pool: &PgPool,
    user_id: &str,
    since: DateTime<Utc>,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM scan_results WHERE user_id = $1 AND created_at >= $2",
    )
    .bind(user_id)
    .bind(since)
    .fetch_one(pool)
    .await
}

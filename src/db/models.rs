use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, FromRow, Serialize, Deserialize)]
pub struct ScanRecord {
    pub id: i32,
    pub user_id: String,
    pub image_url: String,
    pub is_ai: bool,
    pub confidence: f64,
    pub raw_result: String,
    pub created_at: DateTime<Utc>,
}

use crate::config::Config;
use crate::db::DbPool;
use crate::quota::GuestQuotaGate;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<Config>,
    pub guest_quota: Arc<GuestQuotaGate>,
}

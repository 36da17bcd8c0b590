use async_trait::async_trait;
use chrono::{Datelike, TimeZone, Utc};
use std::collections::HashSet;
use std::sync::Mutex;

use crate::db::{count_scans_since, DbPool};

/// Scan-allowance check, selected by whether the request carries a signed-in
/// identity or an anonymous guest id.
#[async_trait]
pub trait QuotaGate: Send + Sync {
    async fn allow(&self, identity: &str) -> Result<bool, String>;
    async fn record(&self, identity: &str) -> Result<(), String>;
}

/// One free scan per anonymous guest id, tracked in process memory. This is
/// the server-side counterpart of the original client's local usage flag:
/// best-effort, reset on restart.
#[derive(Default)]
pub struct GuestQuotaGate {
    used: Mutex<HashSet<String>>,
}

#[async_trait]
impl QuotaGate for GuestQuotaGate {
    async fn allow(&self, identity: &str) -> Result<bool, String> {
        let used = self.used.lock().map_err(|e| e.to_string())?;
        Ok(!used.contains(identity))
    }

    async fn record(&self, identity: &str) -> Result<(), String> {
        let mut used = self.used.lock().map_err(|e| e.to_string())?;
        used.insert(identity.to_string());
        Ok(())
    }
}

/// Monthly allowance for signed-in users, counted from persisted scan history.
pub struct MemberQuotaGate {
    pool: DbPool,
    monthly_limit: i64,
}

impl MemberQuotaGate {
    pub fn new(pool: DbPool, monthly_limit: i64) -> Self {
        Self { pool, monthly_limit }
    }
}

#[async_trait]
impl QuotaGate for MemberQuotaGate {
    async fn allow(&self, identity: &str) -> Result<bool, String> {
        if self.monthly_limit <= 0 {
            return Ok(true);
        }

        let now = Utc::now();
        let month_start = Utc
            .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
            .single()
            .unwrap_or(now);

        let used = count_scans_since(self.pool.as_ref(), identity, month_start)
            .await
            .map_err(|e| e.to_string())?;
        Ok(used < self.monthly_limit)
    }

    // The persisted scan row is the usage record; nothing extra to write.
    async fn record(&self, _identity: &str) -> Result<(), String> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn guest_gets_exactly_one_scan() {
        let gate = GuestQuotaGate::default();
        assert!(gate.allow("guest-a").await.unwrap());
        gate.record("guest-a").await.unwrap();
        assert!(!gate.allow("guest-a").await.unwrap());
    }

    #[tokio::test]
    async fn guest_ids_are_independent() {
        let gate = GuestQuotaGate::default();
        gate.record("guest-a").await.unwrap();
        assert!(gate.allow("guest-b").await.unwrap());
    }

    #[tokio::test]
    async fn recording_twice_is_harmless() {
        let gate = GuestQuotaGate::default();
        gate.record("guest-a").await.unwrap();
        gate.record("guest-a").await.unwrap();
        assert!(!gate.allow("guest-a").await.unwrap());
    }
}

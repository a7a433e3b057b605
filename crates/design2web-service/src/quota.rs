//! Per-user daily generation quota
//!
//! Usage is stored as `{last_date, count}` per user. A record from an
//! earlier day counts as zero. Only design generations consume quota;
//! modifications are free.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::{Result, ServiceError};

/// Stored usage record for one user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyUsage {
    pub last_date: NaiveDate,
    pub count: u32,
}

impl DailyUsage {
    fn count_on(&self, today: NaiveDate) -> u32 {
        if self.last_date == today {
            self.count
        } else {
            0
        }
    }
}

/// Backing store for usage records
#[async_trait]
pub trait UsageStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Option<DailyUsage>;

    async fn set(&self, user_id: &str, usage: DailyUsage);
}

/// Process-local usage store
#[derive(Debug, Default)]
pub struct InMemoryUsageStore {
    entries: RwLock<HashMap<String, DailyUsage>>,
}

impl InMemoryUsageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UsageStore for InMemoryUsageStore {
    async fn get(&self, user_id: &str) -> Option<DailyUsage> {
        self.entries.read().get(user_id).copied()
    }

    async fn set(&self, user_id: &str, usage: DailyUsage) {
        self.entries.write().insert(user_id.to_string(), usage);
    }
}

/// Quota state as reported to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaStatus {
    pub used: u32,
    pub limit: u32,
    pub remaining: u32,
}

impl QuotaStatus {
    fn new(used: u32, limit: u32) -> Self {
        Self {
            used,
            limit,
            remaining: limit.saturating_sub(used),
        }
    }

    pub fn exceeded(&self) -> bool {
        self.used >= self.limit
    }
}

/// Enforces the daily limit against a [`UsageStore`]
pub struct QuotaGuard {
    store: Arc<dyn UsageStore>,
    limit: u32,
    /// Serializes read-modify-write on the store
    update_lock: Mutex<()>,
}

impl QuotaGuard {
    pub fn new(store: Arc<dyn UsageStore>, limit: u32) -> Self {
        Self {
            store,
            limit,
            update_lock: Mutex::new(()),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Current usage for `user_id` on `today`
    pub async fn status(&self, user_id: &str, today: NaiveDate) -> QuotaStatus {
        let used = self
            .store
            .get(user_id)
            .await
            .map_or(0, |usage| usage.count_on(today));
        QuotaStatus::new(used, self.limit)
    }

    /// Consume one generation, or fail with [`ServiceError::QuotaExceeded`].
    pub async fn try_consume(&self, user_id: &str, today: NaiveDate) -> Result<QuotaStatus> {
        let _guard = self.update_lock.lock().await;
        let used = self
            .store
            .get(user_id)
            .await
            .map_or(0, |usage| usage.count_on(today));

        if used >= self.limit {
            log::info!("User {} hit the daily limit of {}", user_id, self.limit);
            return Err(ServiceError::QuotaExceeded { limit: self.limit });
        }

        let usage = DailyUsage {
            last_date: today,
            count: used + 1,
        };
        self.store.set(user_id, usage).await;
        log::debug!("User {} usage {}/{}", user_id, usage.count, self.limit);
        Ok(QuotaStatus::new(usage.count, self.limit))
    }
}

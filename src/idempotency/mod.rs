use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

pub mod in_memory;
pub mod store_redis;

/// Value held in the slot while a request for the key is in flight.
pub const PROCESSING: &str = "processing";

pub fn entry_key(idempotency_key: &str) -> String {
    format!("idem:{}", idempotency_key)
}

#[derive(Debug, Clone, Copy)]
pub struct IdempotencyTtl {
    pub lock: Duration,
    pub result: Duration,
}

impl Default for IdempotencyTtl {
    fn default() -> Self {
        Self {
            lock: Duration::from_secs(30 * 60),
            result: Duration::from_secs(30 * 60),
        }
    }
}

/// One slot per key: `"processing"` while locked, then the payment id.
#[async_trait]
pub trait IdempotencyStore: Send + Sync {
    /// Set-if-absent. True only for the first caller within the lock TTL.
    async fn try_acquire(&self, key: &str) -> Result<bool>;

    /// Overwrites the slot with the final payment id and refreshes the TTL.
    async fn set_result(&self, key: &str, payment_id: &str) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Option<String>>;
}

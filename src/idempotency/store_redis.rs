use crate::idempotency::{entry_key, IdempotencyStore, IdempotencyTtl, PROCESSING};
use anyhow::Result;
use redis::AsyncCommands;

#[derive(Clone)]
pub struct RedisIdempotencyStore {
    pub client: redis::Client,
    pub ttl: IdempotencyTtl,
}

impl RedisIdempotencyStore {
    pub fn new(client: redis::Client, ttl: IdempotencyTtl) -> Self {
        Self { client, ttl }
    }
}

#[async_trait::async_trait]
impl IdempotencyStore for RedisIdempotencyStore {
    async fn try_acquire(&self, key: &str) -> Result<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let reply: Option<String> = redis::cmd("SET")
            .arg(entry_key(key))
            .arg(PROCESSING)
            .arg("NX")
            .arg("EX")
            .arg(self.ttl.lock.as_secs().max(1))
            .query_async(&mut conn)
            .await?;
        Ok(reply.is_some())
    }

    async fn set_result(&self, key: &str, payment_id: &str) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn
            .set_ex(entry_key(key), payment_id, self.ttl.result.as_secs().max(1))
            .await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let val: Option<String> = conn.get(entry_key(key)).await?;
        Ok(val)
    }
}

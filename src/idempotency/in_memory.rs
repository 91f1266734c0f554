use crate::idempotency::{entry_key, IdempotencyStore, IdempotencyTtl, PROCESSING};
use anyhow::Result;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::time::Instant;

#[derive(Default)]
pub struct InMemoryIdempotencyStore {
    slots: DashMap<String, (String, Instant)>,
    ttl: IdempotencyTtl,
}

impl InMemoryIdempotencyStore {
    pub fn new(ttl: IdempotencyTtl) -> Self {
        Self {
            slots: DashMap::new(),
            ttl,
        }
    }
}

#[async_trait::async_trait]
impl IdempotencyStore for InMemoryIdempotencyStore {
    async fn try_acquire(&self, key: &str) -> Result<bool> {
        let now = Instant::now();
        let value = (PROCESSING.to_string(), now + self.ttl.lock);
        match self.slots.entry(entry_key(key)) {
            Entry::Occupied(mut slot) => {
                if slot.get().1 > now {
                    return Ok(false);
                }
                slot.insert(value);
                Ok(true)
            }
            Entry::Vacant(slot) => {
                slot.insert(value);
                Ok(true)
            }
        }
    }

    async fn set_result(&self, key: &str, payment_id: &str) -> Result<()> {
        self.slots.insert(
            entry_key(key),
            (payment_id.to_string(), Instant::now() + self.ttl.result),
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        let k = entry_key(key);
        let live = self
            .slots
            .get(&k)
            .filter(|slot| slot.1 > now)
            .map(|slot| slot.0.clone());
        if live.is_none() {
            self.slots.remove_if(&k, |_, slot| slot.1 <= now);
        }
        Ok(live)
    }
}

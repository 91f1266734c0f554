use crate::domain::payment::{Payment, PaymentPage, PaymentStatus};
use crate::domain::routing_decision::RoutingDecisionRecord;
use crate::store::{DecisionStore, PaymentStore, SearchFilter, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct PaymentTable {
    rows: HashMap<Uuid, Payment>,
    by_key: HashMap<String, Uuid>,
}

/// Process-local payment table. The uniqueness check and the insert happen
/// under one write lock, matching a database unique constraint.
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    table: Arc<RwLock<PaymentTable>>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.table.read().await.rows.len()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn insert_pending(&self, payment: &Payment) -> Result<(), StoreError> {
        let mut table = self.table.write().await;
        if table.by_key.contains_key(&payment.idempotency_key) {
            return Err(StoreError::DuplicateIdempotencyKey(
                payment.idempotency_key.clone(),
            ));
        }
        table
            .by_key
            .insert(payment.idempotency_key.clone(), payment.id);
        table.rows.insert(payment.id, payment.clone());
        Ok(())
    }

    async fn finalize(
        &self,
        id: Uuid,
        status: PaymentStatus,
        provider: &str,
        message: Option<&str>,
    ) -> anyhow::Result<Option<Payment>> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&id) {
            Some(row) if row.status == PaymentStatus::Pending => {
                row.status = status;
                row.provider = provider.to_string();
                row.message = message.map(str::to_string);
                Ok(Some(row.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn find_by_idempotency_key(&self, key: &str) -> anyhow::Result<Option<Payment>> {
        let table = self.table.read().await;
        Ok(table
            .by_key
            .get(key)
            .and_then(|id| table.rows.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Payment>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn search(&self, filter: &SearchFilter) -> anyhow::Result<PaymentPage> {
        let table = self.table.read().await;
        let mut matched: Vec<&Payment> = table
            .rows
            .values()
            .filter(|p| filter.status.map_or(true, |s| p.status == s))
            .filter(|p| {
                filter.query.as_deref().map_or(true, |q| {
                    p.idempotency_key.to_lowercase().contains(q)
                        || p.provider.to_lowercase().contains(q)
                })
            })
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let size = filter.size.max(1);
        let items = matched
            .iter()
            .skip(filter.page as usize * size as usize)
            .take(size as usize)
            .map(|p| (*p).clone())
            .collect();

        Ok(PaymentPage {
            items,
            page: filter.page,
            size,
            total: matched.len() as u64,
        })
    }
}

#[derive(Default, Clone)]
pub struct InMemoryDecisionStore {
    decisions: Arc<RwLock<HashMap<Uuid, Vec<RoutingDecisionRecord>>>>,
}

impl InMemoryDecisionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DecisionStore for InMemoryDecisionStore {
    async fn append(&self, decision: &RoutingDecisionRecord) -> anyhow::Result<()> {
        self.decisions
            .write()
            .await
            .entry(decision.payment_id)
            .or_default()
            .push(decision.clone());
        Ok(())
    }

    async fn list_for_payment(&self, payment_id: Uuid) -> anyhow::Result<Vec<RoutingDecisionRecord>> {
        let mut rows = self
            .decisions
            .read()
            .await
            .get(&payment_id)
            .cloned()
            .unwrap_or_default();
        // stable: equal timestamps keep append order
        rows.sort_by(|a, b| a.decided_at.cmp(&b.decided_at));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::CreatePaymentRequest;

    fn req(key: &str) -> CreatePaymentRequest {
        CreatePaymentRequest {
            amount: 100,
            currency: "EUR".to_string(),
            idempotency_key: key.to_string(),
        }
    }

    #[tokio::test]
    async fn duplicate_key_is_rejected_distinguishably() {
        let store = InMemoryPaymentStore::new();
        store.insert_pending(&Payment::pending(&req("K1"), "stripe")).await.unwrap();
        let err = store
            .insert_pending(&Payment::pending(&req("K1"), "mockpsp"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateIdempotencyKey(k) if k == "K1"));
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn finalize_applies_once() {
        let store = InMemoryPaymentStore::new();
        let p = Payment::pending(&req("K2"), "stripe");
        store.insert_pending(&p).await.unwrap();

        let done = store
            .finalize(p.id, PaymentStatus::Succeeded, "stripe", Some("ok"))
            .await
            .unwrap();
        assert_eq!(done.unwrap().status, PaymentStatus::Succeeded);

        let again = store
            .finalize(p.id, PaymentStatus::Failed, "stripe", None)
            .await
            .unwrap();
        assert!(again.is_none());
        let row = store.find_by_id(p.id).await.unwrap().unwrap();
        assert_eq!(row.status, PaymentStatus::Succeeded);
    }

    #[tokio::test]
    async fn search_filters_and_paginates() {
        let store = InMemoryPaymentStore::new();
        for i in 0..5 {
            let mut p = Payment::pending(&req(&format!("order-{i}")), "stripe");
            p.created_at = chrono::Utc::now() + chrono::Duration::seconds(i);
            store.insert_pending(&p).await.unwrap();
        }
        let mut other = Payment::pending(&req("refund-1"), "mockpsp");
        other.created_at = chrono::Utc::now() - chrono::Duration::seconds(30);
        store.insert_pending(&other).await.unwrap();

        let page = store
            .search(&SearchFilter {
                query: Some("order".to_string()),
                status: None,
                page: 0,
                size: 2,
            })
            .await
            .unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].idempotency_key, "order-4");

        let by_provider = store
            .search(&SearchFilter {
                query: Some("mockpsp".to_string()),
                status: Some(PaymentStatus::Pending),
                page: 0,
                size: 30,
            })
            .await
            .unwrap();
        assert_eq!(by_provider.total, 1);
    }
}

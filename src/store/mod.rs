use crate::domain::payment::{Payment, PaymentPage, PaymentStatus};
use crate::domain::routing_decision::RoutingDecisionRecord;
use async_trait::async_trait;
use uuid::Uuid;

pub mod in_memory;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("a payment with idempotency key {0} already exists")]
    DuplicateIdempotencyKey(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    /// Lower-cased substring matched against idempotency key and provider.
    pub query: Option<String>,
    pub status: Option<PaymentStatus>,
    pub page: u32,
    pub size: u32,
}

/// Payment rows keyed by id, unique on `idempotency_key`.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn insert_pending(&self, payment: &Payment) -> Result<(), StoreError>;

    /// Moves a `Pending` row to its terminal state. Returns `None` when the
    /// row is missing or already terminal.
    async fn finalize(
        &self,
        id: Uuid,
        status: PaymentStatus,
        provider: &str,
        message: Option<&str>,
    ) -> anyhow::Result<Option<Payment>>;

    async fn find_by_idempotency_key(&self, key: &str) -> anyhow::Result<Option<Payment>>;

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Payment>>;

    /// Newest first.
    async fn search(&self, filter: &SearchFilter) -> anyhow::Result<PaymentPage>;
}

/// Append-only routing decision log.
#[async_trait]
pub trait DecisionStore: Send + Sync {
    async fn append(&self, decision: &RoutingDecisionRecord) -> anyhow::Result<()>;

    /// Oldest first.
    async fn list_for_payment(&self, payment_id: Uuid) -> anyhow::Result<Vec<RoutingDecisionRecord>>;
}

use crate::domain::routing_decision::RoutingDecisionRecord;
use crate::store::DecisionStore;
use anyhow::Result;
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Clone)]
pub struct RoutingDecisionsRepo {
    pub pool: PgPool,
}

impl RoutingDecisionsRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DecisionStore for RoutingDecisionsRepo {
    async fn append(&self, decision: &RoutingDecisionRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO routing_decisions (id, payment_id, chosen_provider, reason, decided_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(decision.id)
        .bind(decision.payment_id)
        .bind(&decision.chosen_provider)
        .bind(&decision.reason)
        .bind(decision.decided_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_for_payment(&self, payment_id: Uuid) -> Result<Vec<RoutingDecisionRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, payment_id, chosen_provider, reason, decided_at
            FROM routing_decisions
            WHERE payment_id = $1
            ORDER BY decided_at ASC, seq ASC
            "#,
        )
        .bind(payment_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| RoutingDecisionRecord {
                id: r.get("id"),
                payment_id: r.get("payment_id"),
                chosen_provider: r.get("chosen_provider"),
                reason: r.get("reason"),
                decided_at: r.get("decided_at"),
            })
            .collect())
    }
}

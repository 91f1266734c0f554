use crate::domain::payment::{Payment, PaymentPage, PaymentStatus};
use crate::store::{PaymentStore, SearchFilter, StoreError};
use anyhow::anyhow;
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct PaymentsRepo {
    pub pool: PgPool,
}

impl PaymentsRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_payment(r: &PgRow) -> anyhow::Result<Payment> {
    let status: String = r.get("status");
    Ok(Payment {
        id: r.get("id"),
        amount: r.get("amount_minor"),
        currency: r.get("currency"),
        status: PaymentStatus::parse(&status)
            .ok_or_else(|| anyhow!("unknown payment status {}", status))?,
        provider: r.get("provider"),
        message: r.get("message"),
        idempotency_key: r.get("idempotency_key"),
        created_at: r.get("created_at"),
    })
}

#[async_trait]
impl PaymentStore for PaymentsRepo {
    async fn insert_pending(&self, payment: &Payment) -> Result<(), StoreError> {
        let res = sqlx::query(
            r#"
            INSERT INTO payments (
                id, amount_minor, currency, status, provider, message, idempotency_key, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(payment.id)
        .bind(payment.amount)
        .bind(&payment.currency)
        .bind(payment.status.as_str())
        .bind(&payment.provider)
        .bind(&payment.message)
        .bind(&payment.idempotency_key)
        .bind(payment.created_at)
        .execute(&self.pool)
        .await;

        match res {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => Err(
                StoreError::DuplicateIdempotencyKey(payment.idempotency_key.clone()),
            ),
            Err(e) => Err(StoreError::Other(e.into())),
        }
    }

    async fn finalize(
        &self,
        id: Uuid,
        status: PaymentStatus,
        provider: &str,
        message: Option<&str>,
    ) -> anyhow::Result<Option<Payment>> {
        let row = sqlx::query(
            r#"
            UPDATE payments
            SET status = $2, provider = $3, message = $4
            WHERE id = $1 AND status = 'PENDING'
            RETURNING id, amount_minor, currency, status, provider, message, idempotency_key, created_at
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(provider)
        .bind(message)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_payment).transpose()
    }

    async fn find_by_idempotency_key(&self, key: &str) -> anyhow::Result<Option<Payment>> {
        let row = sqlx::query(
            r#"
            SELECT id, amount_minor, currency, status, provider, message, idempotency_key, created_at
            FROM payments
            WHERE idempotency_key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_payment).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Payment>> {
        let row = sqlx::query(
            r#"
            SELECT id, amount_minor, currency, status, provider, message, idempotency_key, created_at
            FROM payments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_payment).transpose()
    }

    async fn search(&self, filter: &SearchFilter) -> anyhow::Result<PaymentPage> {
        let pattern = filter.query.as_ref().map(|q| format!("%{}%", q));
        let status = filter.status.map(|s| s.as_str());
        let size = filter.size.max(1);
        let offset = i64::from(filter.page) * i64::from(size);

        let rows = sqlx::query(
            r#"
            SELECT id, amount_minor, currency, status, provider, message, idempotency_key, created_at
            FROM payments
            WHERE ($1::TEXT IS NULL OR LOWER(idempotency_key) LIKE $1 OR LOWER(provider) LIKE $1)
              AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(&pattern)
        .bind(status)
        .bind(i64::from(size))
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM payments
            WHERE ($1::TEXT IS NULL OR LOWER(idempotency_key) LIKE $1 OR LOWER(provider) LIKE $1)
              AND ($2::TEXT IS NULL OR status = $2)
            "#,
        )
        .bind(&pattern)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        let items = rows
            .iter()
            .map(row_to_payment)
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(PaymentPage {
            items,
            page: filter.page,
            size,
            total: total.max(0) as u64,
        })
    }
}

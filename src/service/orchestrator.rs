use crate::circuit::guard::{guarded_charge, CallOutcome, GuardedCall};
use crate::circuit::registry::CircuitBreakerRegistry;
use crate::domain::payment::{CreatePaymentRequest, Payment, PaymentPage, PaymentSearch, PaymentStatus};
use crate::domain::routing_decision::RoutingDecisionRecord;
use crate::gateways::ChargeRequest;
use crate::idempotency::{IdempotencyStore, PROCESSING};
use crate::metrics::collector::MetricsCollector;
use crate::metrics::event::ErrorTag;
use crate::router::provider_router::{Decision, FailoverChoice, ProviderRouter};
use crate::store::{DecisionStore, PaymentStore, SearchFilter, StoreError};
use anyhow::anyhow;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Latency charged to a provider's stats for a transport failure or rejection.
pub const TRANSPORT_FAILURE_PENALTY_MS: u64 = 5000;
pub const ABANDONED_MESSAGE: &str = "processing abandoned";
pub const BUDGET_EXHAUSTED_MESSAGE: &str = "request budget exhausted before failover";

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("{message}")]
    Validation { code: &'static str, message: String },
    #[error("a request with this idempotency key is still being processed")]
    InProgress,
    #[error("payment {0} not found")]
    NotFound(Uuid),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for PaymentError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Other(inner) => PaymentError::Internal(inner),
            dup => PaymentError::Internal(anyhow!(dup)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub gateway_timeout: Duration,
    pub request_budget: Duration,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            gateway_timeout: Duration::from_millis(2500),
            request_budget: Duration::from_millis(5000),
        }
    }
}

#[derive(Clone)]
pub struct PaymentOrchestrator {
    router: Arc<ProviderRouter>,
    breakers: Arc<CircuitBreakerRegistry>,
    idempotency: Arc<dyn IdempotencyStore>,
    payments: Arc<dyn PaymentStore>,
    decisions: Arc<dyn DecisionStore>,
    metrics: Arc<MetricsCollector>,
    settings: OrchestratorSettings,
}

impl PaymentOrchestrator {
    pub fn new(
        router: Arc<ProviderRouter>,
        breakers: Arc<CircuitBreakerRegistry>,
        idempotency: Arc<dyn IdempotencyStore>,
        payments: Arc<dyn PaymentStore>,
        decisions: Arc<dyn DecisionStore>,
        metrics: Arc<MetricsCollector>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            router,
            breakers,
            idempotency,
            payments,
            decisions,
            metrics,
            settings,
        }
    }

    /// Processes a payment at most once per idempotency key. Provider
    /// failures end up in the returned payment's status and message; only
    /// validation, an in-flight duplicate and store failures are errors.
    pub async fn process(&self, req: CreatePaymentRequest) -> Result<Payment, PaymentError> {
        validate_request(&req)?;
        let started = Instant::now();
        let key = req.idempotency_key.clone();

        if let Some(existing) = self.payments.find_by_idempotency_key(&key).await? {
            return self.replay(existing).await;
        }

        if !self.idempotency.try_acquire(&key).await? {
            return match self.payments.find_by_idempotency_key(&key).await? {
                Some(existing) => self.replay(existing).await,
                None => Err(PaymentError::InProgress),
            };
        }

        let primary = self.router.choose_provider();
        let pending = Payment::pending(&req, &primary.provider);
        match self.payments.insert_pending(&pending).await {
            Ok(()) => {}
            Err(StoreError::DuplicateIdempotencyKey(_)) => {
                tracing::info!(idempotency_key = %key, "lost insert race, returning existing payment");
                return self
                    .payments
                    .find_by_idempotency_key(&key)
                    .await?
                    .ok_or_else(|| anyhow!("payment for key {} vanished after duplicate insert", key).into());
            }
            Err(e) => return Err(e.into()),
        }

        self.decisions
            .append(&RoutingDecisionRecord::new(pending.id, &primary.provider, &primary.reason))
            .await?;
        tracing::info!(
            payment_id = %pending.id,
            provider = %primary.provider,
            reason = %primary.reason,
            "primary provider chosen"
        );

        let charge = ChargeRequest {
            amount_minor: req.amount,
            currency: req.currency.clone(),
            idempotency_key: key.clone(),
        };
        let deadline = started + self.settings.request_budget;

        let call = self.invoke(&primary, &charge, deadline).await;
        let (status, provider, message) = match call.outcome {
            CallOutcome::Approved { message } => (PaymentStatus::Succeeded, primary.provider.clone(), message),
            CallOutcome::Declined { message } => {
                self.metrics.record_error(ErrorTag::PrimaryDecline);
                self.metrics.record_error(ErrorTag::PrimaryDeclineNoFailover);
                (PaymentStatus::Failed, primary.provider.clone(), message)
            }
            CallOutcome::TransportFailure { error, .. } => {
                self.metrics.record_error(ErrorTag::PrimaryException);
                self.fail_over(pending.id, &primary, &error, &charge, deadline).await?
            }
        };

        let done = self.finish(pending.id, status, &provider, message.as_deref()).await?;
        self.idempotency.set_result(&key, &done.id.to_string()).await?;
        tracing::info!(
            payment_id = %done.id,
            provider = %done.provider,
            status = done.status.as_str(),
            "payment finalised"
        );
        Ok(done)
    }

    pub async fn get(&self, payment_id: Uuid) -> Result<Payment, PaymentError> {
        self.payments
            .find_by_id(payment_id)
            .await?
            .ok_or(PaymentError::NotFound(payment_id))
    }

    pub async fn search(&self, search: &PaymentSearch) -> Result<PaymentPage, PaymentError> {
        let (query, status) = search.normalized();
        let filter = SearchFilter {
            query,
            status,
            page: search.page,
            size: search.page_size(),
        };
        Ok(self.payments.search(&filter).await?)
    }

    pub async fn decisions(&self, payment_id: Uuid) -> Result<Vec<RoutingDecisionRecord>, PaymentError> {
        Ok(self.decisions.list_for_payment(payment_id).await?)
    }

    /// A row that already exists for the key. Terminal rows are returned as
    /// they are. A pending row is either still owned by an in-flight request
    /// or was left behind by one that died before finishing.
    async fn replay(&self, existing: Payment) -> Result<Payment, PaymentError> {
        if existing.status.is_terminal() {
            return Ok(existing);
        }
        match self.idempotency.get(&existing.idempotency_key).await?.as_deref() {
            Some(PROCESSING) => Err(PaymentError::InProgress),
            _ => {
                tracing::warn!(payment_id = %existing.id, "pending payment without a live lock, marking abandoned");
                let done = self
                    .finish(existing.id, PaymentStatus::Failed, &existing.provider, Some(ABANDONED_MESSAGE))
                    .await?;
                self.idempotency
                    .set_result(&existing.idempotency_key, &done.id.to_string())
                    .await?;
                Ok(done)
            }
        }
    }

    async fn fail_over(
        &self,
        payment_id: Uuid,
        primary: &Decision,
        error: &str,
        charge: &ChargeRequest,
        deadline: Instant,
    ) -> Result<(PaymentStatus, String, Option<String>), PaymentError> {
        let alternate = match self.router.choose_provider_excluding(&primary.provider) {
            FailoverChoice::Alternate(decision) => decision,
            FailoverChoice::NoAlternative(_) => {
                self.metrics.record_error(ErrorTag::PrimaryDeclineNoFailover);
                tracing::warn!(%payment_id, provider = %primary.provider, %error, "no alternate provider");
                return Ok((
                    PaymentStatus::Failed,
                    primary.provider.clone(),
                    Some(format!("Primary provider ({}) failed: {}", primary.provider, error)),
                ));
            }
        };

        if Instant::now() >= deadline {
            self.metrics.record_error(ErrorTag::PrimaryDeclineNoFailover);
            tracing::warn!(%payment_id, provider = %primary.provider, "request budget spent, skipping failover");
            return Ok((
                PaymentStatus::Failed,
                primary.provider.clone(),
                Some(BUDGET_EXHAUSTED_MESSAGE.to_string()),
            ));
        }

        self.metrics.inc_failover();
        let reason = format!("failover:{}", alternate.reason);
        self.decisions
            .append(&RoutingDecisionRecord::new(payment_id, &alternate.provider, &reason))
            .await?;
        tracing::info!(
            %payment_id,
            from = %primary.provider,
            to = %alternate.provider,
            %error,
            "failing over"
        );

        let call = self.invoke(&alternate, charge, deadline).await;
        let result = match call.outcome {
            CallOutcome::Approved { message } => (PaymentStatus::Succeeded, alternate.provider, message),
            CallOutcome::Declined { message } => {
                self.metrics.record_error(ErrorTag::SecondaryDecline);
                (PaymentStatus::Failed, alternate.provider, message)
            }
            CallOutcome::TransportFailure { error, .. } => {
                self.metrics.record_error(ErrorTag::SecondaryException);
                let message = format!("Failover provider ({}) failed: {}", alternate.provider, error);
                (PaymentStatus::Failed, alternate.provider, Some(message))
            }
        };
        Ok(result)
    }

    /// One guarded call, bounded by the per-call timeout and what is left of
    /// the request budget. Stats are reported for every attempt.
    async fn invoke(&self, decision: &Decision, charge: &ChargeRequest, deadline: Instant) -> GuardedCall {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let timeout = self.settings.gateway_timeout.min(remaining);
        let call = guarded_charge(&self.breakers, decision.gateway.as_ref(), charge, timeout).await;

        match &call.outcome {
            CallOutcome::Approved { .. } => self.router.report(&decision.provider, true, call.latency_ms),
            CallOutcome::Declined { .. } => self.router.report(&decision.provider, false, call.latency_ms),
            CallOutcome::TransportFailure { error, rejected } => {
                tracing::warn!(provider = %decision.provider, rejected, %error, "provider call failed");
                self.router
                    .report(&decision.provider, false, TRANSPORT_FAILURE_PENALTY_MS)
            }
        }
        call
    }

    /// Terminal update. If another request got there first, its row wins.
    async fn finish(
        &self,
        id: Uuid,
        status: PaymentStatus,
        provider: &str,
        message: Option<&str>,
    ) -> Result<Payment, PaymentError> {
        if let Some(done) = self.payments.finalize(id, status, provider, message).await? {
            return Ok(done);
        }
        self.payments
            .find_by_id(id)
            .await?
            .ok_or_else(|| anyhow!("payment {} disappeared before finalisation", id).into())
    }
}

fn validate_request(req: &CreatePaymentRequest) -> Result<(), PaymentError> {
    if req.amount < 1 {
        return Err(PaymentError::Validation {
            code: "INVALID_AMOUNT",
            message: "amount must be at least 1".to_string(),
        });
    }
    if req.currency.trim().is_empty() {
        return Err(PaymentError::Validation {
            code: "INVALID_CURRENCY",
            message: "currency must not be blank".to_string(),
        });
    }
    if req.idempotency_key.trim().is_empty() {
        return Err(PaymentError::Validation {
            code: "MISSING_IDEMPOTENCY_KEY",
            message: "idempotencyKey is required".to_string(),
        });
    }
    Ok(())
}

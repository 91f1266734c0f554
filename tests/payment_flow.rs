use payflow_router::config::{AppConfig, StorageBackend};
use payflow_router::domain::payment::{CreatePaymentRequest, Payment, PaymentStatus};
use payflow_router::gateways::mock::{FaultConfig, MockPspGateway, MockPspState};
use payflow_router::gateways::stripe::StripeStubGateway;
use payflow_router::gateways::PaymentGateway;
use payflow_router::idempotency::in_memory::InMemoryIdempotencyStore;
use payflow_router::idempotency::IdempotencyStore;
use payflow_router::metrics::event::ErrorTag;
use payflow_router::circuit::state::CircuitOverride;
use payflow_router::service::orchestrator::{PaymentError, ABANDONED_MESSAGE, BUDGET_EXHAUSTED_MESSAGE};
use payflow_router::store::in_memory::{InMemoryDecisionStore, InMemoryPaymentStore};
use payflow_router::store::PaymentStore;
use payflow_router::{AppState, Stores};
use std::sync::Arc;
use std::time::Duration;

struct Harness {
    state: AppState,
    payments: Arc<InMemoryPaymentStore>,
    idempotency: Arc<InMemoryIdempotencyStore>,
}

fn harness_with(cfg: AppConfig) -> Harness {
    let mockpsp = MockPspState::new();
    let stripe: Arc<dyn PaymentGateway> = Arc::new(StripeStubGateway);
    let mock: Arc<dyn PaymentGateway> = Arc::new(
        MockPspGateway::new(mockpsp.clone()).with_timeout_delay(Duration::from_millis(20)),
    );

    let payments = Arc::new(InMemoryPaymentStore::new());
    let idempotency = Arc::new(InMemoryIdempotencyStore::new(cfg.idempotency_ttl()));
    let stores = Stores {
        idempotency: idempotency.clone(),
        payments: payments.clone(),
        decisions: Arc::new(InMemoryDecisionStore::new()),
    };
    let state = AppState::build(&cfg, vec![stripe, mock], mockpsp, stores).unwrap();
    Harness {
        state,
        payments,
        idempotency,
    }
}

fn harness() -> Harness {
    harness_with(AppConfig {
        storage_backend: StorageBackend::Memory,
        ..AppConfig::default()
    })
}

fn req(key: &str) -> CreatePaymentRequest {
    CreatePaymentRequest {
        amount: 100,
        currency: "EUR".to_string(),
        idempotency_key: key.to_string(),
    }
}

async fn set_faults(h: &Harness, failure_rate: f64, force_timeout: bool) {
    h.state
        .mockpsp
        .set(FaultConfig {
            failure_rate,
            add_latency_ms: 0,
            force_timeout,
        })
        .await;
}

#[tokio::test]
async fn healthy_providers_route_to_the_cheaper_one() {
    let h = harness();
    let p = h.state.orchestrator.process(req("K1")).await.unwrap();

    assert_eq!(p.status, PaymentStatus::Succeeded);
    assert_eq!(p.provider, "mockpsp");
    assert_eq!(p.message.as_deref(), Some("Mock approved"));

    let decisions = h.state.orchestrator.decisions(p.id).await.unwrap();
    assert_eq!(decisions.len(), 1);
    assert_eq!(decisions[0].reason, "score=0.480");
}

#[tokio::test]
async fn down_provider_is_skipped() {
    let h = harness();
    h.state.health.set("stripe", false);
    set_faults(&h, 0.0, false).await;

    let p = h.state.orchestrator.process(req("K2")).await.unwrap();
    assert_eq!(p.status, PaymentStatus::Succeeded);
    assert_eq!(p.provider, "mockpsp");
}

#[tokio::test]
async fn decline_is_terminal_and_never_fails_over() {
    let h = harness();
    h.state.health.set("STRIPE", false);
    set_faults(&h, 1.0, false).await;

    let p = h.state.orchestrator.process(req("K3")).await.unwrap();
    assert_eq!(p.status, PaymentStatus::Failed);
    assert_eq!(p.provider, "mockpsp");
    assert_eq!(p.message.as_deref(), Some("Mock decline"));

    let metrics = &h.state.metrics;
    assert_eq!(metrics.error_count(ErrorTag::PrimaryDeclineNoFailover), 1);
    assert_eq!(metrics.error_count(ErrorTag::PrimaryDecline), 1);
    assert_eq!(metrics.failover_count(), 0);
    assert_eq!(h.state.orchestrator.decisions(p.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn decline_does_not_fail_over_even_with_a_healthy_alternate() {
    let h = harness();
    set_faults(&h, 1.0, false).await;

    let p = h.state.orchestrator.process(req("K3b")).await.unwrap();
    assert_eq!(p.status, PaymentStatus::Failed);
    assert_eq!(p.provider, "mockpsp");
    assert_eq!(h.state.metrics.failover_count(), 0);
    assert_eq!(h.state.orchestrator.decisions(p.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn transport_failure_fails_over_once() {
    let h = harness();
    set_faults(&h, 0.0, true).await;

    let p = h.state.orchestrator.process(req("K4")).await.unwrap();
    assert_eq!(p.status, PaymentStatus::Succeeded);
    assert_eq!(p.provider, "stripe");
    assert_eq!(p.message.as_deref(), Some("Stripe approved"));
    assert_eq!(h.state.metrics.failover_count(), 1);
    assert_eq!(h.state.metrics.error_count(ErrorTag::PrimaryException), 1);

    let decisions = h.state.orchestrator.decisions(p.id).await.unwrap();
    assert_eq!(decisions.len(), 2);
    assert_eq!(decisions[0].chosen_provider, "mockpsp");
    assert_eq!(decisions[1].chosen_provider, "stripe");
    assert!(decisions[1].reason.starts_with("failover:score="));

    // the failed attempt is charged the transport penalty
    let stat = h.state.stats.get("mockpsp");
    assert_eq!(stat.fail_count, 1);
    assert_eq!(stat.latencies.back(), Some(&5000));
}

#[tokio::test]
async fn transport_failure_without_alternate_fails_with_explanation() {
    let h = harness();
    h.state.health.set("stripe", false);
    set_faults(&h, 0.0, true).await;

    let p = h.state.orchestrator.process(req("K4b")).await.unwrap();
    assert_eq!(p.status, PaymentStatus::Failed);
    assert_eq!(p.provider, "mockpsp");
    assert_eq!(
        p.message.as_deref(),
        Some("Primary provider (mockpsp) failed: MockPSP forced timeout")
    );
    assert_eq!(h.state.metrics.failover_count(), 0);
    assert_eq!(h.state.metrics.error_count(ErrorTag::PrimaryDeclineNoFailover), 1);
    assert_eq!(h.state.orchestrator.decisions(p.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn breaker_rejection_is_treated_as_transport_failure() {
    let h = harness();
    h.state
        .breakers
        .set_override("mockpsp", Some(CircuitOverride::ForceOpen));

    let p = h.state.orchestrator.process(req("K4c")).await.unwrap();
    assert_eq!(p.status, PaymentStatus::Succeeded);
    assert_eq!(p.provider, "stripe");
    assert_eq!(h.state.metrics.failover_count(), 1);
}

#[tokio::test]
async fn both_attempts_failing_records_secondary_tag() {
    let h = harness();
    h.state
        .breakers
        .set_override("stripe", Some(CircuitOverride::ForceOpen));
    set_faults(&h, 0.0, true).await;

    let p = h.state.orchestrator.process(req("K4d")).await.unwrap();
    assert_eq!(p.status, PaymentStatus::Failed);
    assert_eq!(p.provider, "stripe");
    assert_eq!(h.state.metrics.error_count(ErrorTag::SecondaryException), 1);
    assert_eq!(h.state.metrics.failover_count(), 1);
}

#[tokio::test]
async fn exhausted_budget_skips_failover() {
    let h = harness_with(AppConfig {
        storage_backend: StorageBackend::Memory,
        request_budget_ms: 10,
        ..AppConfig::default()
    });
    set_faults(&h, 0.0, true).await;

    let p = h.state.orchestrator.process(req("K4e")).await.unwrap();
    assert_eq!(p.status, PaymentStatus::Failed);
    assert_eq!(p.provider, "mockpsp");
    assert_eq!(p.message.as_deref(), Some(BUDGET_EXHAUSTED_MESSAGE));
    assert_eq!(h.state.metrics.failover_count(), 0);
    assert_eq!(h.state.metrics.error_count(ErrorTag::PrimaryDeclineNoFailover), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_submissions_converge_on_one_payment() {
    let h = harness();
    let mut handles = Vec::new();
    for _ in 0..16 {
        let orchestrator = h.state.orchestrator.clone();
        handles.push(tokio::spawn(async move { orchestrator.process(req("K5")).await }));
    }

    let mut winners: Vec<Payment> = Vec::new();
    for handle in handles {
        match handle.await.unwrap() {
            Ok(p) => winners.push(p),
            Err(PaymentError::InProgress) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(h.payments.count().await, 1);
    assert!(!winners.is_empty());
    let first = winners[0].id;
    assert!(winners.iter().all(|p| p.id == first));

    let replay = h.state.orchestrator.process(req("K5")).await.unwrap();
    assert_eq!(replay.id, first);
    assert_eq!(replay.status, PaymentStatus::Succeeded);
}

#[tokio::test]
async fn replay_returns_the_stored_result_without_a_new_call() {
    let h = harness();
    let first = h.state.orchestrator.process(req("K6")).await.unwrap();
    let second = h.state.orchestrator.process(req("K6")).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.status, second.status);
    assert_eq!(h.state.stats.get("mockpsp").success_count, 1);
    assert_eq!(
        h.idempotency.get("K6").await.unwrap(),
        Some(first.id.to_string())
    );
}

#[tokio::test]
async fn pending_row_with_live_lock_is_in_progress() {
    let h = harness();
    assert!(h.idempotency.try_acquire("K7").await.unwrap());
    h.payments
        .insert_pending(&Payment::pending(&req("K7"), "mockpsp"))
        .await
        .unwrap();

    let err = h.state.orchestrator.process(req("K7")).await.unwrap_err();
    assert!(matches!(err, PaymentError::InProgress));
}

#[tokio::test]
async fn held_lock_without_row_is_in_progress() {
    let h = harness();
    assert!(h.idempotency.try_acquire("K8").await.unwrap());

    let err = h.state.orchestrator.process(req("K8")).await.unwrap_err();
    assert!(matches!(err, PaymentError::InProgress));
    assert_eq!(h.payments.count().await, 0);
}

#[tokio::test]
async fn pending_row_without_lock_is_finalised_as_abandoned() {
    let h = harness();
    let orphan = Payment::pending(&req("K9"), "mockpsp");
    h.payments.insert_pending(&orphan).await.unwrap();

    let p = h.state.orchestrator.process(req("K9")).await.unwrap();
    assert_eq!(p.id, orphan.id);
    assert_eq!(p.status, PaymentStatus::Failed);
    assert_eq!(p.message.as_deref(), Some(ABANDONED_MESSAGE));
    assert_eq!(h.idempotency.get("K9").await.unwrap(), Some(orphan.id.to_string()));
}

#[tokio::test]
async fn invalid_request_never_reaches_routing() {
    let h = harness();
    let mut bad = req("K10");
    bad.amount = 0;

    let err = h.state.orchestrator.process(bad).await.unwrap_err();
    assert!(matches!(err, PaymentError::Validation { code: "INVALID_AMOUNT", .. }));
    assert_eq!(h.payments.count().await, 0);
    assert!(h.idempotency.get("K10").await.unwrap().is_none());
}

#[tokio::test]
async fn all_down_degrades_to_the_designated_primary() {
    let h = harness();
    h.state.health.set("stripe", false);
    h.state.health.set("mockpsp", false);

    let p = h.state.orchestrator.process(req("K11")).await.unwrap();
    assert_eq!(p.provider, "stripe");
    let decisions = h.state.orchestrator.decisions(p.id).await.unwrap();
    assert_eq!(decisions[0].reason, "all-down-degrade");
}

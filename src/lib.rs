pub mod config;
pub mod domain {
    pub mod payment;
    pub mod routing_decision;
}
pub mod gateways;
pub mod http {
    pub mod error;
    pub mod extract;
    pub mod handlers {
        pub mod circuit_breaker;
        pub mod gateways;
        pub mod metrics;
        pub mod ops;
        pub mod payments;
        pub mod routing_decisions;
        pub mod scoring_debug;
    }
    pub mod middleware {
        pub mod correlation;
    }
    pub mod routes;
}
pub mod idempotency;
pub mod metrics {
    pub mod collector;
    pub mod event;
    pub mod window;
}
pub mod registry {
    pub mod health;
    pub mod stats;
}
pub mod repo {
    pub mod payments_repo;
    pub mod routing_decisions_repo;
}
pub mod router {
    pub mod provider_router;
}
pub mod scoring {
    pub mod engine;
    pub mod metrics_reader;
    pub mod types;
}
pub mod circuit {
    pub mod evaluator;
    pub mod guard;
    pub mod registry;
    pub mod state;
    pub mod transitions;
}
pub mod service {
    pub mod orchestrator;
}
pub mod store;

use circuit::registry::CircuitBreakerRegistry;
use config::AppConfig;
use gateways::mock::MockPspState;
use gateways::{GatewaySet, PaymentGateway};
use idempotency::in_memory::InMemoryIdempotencyStore;
use idempotency::IdempotencyStore;
use metrics::collector::MetricsCollector;
use registry::health::ProviderHealthRegistry;
use registry::stats::ProviderStatsRegistry;
use router::provider_router::ProviderRouter;
use service::orchestrator::PaymentOrchestrator;
use std::sync::Arc;
use store::in_memory::{InMemoryDecisionStore, InMemoryPaymentStore};
use store::{DecisionStore, PaymentStore};

/// Persistence adapters behind the orchestrator.
#[derive(Clone)]
pub struct Stores {
    pub idempotency: Arc<dyn IdempotencyStore>,
    pub payments: Arc<dyn PaymentStore>,
    pub decisions: Arc<dyn DecisionStore>,
}

impl Stores {
    pub fn in_memory(cfg: &AppConfig) -> Self {
        Self {
            idempotency: Arc::new(InMemoryIdempotencyStore::new(cfg.idempotency_ttl())),
            payments: Arc::new(InMemoryPaymentStore::new()),
            decisions: Arc::new(InMemoryDecisionStore::new()),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<PaymentOrchestrator>,
    pub router: Arc<ProviderRouter>,
    pub health: Arc<ProviderHealthRegistry>,
    pub stats: Arc<ProviderStatsRegistry>,
    pub breakers: Arc<CircuitBreakerRegistry>,
    pub metrics: Arc<MetricsCollector>,
    pub mockpsp: MockPspState,
    pub pool: Option<sqlx::PgPool>,
    pub redis_client: Option<redis::Client>,
}

impl AppState {
    /// Wires the registries, router and orchestrator around the given
    /// providers. The first provider is the all-down fallback.
    pub fn build(
        cfg: &AppConfig,
        providers: Vec<Arc<dyn PaymentGateway>>,
        mockpsp: MockPspState,
        stores: Stores,
    ) -> anyhow::Result<Self> {
        let gateways = GatewaySet::new(providers)?;
        let health = Arc::new(ProviderHealthRegistry::new(gateways.names()));
        let stats = Arc::new(ProviderStatsRegistry::new());
        let breakers = Arc::new(CircuitBreakerRegistry::new(cfg.circuit.clone()));
        let metrics = Arc::new(MetricsCollector::new());
        let router = Arc::new(ProviderRouter::new(gateways, health.clone(), stats.clone()));

        let orchestrator = Arc::new(PaymentOrchestrator::new(
            router.clone(),
            breakers.clone(),
            stores.idempotency,
            stores.payments,
            stores.decisions,
            metrics.clone(),
            cfg.orchestrator_settings(),
        ));

        Ok(Self {
            orchestrator,
            router,
            health,
            stats,
            breakers,
            metrics,
            mockpsp,
            pool: None,
            redis_client: None,
        })
    }
}

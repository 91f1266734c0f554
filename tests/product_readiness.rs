use axum::body::Body;
use axum::http::{Request, StatusCode};
use payflow_router::config::{AppConfig, StorageBackend};
use payflow_router::gateways::default_providers;
use payflow_router::gateways::mock::MockPspState;
use payflow_router::http::routes::app;
use payflow_router::{AppState, Stores};
use tower::ServiceExt;

#[test]
fn config_defaults_are_stable() {
    let cfg = AppConfig::default();
    assert_eq!(cfg.gateway_timeout_ms, 2500);
    assert_eq!(cfg.request_budget_ms, 5000);
    assert_eq!(cfg.idempotency_ttl().lock.as_secs(), 1800);
    assert_eq!(cfg.idempotency_ttl().result.as_secs(), 1800);
    assert_eq!(cfg.circuit.window_size, 20);
    assert_eq!(cfg.circuit.minimum_calls, 10);
    assert_eq!(cfg.circuit.cooldown_secs, 30);
    assert_eq!(cfg.storage_backend, StorageBackend::Postgres);
}

#[tokio::test]
async fn ops_endpoints_answer_in_memory_mode() {
    let cfg = AppConfig {
        storage_backend: StorageBackend::Memory,
        ..AppConfig::default()
    };
    let mockpsp = MockPspState::new();
    let state = AppState::build(&cfg, default_providers(&mockpsp), mockpsp, Stores::in_memory(&cfg))
        .unwrap();
    let router = app(state);

    for uri in ["/ops/readiness", "/ops/liveness", "/health"] {
        let resp = router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
    }
}

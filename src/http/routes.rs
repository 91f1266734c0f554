use crate::http::handlers::{
    circuit_breaker, gateways, metrics, ops, payments, routing_decisions, scoring_debug,
};
use crate::http::middleware::correlation::correlate;
use crate::AppState;
use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;

pub fn app(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/admin/payments", get(payments::search_payments))
        .route(
            "/admin/payments/:payment_id/decisions",
            get(routing_decisions::list_decisions),
        )
        .route("/admin/providers", get(gateways::list_providers))
        .route(
            "/admin/providers/:name/:status",
            post(gateways::set_provider_status),
        )
        .route("/admin/mockpsp/config", post(gateways::update_mockpsp_config))
        .route("/admin/metrics", get(metrics::get_metrics))
        .route(
            "/circuit-breaker/force-open/:provider",
            post(circuit_breaker::force_open),
        )
        .route(
            "/circuit-breaker/force-close/:provider",
            post(circuit_breaker::force_close),
        )
        .route("/circuit-breaker/reset/:provider", post(circuit_breaker::reset));

    Router::new()
        .route("/health", get(payments::health))
        .route("/payments", post(payments::create_payment))
        .route("/payments/:payment_id", get(payments::get_payment))
        .route("/circuit-breaker/status", get(circuit_breaker::status))
        .route("/scoring/debug", get(scoring_debug::scoring_debug))
        .route("/ops/readiness", get(ops::readiness))
        .route("/ops/liveness", get(ops::liveness))
        .merge(admin_routes)
        .layer(from_fn(correlate))
        .with_state(state)
}

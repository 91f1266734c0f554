use payflow_router::config::{AppConfig, StorageBackend};
use payflow_router::gateways::default_providers;
use payflow_router::gateways::mock::MockPspState;
use payflow_router::http::routes::app;
use payflow_router::idempotency::store_redis::RedisIdempotencyStore;
use payflow_router::repo::payments_repo::PaymentsRepo;
use payflow_router::repo::routing_decisions_repo::RoutingDecisionsRepo;
use payflow_router::{AppState, Stores};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();
    let mockpsp = MockPspState::new();
    let providers = default_providers(&mockpsp);

    let state = match cfg.storage_backend {
        StorageBackend::Memory => {
            tracing::warn!("running with in-memory storage, nothing survives a restart");
            AppState::build(&cfg, providers, mockpsp, Stores::in_memory(&cfg))?
        }
        StorageBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(&cfg.database_url)
                .await?;
            sqlx::migrate!("./migrations").run(&pool).await?;

            let redis_client = redis::Client::open(cfg.redis_url.clone())?;
            let stores = Stores {
                idempotency: Arc::new(RedisIdempotencyStore::new(
                    redis_client.clone(),
                    cfg.idempotency_ttl(),
                )),
                payments: Arc::new(PaymentsRepo::new(pool.clone())),
                decisions: Arc::new(RoutingDecisionsRepo::new(pool.clone())),
            };

            let mut state = AppState::build(&cfg, providers, mockpsp, stores)?;
            state.pool = Some(pool);
            state.redis_client = Some(redis_client);
            state
        }
    };

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);
    axum::serve(listener, app(state)).await?;
    Ok(())
}

//! HTTP intake gateway.
//!
//! Accepts transfer submissions, authenticates callers and publishes
//! messages; the processor on the other side of the queue does the actual
//! money movement.

pub mod handlers;
pub mod rate_limit;
pub mod state;
pub mod types;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::db::Database;
use crate::ledger::{self, LedgerStore, PgLedger};
use crate::metrics::Metrics;
use crate::queue::{AmqpQueue, QueuePublisher};
use crate::user_auth::{UserAuthService, jwt_auth_middleware};

use rate_limit::{RateLimiter, rate_limit_middleware};
use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let private = Router::new()
        .route(
            "/transactions",
            post(handlers::transfer::submit_transfer).get(handlers::transfer::get_transactions),
        )
        .layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    Router::new()
        .route("/liveness", get(handlers::health::liveness))
        .route("/users", post(handlers::users::register))
        .route("/users/login", post(handlers::users::login))
        .merge(private)
        .layer(from_fn_with_state(state.clone(), rate_limit_middleware))
        .with_state(state)
}

pub async fn run_gateway(config: &AppConfig) -> anyhow::Result<()> {
    let db = Database::connect(&config.postgres_url).await?;
    ledger::pg::init_schema(db.pool()).await?;
    let ledger: Arc<dyn LedgerStore> = Arc::new(PgLedger::new(db.pool().clone()));

    let queue = Arc::new(AmqpQueue::connect(&config.amqp.url).await?);
    queue.declare(&config.amqp.queue).await?;

    let user_auth = Arc::new(UserAuthService::new(
        db.pool().clone(),
        config.auth.jwt_secret.clone(),
    ));

    let limiter = config.rate_limit.enabled.then(|| {
        Arc::new(RateLimiter::new(
            config.rate_limit.max_requests,
            Duration::from_secs(config.rate_limit.window_secs),
        ))
    });

    let metrics = Arc::new(Metrics::new());
    let state = Arc::new(AppState::new(
        ledger,
        queue.clone() as Arc<dyn QueuePublisher>,
        Some(user_auth),
        metrics.clone(),
        limiter,
        config.amqp.queue.clone(),
    ));

    let app = router(state);
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Gateway listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Shutdown signal received");
    })
    .await?;

    metrics.log_snapshot();
    queue.close().await?;
    Ok(())
}

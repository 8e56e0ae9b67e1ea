use std::sync::Arc;

use axum::extract::State;
use serde::Serialize;

use super::super::state::AppState;
use super::super::types::{ApiError, ApiResult, ok};

#[derive(Debug, Serialize)]
pub struct LivenessData {
    pub liveness: &'static str,
}

/// GET /liveness — probes the ledger store.
pub async fn liveness(State(state): State<Arc<AppState>>) -> ApiResult<LivenessData> {
    match state.ledger.health().await {
        Ok(()) => ok(LivenessData { liveness: "ok" }),
        Err(e) => {
            tracing::error!(error = %e, "Liveness probe failed");
            ApiError::service_unavailable("ledger store unreachable").into_err()
        }
    }
}

use axum::extract::State;
use axum::Json;
use cortex_core::{ListFilter, StoreStats};
use serde::Serialize;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: &'static str,
}

/// `GET /health` (§6): the store must answer a trivial read, or the process is
/// reporting unhealthy per the `Fatal` error kind's recovery policy (§7).
pub async fn health(State(state): State<AppState>) -> ApiResult<Json<HealthReport>> {
    state.cortex.store.list(ListFilter::default(), 1, 0)?;
    Ok(Json(HealthReport { status: "ok" }))
}

pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<StoreStats>> {
    let stats = state.cortex.store.stats()?;
    Ok(Json(stats))
}

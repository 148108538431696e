use axum::extract::State;
use axum::Json;
use cortex_core::LifecycleReport;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RunInput {
    #[serde(default)]
    pub dry_run: bool,
}

pub async fn run(State(state): State<AppState>, Json(input): Json<RunInput>) -> ApiResult<Json<LifecycleReport>> {
    let report = state.cortex.lifecycle.run(input.dry_run).await?;
    Ok(Json(report))
}

/// `GET /lifecycle/preview` (§6): always a dry run, regardless of what `/lifecycle/run` would do.
pub async fn preview(State(state): State<AppState>) -> ApiResult<Json<LifecycleReport>> {
    let report = state.cortex.lifecycle.run(true).await?;
    Ok(Json(report))
}

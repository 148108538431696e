use axum::extract::State;
use axum::Json;
use cortex_core::{RecallInput, RecallOutcome};

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn recall(State(state): State<AppState>, Json(input): Json<RecallInput>) -> ApiResult<Json<RecallOutcome>> {
    let outcome = state.cortex.gate.recall(input).await?;
    Ok(Json(outcome))
}

use axum::extract::State;
use axum::Json;
use cortex_core::{IngestInput, IngestOutcome};

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn ingest(State(state): State<AppState>, Json(input): Json<IngestInput>) -> ApiResult<Json<IngestOutcome>> {
    let outcome = state.cortex.sieve.ingest(input).await?;
    Ok(Json(outcome))
}

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use cortex_core::Agent;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Agent>> {
    match state.cortex.store.get_agent(&id)? {
        Some(agent) => Ok(Json(agent)),
        None => Err(ApiError::not_found("agent not found")),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAgentInput {
    pub id: String,
    pub name: String,
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateAgentInput>,
) -> ApiResult<(StatusCode, Json<Agent>)> {
    let agent = Agent::new(input.id, input.name);
    state.cortex.store.upsert_agent(&agent)?;
    Ok((StatusCode::CREATED, Json(agent)))
}

/// `GET /agents/:id/config` (§6): `CortexConfig` defaults with the agent's
/// `config_overrides` merged on top, one JSON object key at a time.
pub async fn effective_config(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let agent = state
        .cortex
        .store
        .get_agent(&id)?
        .ok_or_else(|| ApiError::not_found("agent not found"))?;

    let snapshot = state.config.read().expect("config lock poisoned").clone();
    let mut merged =
        serde_json::to_value(&snapshot).map_err(|e| cortex_core::CortexError::fatal(e.to_string()))?;
    if let (Some(base), Some(overrides)) = (merged.as_object_mut(), agent.config_overrides.as_object()) {
        for (key, value) in overrides {
            base.insert(key.clone(), value.clone());
        }
    }
    Ok(Json(merged))
}

//! `GET/PATCH /config` (§6): the server's configuration snapshot. `PATCH` merges
//! the given partial TOML-equivalent JSON object onto the in-memory snapshot and
//! returns it; it does not reach into already-constructed `Sieve`/`Gate`/
//! `LifecycleEngine` instances, which keep the config they were built with.

use axum::extract::State;
use axum::Json;
use cortex_core::CortexConfig;

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn get(State(state): State<AppState>) -> Json<CortexConfig> {
    let snapshot = state.config.read().expect("config lock poisoned").clone();
    Json(snapshot)
}

pub async fn patch(State(state): State<AppState>, Json(patch): Json<serde_json::Value>) -> ApiResult<Json<CortexConfig>> {
    let mut guard = state.config.write().expect("config lock poisoned");
    let mut current = serde_json::to_value(&*guard).map_err(|e| cortex_core::CortexError::fatal(e.to_string()))?;
    if let (Some(base), Some(overrides)) = (current.as_object_mut(), patch.as_object()) {
        for (key, value) in overrides {
            base.insert(key.clone(), value.clone());
        }
    }
    let merged: CortexConfig =
        serde_json::from_value(current).map_err(|e| cortex_core::CortexError::validation(e.to_string()))?;
    *guard = merged.clone();
    Ok(Json(merged))
}

//! `CRUD /memories` (§6): direct store access, bypassing the Sieve's matcher —
//! for callers managing memories out-of-band (imports, corrections, admin tools).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use cortex_core::externals::Embedder;
use cortex_core::{Category, Layer, ListFilter, Memory, MemoryPatch, NewMemory};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub agent_id: Option<String>,
    pub layer: Option<String>,
    pub category: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

pub async fn list(State(state): State<AppState>, Query(q): Query<ListQuery>) -> ApiResult<Json<Vec<Memory>>> {
    let layer = q
        .layer
        .map(|l| l.parse::<Layer>())
        .transpose()
        .map_err(ApiError::from)?;
    let category = q
        .category
        .map(|c| c.parse::<Category>())
        .transpose()
        .map_err(ApiError::from)?;
    let filter = ListFilter {
        agent_id: q.agent_id,
        layer,
        category,
        include_superseded: false,
    };
    let memories = state.cortex.store.list(filter, q.limit, q.offset)?;
    Ok(Json(memories))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Memory>> {
    match state.cortex.store.get(&id)? {
        Some(memory) => Ok(Json(memory)),
        None => Err(ApiError::not_found("memory not found")),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemoryInput {
    pub agent_id: String,
    pub category: String,
    pub content: String,
    #[serde(default = "default_importance")]
    pub importance: f64,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub layer: Option<String>,
}

fn default_importance() -> f64 {
    0.5
}

fn default_confidence() -> f64 {
    0.7
}

fn default_source() -> String {
    "api".to_string()
}

pub async fn create(State(state): State<AppState>, Json(input): Json<CreateMemoryInput>) -> ApiResult<(StatusCode, Json<Memory>)> {
    let category = input.category.parse::<Category>().map_err(ApiError::from)?;
    let layer = input.layer.map(|l| l.parse::<Layer>()).transpose().map_err(ApiError::from)?;

    let spec = NewMemory {
        agent_id: input.agent_id,
        category,
        content: input.content,
        importance: input.importance,
        confidence: input.confidence,
        is_pinned: input.is_pinned,
        source: input.source,
        metadata: input.metadata,
        layer,
    };
    let memory = state.cortex.store.insert(spec)?;
    let embedding = state.embedder.embed(&memory.content).await?;
    state.cortex.store.vector_upsert(&memory.id, &embedding)?;
    Ok((StatusCode::CREATED, Json(memory)))
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemoryInput {
    pub content: Option<String>,
    pub importance: Option<f64>,
    pub confidence: Option<f64>,
    pub layer: Option<String>,
    pub is_pinned: Option<bool>,
    pub metadata: Option<serde_json::Value>,
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateMemoryInput>,
) -> ApiResult<Json<Memory>> {
    let layer = input.layer.map(|l| l.parse::<Layer>()).transpose().map_err(ApiError::from)?;
    let patch = MemoryPatch {
        content: input.content,
        importance: input.importance,
        confidence: input.confidence,
        layer,
        is_pinned: input.is_pinned,
        metadata: input.metadata,
        ..Default::default()
    };
    let memory = state.cortex.store.update(&id, patch)?;
    Ok(Json(memory))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    state.cortex.store.delete(&id)?;
    state.cortex.store.vector_delete(&[id])?;
    Ok(StatusCode::NO_CONTENT)
}

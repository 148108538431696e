//! `POST /search` (§6): the raw hybrid search Gate's first step runs, surfaced
//! directly with per-list scores for debugging recall quality — unlike `/recall`,
//! this does not fuse, score, rerank, or format; it shows the two retrieval lists
//! as the store returns them.

use axum::extract::State;
use axum::Json;
use cortex_core::externals::Embedder;
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchInput {
    pub query: String,
    pub agent_id: String,
    #[serde(default = "default_k")]
    pub k: usize,
}

fn default_k() -> usize {
    20
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    pub keyword_hits: Vec<ScoredHit>,
    pub vector_hits: Vec<ScoredHit>,
}

#[derive(Debug, Serialize)]
pub struct ScoredHit {
    pub id: String,
    pub score: f64,
}

pub async fn search(State(state): State<AppState>, Json(input): Json<SearchInput>) -> ApiResult<Json<SearchOutcome>> {
    let store = &state.cortex.store;
    let keyword_hits = store
        .keyword_search(&input.agent_id, &input.query, input.k)?
        .into_iter()
        .map(|(id, score)| ScoredHit { id, score })
        .collect();

    let embedding = state.embedder.embed(&input.query).await?;
    let vector_hits = store
        .vector_search(&input.agent_id, &embedding, input.k)?
        .into_iter()
        .map(|(id, score)| ScoredHit { id, score })
        .collect();

    Ok(Json(SearchOutcome { keyword_hits, vector_hits }))
}

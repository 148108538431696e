use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use cortex_core::{NewRelation, Predicate, Relation};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub agent_id: String,
}

pub async fn list(State(state): State<AppState>, Query(q): Query<ListQuery>) -> ApiResult<Json<Vec<Relation>>> {
    let relations = state.cortex.store.list_relations(&q.agent_id)?;
    Ok(Json(relations))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRelationInput {
    pub agent_id: String,
    pub subject: String,
    pub predicate: String,
    pub object: String,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    pub memory_id: Option<String>,
}

fn default_confidence() -> f64 {
    0.7
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateRelationInput>,
) -> ApiResult<(StatusCode, Json<Relation>)> {
    let predicate = input.predicate.parse::<Predicate>().map_err(ApiError::from)?;
    let relation = state.cortex.store.insert_relation(NewRelation {
        agent_id: input.agent_id,
        subject: input.subject,
        predicate,
        object: input.object,
        confidence: input.confidence.clamp(0.0, 1.0),
        memory_id: input.memory_id,
    })?;
    Ok((StatusCode::CREATED, Json(relation)))
}

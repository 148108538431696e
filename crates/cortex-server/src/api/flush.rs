//! `POST /flush` (§6): an emergency full-transcript ingest right before a caller
//! compresses or drops its conversation context, so nothing said since the last
//! `/ingest` call is lost. Runs through the same `Sieve::ingest` entry point as
//! normal ingestion, just seeded from the whole transcript instead of one turn.

use axum::extract::State;
use axum::Json;
use cortex_core::{ConversationTurn, IngestInput, IngestOutcome, Role};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlushInput {
    pub agent_id: String,
    pub session_id: Option<String>,
    pub messages: Vec<ConversationTurn>,
}

pub async fn flush(State(state): State<AppState>, Json(input): Json<FlushInput>) -> ApiResult<Json<IngestOutcome>> {
    let last_user = input
        .messages
        .iter()
        .rev()
        .find(|t| t.role == Role::User)
        .map(|t| t.content.clone())
        .unwrap_or_default();
    let last_assistant = input
        .messages
        .iter()
        .rev()
        .find(|t| t.role == Role::Assistant)
        .map(|t| t.content.clone());

    let outcome = state
        .cortex
        .sieve
        .ingest(IngestInput {
            agent_id: input.agent_id,
            session_id: input.session_id,
            user_message: last_user,
            assistant_message: last_assistant,
            messages: Some(input.messages),
        })
        .await?;
    Ok(Json(outcome))
}

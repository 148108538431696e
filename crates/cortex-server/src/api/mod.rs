//! Thin axum adapters over `cortex-core` entry points (SPEC_FULL §6.1): each
//! handler deserializes its body, calls straight into `Cortex`/`Store`, and
//! serializes the result. No business logic lives here.

mod agents;
mod config;
mod flush;
mod health;
mod ingest;
mod lifecycle;
mod memories;
mod recall;
mod relations;
mod search;

use axum::routing::{get, patch, post};
use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/recall", post(recall::recall))
        .route("/api/v1/ingest", post(ingest::ingest))
        .route("/api/v1/flush", post(flush::flush))
        .route("/api/v1/search", post(search::search))
        .route("/api/v1/memories", get(memories::list).post(memories::create))
        .route(
            "/api/v1/memories/{id}",
            get(memories::get).patch(memories::update).delete(memories::delete),
        )
        .route("/api/v1/relations", get(relations::list).post(relations::create))
        .route("/api/v1/agents", post(agents::create))
        .route("/api/v1/agents/{id}", get(agents::get))
        .route("/api/v1/agents/{id}/config", get(agents::effective_config))
        .route("/api/v1/lifecycle/run", post(lifecycle::run))
        .route("/api/v1/lifecycle/preview", get(lifecycle::preview))
        .route("/api/v1/health", get(health::health))
        .route("/api/v1/stats", get(health::stats))
        .route("/api/v1/config", get(config::get).patch(config::patch))
}

//! Shared scaffolding for the HTTP-level smoke tests: a real `Router<AppState>`
//! wired over a temp-dir sqlite store and the dependency-free reference
//! providers, driven in-process via `tower::ServiceExt::oneshot` rather than a
//! live TCP listener.

use std::sync::{Arc, RwLock};

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use cortex_core::{default_vector_backend, Cortex, CortexConfig, Store};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

pub struct TestServer {
    pub app: Router,
    _temp_dir: TempDir,
}

impl TestServer {
    pub fn new() -> Self {
        Self::with_auth_token(None)
    }

    pub fn with_auth_token(auth_token: Option<&str>) -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let db_path = temp_dir.path().join("cortex-test.db");
        let config = CortexConfig::default();

        let embedder = cortex_server::providers::resolve_embedder(&config.embedding);
        let extraction_llm = cortex_server::providers::resolve_llm(&config.llm.extraction);
        let lifecycle_llm = cortex_server::providers::resolve_llm(&config.llm.lifecycle);
        let vector = default_vector_backend(config.embedding.dimensions).expect("vector backend");
        let store = Arc::new(Store::new(Some(db_path), config.storage.wal_mode, vector).expect("open store"));

        let cortex = Arc::new(Cortex::new(
            store,
            embedder.clone(),
            extraction_llm.clone(),
            extraction_llm,
            lifecycle_llm,
            config.clone(),
        ));

        let state = cortex_server::state::AppState {
            cortex,
            embedder,
            auth_token: auth_token.map(Arc::<str>::from),
            config: Arc::new(RwLock::new(config)),
        };

        let app = cortex_server::api::router()
            .layer(axum::middleware::from_fn_with_state(state.clone(), cortex_server::auth::require_bearer_token))
            .with_state(state);

        Self { app, _temp_dir: temp_dir }
    }

    pub async fn request(&self, req: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(req).await.expect("request to succeed")
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.request(Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> Response<Body> {
        self.request(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.expect("read body").to_bytes();
    serde_json::from_slice(&bytes).expect("parse json body")
}

pub fn status(response: &Response<Body>) -> StatusCode {
    response.status()
}

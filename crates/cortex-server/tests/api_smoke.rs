//! HTTP-level smoke tests over the real router, driven in-process with
//! `tower::ServiceExt::oneshot` (no live TCP listener). Grounded on the same
//! temp-dir-backed storage pattern as `cortex-core`'s own integration tests.

mod harness;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use harness::{body_json, status, TestServer};
use serde_json::json;

#[tokio::test]
async fn health_reports_ok() {
    let server = TestServer::new();
    let response = server.get("/api/v1/health").await;
    assert_eq!(status(&response), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn ingest_then_recall_round_trips_through_http() {
    let server = TestServer::new();

    let ingest_response = server
        .post_json(
            "/api/v1/ingest",
            json!({
                "agentId": "agent-http",
                "sessionId": "s1",
                "userMessage": "My name is Priya and I work at Globex.",
                "assistantMessage": "Got it."
            }),
        )
        .await;
    assert_eq!(status(&ingest_response), StatusCode::OK);
    let outcome = body_json(ingest_response).await;
    assert!(outcome["written"].as_u64().unwrap() >= 2);

    let recall_response = server
        .post_json(
            "/api/v1/recall",
            json!({
                "query": "What is my name?",
                "agentId": "agent-http"
            }),
        )
        .await;
    assert_eq!(status(&recall_response), StatusCode::OK);
    let recall_body = body_json(recall_response).await;
    assert!(recall_body["context"].as_str().unwrap().contains("Priya"));
}

#[tokio::test]
async fn create_get_and_delete_memory_via_crud_routes() {
    let server = TestServer::new();

    let create_response = server
        .post_json(
            "/api/v1/memories",
            json!({
                "agentId": "agent-crud",
                "category": "fact",
                "content": "The build pipeline runs on self-hosted runners.",
                "importance": 0.6
            }),
        )
        .await;
    assert_eq!(status(&create_response), StatusCode::CREATED);
    let created = body_json(create_response).await;
    let id = created["id"].as_str().unwrap().to_string();

    let get_response = server.get(&format!("/api/v1/memories/{id}")).await;
    assert_eq!(status(&get_response), StatusCode::OK);
    let fetched = body_json(get_response).await;
    assert_eq!(fetched["content"], created["content"]);

    let delete_response = server
        .request(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/memories/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status(&delete_response), StatusCode::NO_CONTENT);

    let missing_response = server.get(&format!("/api/v1/memories/{id}")).await;
    assert_eq!(status(&missing_response), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_memory_rejects_unknown_category() {
    let server = TestServer::new();
    let response = server
        .post_json(
            "/api/v1/memories",
            json!({
                "agentId": "agent-crud",
                "category": "not_a_real_category",
                "content": "whatever"
            }),
        )
        .await;
    assert_eq!(status(&response), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn bearer_token_is_enforced_when_configured() {
    let server = TestServer::with_auth_token(Some("secret-token"));

    let unauthorized = server.get("/api/v1/health").await;
    assert_eq!(status(&unauthorized), StatusCode::UNAUTHORIZED);

    let authorized = server
        .request(
            Request::builder()
                .uri("/api/v1/health")
                .header("authorization", "Bearer secret-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status(&authorized), StatusCode::OK);
}

#[tokio::test]
async fn lifecycle_preview_runs_without_writing() {
    let server = TestServer::new();
    let response = server.get("/api/v1/lifecycle/preview").await;
    assert_eq!(status(&response), StatusCode::OK);
    let report = body_json(response).await;
    assert_eq!(report["dryRun"], true);
}

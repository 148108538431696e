//! Deep-channel structured extraction, scripted against a canned LLM completion
//! since no real extraction provider runs in this workspace.

mod harness;

use std::sync::Arc;

use cortex_core::{Category, ListFilter};
use harness::{ScriptedLlm, TestCortex};

#[tokio::test]
async fn deep_channel_extracts_preference_and_relation() {
    let scripted = r#"{
        "memories": [
            {"category": "preference", "content": "Prefers Rust over Go", "importance": 0.7, "confidence": 0.8},
            {"category": "project_state", "content": "Working on project Zephyr", "importance": 0.6, "confidence": 0.75}
        ],
        "relations": [
            {"subject": "user", "predicate": "prefers", "object": "Rust", "confidence": 0.8}
        ]
    }"#;

    let tc = TestCortex::with_extraction_llm(
        cortex_core::CortexConfig::default(),
        Arc::new(ScriptedLlm {
            completion: scripted.to_string(),
        }),
    );

    let outcome = tc
        .cortex
        .sieve
        .ingest(cortex_core::IngestInput {
            agent_id: "agent-deep".to_string(),
            session_id: Some("s1".to_string()),
            user_message: "I prefer Rust over Go, working on project Zephyr.".to_string(),
            assistant_message: Some("Makes sense, Rust's type system helps with that kind of project.".to_string()),
            messages: None,
        })
        .await
        .unwrap();

    assert!(outcome.written >= 2, "expected preference + project_state memories, got {outcome:?}");

    let memories = tc
        .cortex
        .store
        .list(
            ListFilter {
                agent_id: Some("agent-deep".to_string()),
                ..Default::default()
            },
            50,
            0,
        )
        .unwrap();
    assert!(memories.iter().any(|m| m.category == Category::Preference && m.content.contains("Rust")));
    assert!(memories.iter().any(|m| m.category == Category::ProjectState && m.content.contains("Zephyr")));

    let relations = tc.cortex.store.list_relations("agent-deep").unwrap();
    assert!(relations
        .iter()
        .any(|r| r.predicate == cortex_core::Predicate::Prefers && r.object.contains("Rust")));
}

#[tokio::test]
async fn unavailable_extraction_llm_degrades_without_failing_ingest() {
    // NullLlm via `TestCortex::new` always errors `complete`, so the deep channel
    // should skip silently rather than bubble the error up through `ingest`.
    let tc = TestCortex::new();
    let outcome = tc
        .cortex
        .sieve
        .ingest(cortex_core::IngestInput {
            agent_id: "agent-deep".to_string(),
            session_id: Some("s1".to_string()),
            user_message: "I prefer Rust over Go, working on project Zephyr.".to_string(),
            assistant_message: None,
            messages: None,
        })
        .await
        .unwrap();

    // The fast channel's signal regexes still run independent of the deep channel.
    assert_eq!(outcome.deduplicated, 0);
    let _ = outcome.written;
}

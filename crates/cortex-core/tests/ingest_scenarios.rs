//! End-to-end ingest scenarios (fast channel + matcher), run over the real
//! `Sieve`/`Store`/`MemoryWriter` with the dependency-free reference providers.

mod harness;

use cortex_core::{Category, Layer, ListFilter, Sieve};
use harness::TestCortex;

fn agent() -> &'static str {
    "agent-ingest"
}

#[tokio::test]
async fn fast_channel_name_capture() {
    let tc = TestCortex::new();
    let outcome = tc
        .cortex
        .sieve
        .ingest(cortex_core::IngestInput {
            agent_id: agent().to_string(),
            session_id: Some("s1".to_string()),
            user_message: "My name is Alex and I work at Acme Corp.".to_string(),
            assistant_message: Some("Got it.".to_string()),
            messages: None,
        })
        .await
        .unwrap();

    assert!(outcome.written >= 2, "expected at least name + employer memories, got {outcome:?}");

    let memories = tc
        .cortex
        .store
        .list(
            ListFilter {
                agent_id: Some(agent().to_string()),
                ..Default::default()
            },
            50,
            0,
        )
        .unwrap();
    assert!(memories.iter().any(|m| m.category == Category::Identity && m.content.contains("Alex")));

    let recall = tc
        .cortex
        .gate
        .recall(cortex_core::RecallInput {
            query: "What is my name?".to_string(),
            agent_id: agent().to_string(),
            max_tokens: None,
        })
        .await
        .unwrap();
    assert!(recall.context.contains("Alex"), "recall context was: {}", recall.context);
}

#[tokio::test]
async fn near_exact_correction_supersedes_prior_identity() {
    let tc = TestCortex::new();
    let sieve: &Sieve = &tc.cortex.sieve;

    sieve
        .ingest(cortex_core::IngestInput {
            agent_id: agent().to_string(),
            session_id: Some("s1".to_string()),
            user_message: "My name is Alex and I work at Acme Corp.".to_string(),
            assistant_message: Some("Got it.".to_string()),
            messages: None,
        })
        .await
        .unwrap();

    let second = sieve
        .ingest(cortex_core::IngestInput {
            agent_id: agent().to_string(),
            session_id: Some("s1".to_string()),
            user_message: "Actually my name is Alexander, not Alex.".to_string(),
            assistant_message: Some("Updated.".to_string()),
            messages: None,
        })
        .await
        .unwrap();

    assert!(second.smart_updated >= 1, "expected a supersede, got {second:?}");

    let identity_memories: Vec<_> = tc
        .cortex
        .store
        .list(
            ListFilter {
                agent_id: Some(agent().to_string()),
                category: Some(Category::Identity),
                ..Default::default()
            },
            50,
            0,
        )
        .unwrap()
        .into_iter()
        .filter(|m| m.is_live())
        .collect();

    assert_eq!(identity_memories.len(), 1, "expected exactly one live identity memory: {identity_memories:?}");
    assert!(identity_memories[0].content.contains("Alexander"));
}

#[tokio::test]
async fn empty_and_tiny_messages_extract_nothing() {
    let tc = TestCortex::new();
    for message in ["", "   ", "hi"] {
        let outcome = tc
            .cortex
            .sieve
            .ingest(cortex_core::IngestInput {
                agent_id: agent().to_string(),
                session_id: None,
                user_message: message.to_string(),
                assistant_message: None,
                messages: None,
            })
            .await
            .unwrap();
        assert_eq!(outcome.written, 0, "message {message:?} should not extract anything");
    }
}

#[tokio::test]
async fn repeat_ingest_of_same_pair_produces_no_net_new_memories() {
    let tc = TestCortex::new();
    let input = || cortex_core::IngestInput {
        agent_id: agent().to_string(),
        session_id: Some("s1".to_string()),
        user_message: "I live in Seattle.".to_string(),
        assistant_message: Some("Noted.".to_string()),
        messages: None,
    };

    let first = tc.cortex.sieve.ingest(input()).await.unwrap();
    let second = tc.cortex.sieve.ingest(input()).await.unwrap();

    assert!(first.written >= 1);
    assert!(second.written == 0 || second.deduplicated >= first.written);
}

#[tokio::test]
async fn working_layer_memory_carries_an_expiry() {
    let tc = TestCortex::new();
    let memory = tc
        .cortex
        .store
        .insert(cortex_core::NewMemory {
            agent_id: agent().to_string(),
            category: Category::Fact,
            content: "temporary fact".to_string(),
            importance: 0.3,
            confidence: 0.5,
            is_pinned: false,
            source: "test".to_string(),
            metadata: serde_json::json!({}),
            layer: Some(Layer::Working),
        })
        .unwrap();

    assert!(memory.expires_at.is_some());
}

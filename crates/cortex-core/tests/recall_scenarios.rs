//! Recall-path scenarios: constraint priority under a tight token budget, and the
//! empty-result behavior for small talk and unknown agents.

mod harness;

use cortex_core::externals::Embedder;
use cortex_core::{Category, NewMemory, RecallInput};
use harness::TestCortex;

async fn seed(tc: &TestCortex, agent_id: &str, category: Category, content: &str, importance: f64) {
    let memory = tc
        .cortex
        .store
        .insert(NewMemory {
            agent_id: agent_id.to_string(),
            category,
            content: content.to_string(),
            importance,
            confidence: 0.8,
            is_pinned: false,
            source: "test".to_string(),
            metadata: serde_json::json!({}),
            layer: None,
        })
        .unwrap();
    let embedding = tc.embedder.embed(&memory.content).await.unwrap();
    tc.cortex.store.vector_upsert(&memory.id, &embedding).unwrap();
}

#[tokio::test]
async fn constraint_survives_token_budget_truncation() {
    let tc = TestCortex::new();
    let agent_id = "agent-recall";

    seed(
        &tc,
        agent_id,
        Category::Constraint,
        "Never run destructive shell commands without confirmation.",
        0.95,
    )
    .await;
    seed(
        &tc,
        agent_id,
        Category::Fact,
        "The user's favorite color is teal and they enjoy hiking on weekends near the coast.",
        0.6,
    )
    .await;
    seed(
        &tc,
        agent_id,
        Category::Fact,
        "The user previously mentioned a long list of hobbies including painting, chess and running.",
        0.6,
    )
    .await;

    let outcome = tc
        .cortex
        .gate
        .recall(RecallInput {
            query: "shell commands".to_string(),
            agent_id: agent_id.to_string(),
            max_tokens: Some(20),
        })
        .await
        .unwrap();

    assert!(
        outcome.context.contains("destructive shell commands"),
        "constraint should survive truncation, got: {}",
        outcome.context
    );
    assert!(
        !outcome.context.contains("hiking") && !outcome.context.contains("painting"),
        "budget was tight enough that the lower-priority facts should have been dropped, got: {}",
        outcome.context
    );
}

#[tokio::test]
async fn small_talk_query_returns_empty_context() {
    let tc = TestCortex::new();
    let outcome = tc
        .cortex
        .gate
        .recall(RecallInput {
            query: "thanks".to_string(),
            agent_id: "agent-recall".to_string(),
            max_tokens: None,
        })
        .await
        .unwrap();
    assert!(outcome.context.is_empty());
    assert!(outcome.results.is_empty());
}

#[tokio::test]
async fn recall_results_are_scoped_to_the_requesting_agent() {
    let tc = TestCortex::new();
    seed(&tc, "agent-a", Category::Fact, "Agent A's secret project codename is Falcon.", 0.8).await;
    seed(&tc, "agent-b", Category::Fact, "Agent B's secret project codename is Falcon.", 0.8).await;

    let outcome = tc
        .cortex
        .gate
        .recall(RecallInput {
            query: "Falcon project codename".to_string(),
            agent_id: "agent-a".to_string(),
            max_tokens: None,
        })
        .await
        .unwrap();

    assert!(outcome.results.iter().all(|m| m.agent_id == "agent-a"));
}

//! Lifecycle pass scenarios: promotion, archival and compression. Age-dependent
//! phases backdate `created_at`/`updated_at` directly (see
//! `harness::TestCortex::backdate`) since `Store::update` always stamps the
//! current time on write.

mod harness;

use cortex_core::{Category, Layer, ListFilter, NewMemory};
use harness::TestCortex;

#[tokio::test]
async fn high_importance_accessed_working_memory_is_promoted_to_core() {
    let tc = TestCortex::new();
    let agent_id = "agent-lifecycle";

    let memory = tc
        .cortex
        .store
        .insert(NewMemory {
            agent_id: agent_id.to_string(),
            category: Category::Fact,
            content: "Ships to production every Tuesday.".to_string(),
            importance: 0.9,
            confidence: 0.9,
            is_pinned: false,
            source: "test".to_string(),
            metadata: serde_json::json!({}),
            layer: Some(Layer::Working),
        })
        .unwrap();
    assert!(memory.expires_at.is_some());

    tc.cortex
        .store
        .update(
            &memory.id,
            cortex_core::MemoryPatch {
                access_count_delta: Some(1),
                ..Default::default()
            },
        )
        .unwrap();

    let report = tc.cortex.lifecycle.run(false).await.unwrap();
    assert!(report.promoted >= 1);

    let promoted = tc.cortex.store.get(&memory.id).unwrap().unwrap();
    assert_eq!(promoted.layer, Layer::Core);
    assert!(promoted.expires_at.is_none());
}

#[tokio::test]
async fn dry_run_reports_without_writing() {
    let tc = TestCortex::new();
    let agent_id = "agent-lifecycle-dry";

    let memory = tc
        .cortex
        .store
        .insert(NewMemory {
            agent_id: agent_id.to_string(),
            category: Category::Fact,
            content: "Dry run candidate.".to_string(),
            importance: 0.9,
            confidence: 0.9,
            is_pinned: false,
            source: "test".to_string(),
            metadata: serde_json::json!({}),
            layer: Some(Layer::Working),
        })
        .unwrap();
    tc.cortex
        .store
        .update(
            &memory.id,
            cortex_core::MemoryPatch {
                access_count_delta: Some(1),
                ..Default::default()
            },
        )
        .unwrap();

    let report = tc.cortex.lifecycle.run(true).await.unwrap();
    assert!(report.promoted >= 1);

    let unchanged = tc.cortex.store.get(&memory.id).unwrap().unwrap();
    assert_eq!(unchanged.layer, Layer::Working, "dry_run must not write");
}

#[tokio::test]
async fn decayed_old_core_memory_archives() {
    let tc = TestCortex::new();
    let agent_id = "agent-archive";

    let memory = tc
        .cortex
        .store
        .insert(NewMemory {
            agent_id: agent_id.to_string(),
            category: Category::Fact,
            content: "A fact nobody has touched in a long time.".to_string(),
            importance: 0.4,
            confidence: 0.4,
            is_pinned: false,
            source: "test".to_string(),
            metadata: serde_json::json!({}),
            layer: Some(Layer::Core),
        })
        .unwrap();

    // 60 days at the default decay_lambda (0.03) puts decay_score at ~0.165,
    // under the 0.2 archive_threshold, and clears the 30-day archive_age_floor_days
    // check; the decay phase (run below) derives decay_score from this backdated
    // timestamp, it isn't set directly.
    tc.backdate(&memory.id, 60);

    let report = tc.cortex.lifecycle.run(false).await.unwrap();
    assert!(report.archived >= 1);

    let archived = tc.cortex.store.get(&memory.id).unwrap().unwrap();
    assert_eq!(archived.layer, Layer::Archive);
}

#[tokio::test]
async fn pinned_memory_is_never_archived_and_keeps_full_decay() {
    let tc = TestCortex::new();
    let agent_id = "agent-pinned";

    let memory = tc
        .cortex
        .store
        .insert(NewMemory {
            agent_id: agent_id.to_string(),
            category: Category::Fact,
            content: "Pinned fact that should never decay away.".to_string(),
            importance: 0.9,
            confidence: 0.9,
            is_pinned: true,
            source: "test".to_string(),
            metadata: serde_json::json!({}),
            layer: Some(Layer::Core),
        })
        .unwrap();
    tc.backdate(&memory.id, 400);

    tc.cortex.lifecycle.run(false).await.unwrap();

    let still = tc.cortex.store.get(&memory.id).unwrap().unwrap();
    assert_eq!(still.layer, Layer::Core);
    assert!((still.decay_score - 1.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn stale_archive_group_compresses_into_a_core_summary() {
    let tc = TestCortex::new();
    let agent_id = "agent-compress";

    let mut archived_ids = Vec::new();
    for i in 0..10 {
        let memory = tc
            .cortex
            .store
            .insert(NewMemory {
                agent_id: agent_id.to_string(),
                category: Category::Fact,
                content: format!("Archived fact number {i} about an old project."),
                importance: 0.3,
                confidence: 0.5,
                is_pinned: false,
                source: "test".to_string(),
                metadata: serde_json::json!({}),
                layer: Some(Layer::Archive),
            })
            .unwrap();
        tc.backdate(&memory.id, 120);
        archived_ids.push(memory.id);
    }

    let report = tc.cortex.lifecycle.run(false).await.unwrap();
    assert!(report.compressed_groups >= 1);
    assert_eq!(report.compressed_entries, 10);

    for id in &archived_ids {
        let memory = tc.cortex.store.get(id).unwrap().unwrap();
        assert!(memory.superseded_by.is_some(), "archived member should point at the summary");
    }

    let summaries = tc
        .cortex
        .store
        .list(
            ListFilter {
                agent_id: Some(agent_id.to_string()),
                category: Some(Category::Summary),
                ..Default::default()
            },
            10,
            0,
        )
        .unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].layer, Layer::Core);
}

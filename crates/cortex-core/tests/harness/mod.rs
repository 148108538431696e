//! Shared scaffolding for the integration tests: a throwaway `Store` plus a wired
//! `Cortex` over the dependency-free reference providers, so each scenario test
//! exercises the real Sieve/Gate/Lifecycle paths without a real LLM or embedding
//! model. Grounded on the teacher's `tests/e2e/src/harness::TestDatabaseManager`
//! (temp-dir-backed storage, torn down on drop).

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use cortex_core::externals::{ArbitrationAction, ArbitrationDecision, ArbitrationRequest, DeterministicHashEmbedder, Llm, NullLlm};
use cortex_core::{default_vector_backend, Cortex, CortexConfig, Store};
use tempfile::TempDir;

/// Keeps the `TempDir` alive for the lifetime of the test so the sqlite file isn't
/// deleted out from under an in-flight connection.
pub struct TestCortex {
    pub cortex: Cortex,
    pub embedder: Arc<dyn cortex_core::externals::Embedder>,
    pub db_path: PathBuf,
    _temp_dir: TempDir,
}

impl TestCortex {
    pub fn new() -> Self {
        Self::with_config(CortexConfig::default())
    }

    pub fn with_config(config: CortexConfig) -> Self {
        let llm: Arc<dyn Llm> = Arc::new(NullLlm);
        Self::with_extraction_llm(config, llm)
    }

    /// For scenarios that exercise the deep channel's LLM-structured extraction,
    /// where `NullLlm`'s unconditional degrade-locally behavior would skip it.
    pub fn with_extraction_llm(config: CortexConfig, extraction_llm: Arc<dyn Llm>) -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let db_path = temp_dir.path().join("cortex-test.db");

        let embedder: Arc<dyn cortex_core::externals::Embedder> =
            Arc::new(DeterministicHashEmbedder::new(config.embedding.dimensions));
        let lifecycle_llm: Arc<dyn Llm> = Arc::new(NullLlm);
        let vector = default_vector_backend(config.embedding.dimensions).expect("vector backend");
        let store = Arc::new(Store::new(Some(db_path.clone()), config.storage.wal_mode, vector).expect("open store"));

        let cortex = Cortex::new(
            store,
            embedder.clone(),
            extraction_llm.clone(),
            extraction_llm,
            lifecycle_llm,
            config,
        );

        Self {
            cortex,
            embedder,
            db_path,
            _temp_dir: temp_dir,
        }
    }

    /// Directly rewrites `created_at`/`updated_at` for a row, bypassing
    /// `Store::update` (which always stamps `Utc::now()`). Lifecycle age checks
    /// have no other way to be exercised without actually waiting out the TTL.
    pub fn backdate(&self, memory_id: &str, days_ago: i64) {
        let conn = rusqlite::Connection::open(&self.db_path).expect("open db for backdate");
        let ts = (chrono::Utc::now() - chrono::Duration::days(days_ago)).to_rfc3339();
        conn.execute(
            "UPDATE memories SET created_at = ?1, updated_at = ?1 WHERE id = ?2",
            rusqlite::params![ts, memory_id],
        )
        .expect("backdate memory");
    }
}

/// An `Llm` that always returns one canned completion, for deep-channel tests that
/// need structured extraction without a real provider.
pub struct ScriptedLlm {
    pub completion: String,
}

#[async_trait]
impl Llm for ScriptedLlm {
    async fn complete(&self, _prompt: &str) -> cortex_core::Result<String> {
        Ok(self.completion.clone())
    }

    async fn arbitrate(&self, _pair: &ArbitrationRequest) -> cortex_core::Result<ArbitrationDecision> {
        Ok(ArbitrationDecision {
            action: ArbitrationAction::Replace,
            merged_content: None,
            reasoning: "scripted replace".to_string(),
        })
    }
}

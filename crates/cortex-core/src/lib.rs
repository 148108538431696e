//! # Cortex Core
//!
//! The sidecar memory engine for AI agents: a single choke-point write path (the
//! four-tier matcher), a hybrid keyword+vector recall path (RRF fusion across query
//! variants), and a scheduled lifecycle pass that decays, promotes, merges, archives,
//! and compresses memories over time.
//!
//! Transport (REST, auth) and concrete provider clients (LLM, embedding, rerank) are
//! out of scope for this crate — see `cortex-server`.

pub mod config;
pub mod error;
pub mod externals;
pub mod gate;
pub mod lifecycle;
pub mod model;
pub mod signals;
pub mod sieve;
pub mod store;
pub mod writer;

pub use config::CortexConfig;
pub use error::{CortexError, Result};
pub use gate::{Gate, RecallInput, RecallMeta, RecallOutcome};
pub use lifecycle::{LifecycleEngine, LifecycleReport};
pub use model::{Agent, Category, CategoryFamily, Layer, Memory, NewMemory, NewRelation, Predicate, Relation};
pub use sieve::{ConversationTurn, IngestInput, IngestOutcome, Role, Sieve};
pub use store::{ListFilter, MemoryPatch, Store, StoreStats};
pub use writer::{Extraction, MemoryWriter, WriteOutcome};

use std::sync::Arc;

use externals::{Embedder, Llm, VectorBackend};

/// Wires Store, Sieve, Gate, and LifecycleEngine over one shared `Store` and one set
/// of resolved provider clients. `cortex-server` constructs one `Cortex` at boot from
/// `CortexConfig` and the concrete providers it resolves, then dispatches every REST
/// route to the matching method here.
pub struct Cortex {
    pub store: Arc<Store>,
    pub sieve: Sieve,
    pub gate: Gate,
    pub lifecycle: LifecycleEngine,
}

impl Cortex {
    pub fn new(
        store: Arc<Store>,
        embedder: Arc<dyn Embedder>,
        arbitration_llm: Arc<dyn Llm>,
        extraction_llm: Arc<dyn Llm>,
        lifecycle_llm: Arc<dyn Llm>,
        config: CortexConfig,
    ) -> Self {
        let sieve = Sieve::new(
            store.clone(),
            embedder.clone(),
            arbitration_llm,
            extraction_llm,
            config.sieve.clone(),
        );
        let gate = Gate::new(
            store.clone(),
            embedder.clone(),
            lifecycle_llm.clone(),
            config.gate.clone(),
            config.search.clone(),
        );
        let lifecycle = LifecycleEngine::new(
            store.clone(),
            embedder,
            lifecycle_llm,
            config.lifecycle.clone(),
            config.sieve.clone(),
            config.layers.clone(),
        );
        Self {
            store,
            sieve,
            gate,
            lifecycle,
        }
    }
}

/// Constructs the vector backend named by `embedding.provider`/`dimensions`. Only the
/// in-process `usearch` HNSW backend is implemented in core; a remote vector service
/// would be a `cortex-server`-side adapter behind the same [`VectorBackend`] trait.
pub fn default_vector_backend(dimensions: usize) -> Result<Arc<dyn VectorBackend>> {
    Ok(Arc::new(store::vector::UsearchBackend::new(dimensions)?))
}

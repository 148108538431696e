//! Resolves `cortex-core`'s `Llm`/`Embedder`/`VectorBackend` trait objects from
//! config. Per spec §1, concrete network-backed provider clients are out of core
//! scope; today the only resolvable providers are the dependency-free reference
//! ones `cortex-core` ships, selected by the `"none"`/`"local"` provider names. A
//! networked provider (`"openai"`, `"anthropic"`, ...) would be a thin adapter
//! added here, behind the same traits, without touching `cortex-core`.

use std::sync::Arc;

use cortex_core::config::{EmbeddingConfig, LlmConfig};
use cortex_core::externals::{DeterministicHashEmbedder, Embedder, Llm, NullLlm};

pub fn resolve_llm(config: &LlmConfig) -> Arc<dyn Llm> {
    match config.provider.as_str() {
        "none" | "" => Arc::new(NullLlm),
        other => {
            tracing::warn!(
                provider = other,
                "unknown LLM provider, falling back to NullLlm"
            );
            Arc::new(NullLlm)
        }
    }
}

pub fn resolve_embedder(config: &EmbeddingConfig) -> Arc<dyn Embedder> {
    match config.provider.as_str() {
        "local" | "" => Arc::new(DeterministicHashEmbedder::new(config.dimensions)),
        other => {
            tracing::warn!(
                provider = other,
                "unknown embedding provider, falling back to the local hash embedder"
            );
            Arc::new(DeterministicHashEmbedder::new(config.dimensions))
        }
    }
}

//! Provider polymorphism (§9): `Llm`, `Embedder`, `VectorBackend` capability traits.
//!
//! Per §1, concrete provider clients (OpenAI, Anthropic, a local embedding model, a
//! hosted rerank API...) are out of core scope — thin adapters `cortex-server` wires
//! in at boot. This module only defines the interfaces and ships dependency-free
//! reference implementations so the crate is self-contained and testable without any
//! network access.

mod local;

pub use local::{DeterministicHashEmbedder, NullLlm};

use async_trait::async_trait;

use crate::error::Result;

/// A structured-decision request for the writer's LLM arbitration step (§4.3 step 6).
#[derive(Debug, Clone)]
pub struct ArbitrationRequest {
    pub existing_content: String,
    pub new_content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArbitrationAction {
    Keep,
    Replace,
    Merge,
}

#[derive(Debug, Clone)]
pub struct ArbitrationDecision {
    pub action: ArbitrationAction,
    pub merged_content: Option<String>,
    pub reasoning: String,
}

/// `Complete(prompt, options) -> string` plus the two structured call shapes Cortex's
/// core actually needs (arbitration and batch arbitration). A concrete provider
/// implements `complete` and the core builds prompts/parses responses around it;
/// `arbitrate`/`arbitrate_batch` have default implementations in terms of `complete`
/// so a minimal provider only needs to implement one method, but providers with a
/// native structured-output mode may override them directly.
#[async_trait]
pub trait Llm: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Batched arbitration per §4.3's batch path: exactly one call for N pairs. The
    /// default implementation falls back to N sequential `complete` calls wrapped as
    /// a single prompt-and-parse round — providers should override this when they
    /// have genuine multi-completion batching.
    async fn arbitrate_batch(
        &self,
        pairs: &[ArbitrationRequest],
    ) -> Result<Vec<ArbitrationDecision>> {
        let mut out = Vec::with_capacity(pairs.len());
        for pair in pairs {
            out.push(self.arbitrate(pair).await?);
        }
        Ok(out)
    }

    async fn arbitrate(&self, pair: &ArbitrationRequest) -> Result<ArbitrationDecision> {
        let prompt = format!(
            "EXISTING: {}\nNEW: {}\nReturn JSON {{action: keep|replace|merge, merged_content?, reasoning}}.",
            pair.existing_content, pair.new_content
        );
        let raw = self.complete(&prompt).await?;
        parse_arbitration(&raw)
    }

    /// Query expansion (§4.5 step 3): 2-3 synonym/rephrasing variants of `query`.
    async fn expand_query(&self, query: &str) -> Result<Vec<String>> {
        let prompt = format!("Give 2-3 alternate phrasings of: {query}");
        let raw = self.complete(&prompt).await?;
        Ok(raw
            .lines()
            .map(|l| l.trim().trim_start_matches(['-', '*']).trim().to_string())
            .filter(|l| !l.is_empty())
            .take(3)
            .collect())
    }

    /// LLM reranker (§4.5 step 7): relevance score in `[0, 1]` per candidate.
    async fn rerank(&self, query: &str, candidates: &[String]) -> Result<Vec<f64>> {
        let _ = (query, candidates);
        Err(crate::error::CortexError::upstream(
            "reranking not implemented by this provider",
        ))
    }
}

/// Best-effort JSON parse of an arbitration response; falls back to `Replace` (the
/// spec's documented safe default) on any parse failure.
fn parse_arbitration(raw: &str) -> Result<ArbitrationDecision> {
    #[derive(serde::Deserialize)]
    struct Raw {
        action: String,
        merged_content: Option<String>,
        #[serde(default)]
        reasoning: String,
    }
    match serde_json::from_str::<Raw>(raw) {
        Ok(r) => {
            let action = match r.action.as_str() {
                "keep" => ArbitrationAction::Keep,
                "merge" => ArbitrationAction::Merge,
                _ => ArbitrationAction::Replace,
            };
            Ok(ArbitrationDecision {
                action,
                merged_content: r.merged_content,
                reasoning: r.reasoning,
            })
        }
        Err(_) => Ok(ArbitrationDecision {
            action: ArbitrationAction::Replace,
            merged_content: None,
            reasoning: "parse failure, defaulted to replace".to_string(),
        }),
    }
}

/// `Embed(text) -> vec`.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
    fn dimensions(&self) -> usize;
}

/// `{Upsert, Search, Delete}` for the vector backend. Content-addressed by memory id
/// string key; `distance` is cosine distance, lower = more similar.
#[async_trait]
pub trait VectorBackend: Send + Sync {
    fn upsert(&self, id: &str, vector: &[f32]) -> Result<()>;
    fn search(&self, vector: &[f32], k: usize) -> Result<Vec<(String, f64)>>;
    fn delete(&self, ids: &[String]) -> Result<()>;
    fn dimensions(&self) -> usize;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arbitration_parse_failure_defaults_to_replace() {
        let decision = parse_arbitration("not json").unwrap();
        assert_eq!(decision.action, ArbitrationAction::Replace);
    }

    #[test]
    fn arbitration_parses_keep() {
        let decision = parse_arbitration(r#"{"action":"keep","reasoning":"same fact"}"#).unwrap();
        assert_eq!(decision.action, ArbitrationAction::Keep);
    }
}

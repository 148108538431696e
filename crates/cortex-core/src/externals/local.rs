//! Dependency-free reference implementations of the externals traits, used for
//! tests, offline development, and as the safe fallback when no provider is
//! configured. Analogous to the teacher's BM25-fallback-when-no-cross-encoder
//! pattern in its reranker.

use async_trait::async_trait;

use super::{ArbitrationAction, ArbitrationDecision, ArbitrationRequest, Embedder, Llm};
use crate::error::Result;

/// An `Llm` that never calls out. `complete` always errors `Upstream` so callers
/// take the documented degrade-locally path; `arbitrate` is overridden to always
/// return `Replace` directly (the spec's safe default) without a round-trip through
/// `complete`/JSON parsing.
#[derive(Debug, Clone, Default)]
pub struct NullLlm;

#[async_trait]
impl Llm for NullLlm {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        Err(crate::error::CortexError::upstream(
            "no LLM provider configured",
        ))
    }

    async fn arbitrate(&self, _pair: &ArbitrationRequest) -> Result<ArbitrationDecision> {
        Ok(ArbitrationDecision {
            action: ArbitrationAction::Replace,
            merged_content: None,
            reasoning: "no LLM provider configured, defaulted to replace".to_string(),
        })
    }

    async fn arbitrate_batch(
        &self,
        pairs: &[ArbitrationRequest],
    ) -> Result<Vec<ArbitrationDecision>> {
        Ok(pairs
            .iter()
            .map(|_| ArbitrationDecision {
                action: ArbitrationAction::Replace,
                merged_content: None,
                reasoning: "no LLM provider configured, defaulted to replace".to_string(),
            })
            .collect())
    }

    async fn expand_query(&self, _query: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

/// A cheap, deterministic, dependency-free embedding: hashes overlapping character
/// trigrams into a fixed-size vector and L2-normalizes it. Not semantically
/// meaningful, but stable and self-contained, so tests and offline dev exercise the
/// full hybrid-search/dedup machinery without pulling in a real embedding model.
#[derive(Debug, Clone)]
pub struct DeterministicHashEmbedder {
    dimensions: usize,
}

impl DeterministicHashEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

impl Default for DeterministicHashEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl Embedder for DeterministicHashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let normalized = text.to_lowercase();
        let mut v = vec![0f32; self.dimensions];
        if normalized.trim().is_empty() {
            return Ok(v);
        }
        let bytes: Vec<u8> = normalized.bytes().collect();
        let trigram_len = 3;
        let windows: Vec<&[u8]> = if bytes.len() >= trigram_len {
            bytes.windows(trigram_len).collect()
        } else {
            vec![bytes.as_slice()]
        };
        for w in windows {
            let h = fnv1a(w);
            let idx = (h as usize) % self.dimensions;
            let sign = if (h >> 63) & 1 == 0 { 1.0 } else { -1.0 };
            v[idx] += sign;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in v.iter_mut() {
                *x /= norm;
            }
        }
        Ok(v)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn embedder_is_deterministic() {
        let e = DeterministicHashEmbedder::new(64);
        let a = e.embed("Alex works at Acme Corp").await.unwrap();
        let b = e.embed("Alex works at Acme Corp").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[tokio::test]
    async fn different_text_differs() {
        let e = DeterministicHashEmbedder::new(64);
        let a = e.embed("Alex works at Acme Corp").await.unwrap();
        let b = e.embed("The weather is nice today").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn null_llm_degrades() {
        let llm = NullLlm;
        assert!(llm.complete("anything").await.is_err());
        let decision = llm
            .arbitrate(&ArbitrationRequest {
                existing_content: "a".into(),
                new_content: "b".into(),
            })
            .await
            .unwrap();
        assert_eq!(decision.action, ArbitrationAction::Replace);
    }
}

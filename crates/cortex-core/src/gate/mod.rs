//! Gate — the recall orchestrator (§4.5): clean the query, gate small talk, expand
//! into variants, run hybrid search per variant, fuse with RRF, score, merge, rerank,
//! prioritize, and format within a token budget.

pub mod inject;
pub mod scoring;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

use crate::config::{GateConfig, SearchConfig};
use crate::error::Result;
use crate::externals::{Embedder, Llm};
use crate::model::Memory;
use crate::sieve::sanitize_for_recall;
use crate::signals;
use crate::store::Store;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecallInput {
    pub query: String,
    pub agent_id: String,
    pub max_tokens: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecallMeta {
    pub injected_count: usize,
    pub candidate_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecallOutcome {
    pub context: String,
    pub results: Vec<Memory>,
    pub meta: RecallMeta,
}

pub struct Gate {
    store: Arc<Store>,
    embedder: Arc<dyn Embedder>,
    llm: Arc<dyn Llm>,
    config: GateConfig,
    search: SearchConfig,
}

impl Gate {
    pub fn new(
        store: Arc<Store>,
        embedder: Arc<dyn Embedder>,
        llm: Arc<dyn Llm>,
        config: GateConfig,
        search: SearchConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            llm,
            config,
            search,
        }
    }

    pub async fn recall(&self, input: RecallInput) -> Result<RecallOutcome> {
        let cleaned = sanitize_for_recall(&input.query);
        let max_tokens = input.max_tokens.unwrap_or(self.config.max_injection_tokens);

        if self.config.skip_small_talk && signals::is_small_talk(&cleaned) {
            return Ok(RecallOutcome {
                context: String::new(),
                results: Vec::new(),
                meta: RecallMeta {
                    injected_count: 0,
                    candidate_count: 0,
                },
            });
        }

        let mut variants = vec![cleaned.clone()];
        if self.config.query_expansion {
            if let Ok(expanded) = self.llm.expand_query(&cleaned).await {
                variants.extend(expanded);
            }
        }

        // Per-variant hybrid search + RRF fusion (step 4): "for each q in Q, in
        // parallel". Each variant's keyword and vector hits are fused independently
        // on its own task, then merged by id below (step 6).
        let mut hit_count: HashMap<String, usize> = HashMap::new();
        let pool = self.config.pool_size.max(1);

        let mut tasks = JoinSet::new();
        for (idx, variant) in variants.iter().cloned().enumerate() {
            let store = self.store.clone();
            let embedder = self.embedder.clone();
            let agent_id = input.agent_id.clone();
            let rrf_k = self.config.rrf_k;
            let hybrid = self.search.hybrid;
            let vector_weight = self.search.vector_weight;
            let text_weight = self.search.text_weight;
            tasks.spawn(async move {
                let keyword_hits = store.keyword_search(&agent_id, &variant, pool * 2)?;
                let keyword_ids: Vec<String> = keyword_hits.into_iter().map(|(id, _)| id).collect();

                // `search.hybrid = false` drops the vector channel entirely and falls
                // back to keyword-only retrieval, per §6's `search` config block.
                let vector_ids: Vec<String> = if hybrid {
                    let embedding = embedder.embed(&variant).await?;
                    let vector_hits = store.vector_search(&agent_id, &embedding, pool * 2)?;
                    vector_hits.into_iter().map(|(id, _)| id).collect()
                } else {
                    Vec::new()
                };

                let fused = scoring::weighted_reciprocal_rank_fusion(
                    &[(keyword_ids.as_slice(), text_weight), (vector_ids.as_slice(), vector_weight)],
                    rrf_k,
                );
                let mut ranked: Vec<(String, f64)> = fused.into_iter().collect();
                ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
                ranked.truncate(pool);
                Ok::<_, crate::error::CortexError>((idx, ranked))
            });
        }

        let mut per_variant_ranked: Vec<Vec<String>> = vec![Vec::new(); variants.len()];
        while let Some(result) = tasks.join_next().await {
            let (idx, ranked) = result.expect("gate variant search task panicked")?;
            for (id, _) in &ranked {
                *hit_count.entry(id.clone()).or_insert(0) += 1;
            }
            per_variant_ranked[idx] = ranked.into_iter().map(|(id, _)| id).collect();
        }

        // Merge across variants: union of ids, each keeping its max post-fusion score.
        let mut best_score: HashMap<String, f64> = HashMap::new();
        let now = Utc::now();
        for variant_ids in &per_variant_ranked {
            for (rank, id) in variant_ids.iter().enumerate() {
                let Some(memory) = self.store.get(id)? else { continue };
                if !memory.is_live() {
                    continue;
                }
                let rrf_component = 1.0 / (self.config.rrf_k + rank as f64);
                let score = rrf_component
                    * memory.layer.score_weight()
                    * scoring::recency_boost(memory.updated_at, self.search.recency_boost_window_days, now)
                    * scoring::access_boost(memory.access_count);
                let entry = best_score.entry(id.clone()).or_insert(0.0);
                if score > *entry {
                    *entry = score;
                }
            }
        }

        let candidate_count = best_score.len();
        let mut scored: Vec<(Memory, f64)> = Vec::with_capacity(candidate_count);
        for (id, base_score) in best_score {
            let Some(memory) = self.store.get(&id)? else { continue };
            let h = *hit_count.get(&id).unwrap_or(&1);
            let score = base_score * scoring::multi_hit_boost(h);
            scored.push((memory, score));
        }

        // Optional LLM reranker (step 7): blend with the fused score.
        if self.config.reranker.enabled && !scored.is_empty() {
            let contents: Vec<String> = scored.iter().map(|(m, _)| m.content.clone()).collect();
            if let Ok(rerank_scores) = self.llm.rerank(&cleaned, &contents).await {
                if rerank_scores.len() == scored.len() {
                    let w = self.config.reranker.weight;
                    for ((_, score), rerank) in scored.iter_mut().zip(rerank_scores) {
                        *score = w * rerank + (1.0 - w) * *score;
                    }
                }
            }
        }

        let prioritized = inject::prioritize(scored);
        let (context, injected_ids) = inject::format_context(&prioritized, max_tokens);

        for id in &injected_ids {
            let _ = self.store.update(
                id,
                crate::store::MemoryPatch {
                    access_count_delta: Some(1),
                    ..Default::default()
                },
            );
        }

        let results: Vec<Memory> = prioritized
            .into_iter()
            .filter(|(m, _)| injected_ids.contains(&m.id))
            .map(|(m, _)| m)
            .collect();

        Ok(RecallOutcome {
            context,
            results,
            meta: RecallMeta {
                injected_count: injected_ids.len(),
                candidate_count,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SieveConfig;
    use crate::externals::{DeterministicHashEmbedder, NullLlm};
    use crate::model::Category;
    use crate::writer::MemoryWriter;

    async fn test_gate() -> (Gate, Arc<Store>, Arc<MemoryWriter>) {
        let embedder: Arc<dyn Embedder> = Arc::new(DeterministicHashEmbedder::new(64));
        let vector = Arc::new(crate::store::vector::UsearchBackend::new(64).unwrap());
        let store = Arc::new(Store::open_in_memory(vector).unwrap());
        let llm: Arc<dyn Llm> = Arc::new(NullLlm);
        let writer = Arc::new(MemoryWriter::new(
            store.clone(),
            embedder.clone(),
            llm.clone(),
            SieveConfig::default(),
        ));
        let gate = Gate::new(store.clone(), embedder, llm, GateConfig::default(), SearchConfig::default());
        (gate, store, writer)
    }

    #[tokio::test]
    async fn recall_finds_ingested_memory() {
        let (gate, _store, writer) = test_gate().await;
        writer
            .process_new_memory(
                crate::writer::Extraction::new(Category::Fact, "the user lives in Austin", "test"),
                "agent-1",
            )
            .await
            .unwrap();

        let outcome = gate
            .recall(RecallInput {
                query: "where does the user live".to_string(),
                agent_id: "agent-1".to_string(),
                max_tokens: None,
            })
            .await
            .unwrap();
        assert!(outcome.meta.candidate_count >= 1);
    }

    #[tokio::test]
    async fn small_talk_returns_empty_context() {
        let (gate, _store, _writer) = test_gate().await;
        let outcome = gate
            .recall(RecallInput {
                query: "hi".to_string(),
                agent_id: "agent-1".to_string(),
                max_tokens: None,
            })
            .await
            .unwrap();
        assert!(outcome.context.is_empty());
    }
}

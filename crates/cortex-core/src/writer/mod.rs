//! `MemoryWriter` — the four-tier matcher, the single choke-point for every write
//! in the system (§4.3).

use std::sync::Arc;

use serde_json::json;

use crate::config::SieveConfig;
use crate::error::Result;
use crate::externals::{ArbitrationAction, ArbitrationRequest, Embedder, Llm};
use crate::model::{Category, Memory, NewMemory};
use crate::store::Store;

/// A candidate write fed into the matcher. Source-agnostic: both the fast channel's
/// regex hits and the deep channel's LLM extractions are normalized to this shape
/// before reaching `MemoryWriter`.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub category: Category,
    pub content: String,
    pub importance: f64,
    pub confidence: f64,
    pub source: String,
    pub metadata: serde_json::Value,
}

impl Extraction {
    pub fn new(category: Category, content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            category,
            content: content.into(),
            importance: 0.5,
            confidence: 0.7,
            source: source.into(),
            metadata: json!({}),
        }
    }
}

#[derive(Debug, Clone)]
pub enum WriteOutcome {
    Inserted(Memory),
    Skipped,
    SmartUpdated(Memory),
}

/// Which rung of the ladder (§4.3 steps 2-8) an extraction landed on, decided before
/// any LLM call so the batch path can collect every `NeedsLlm` pair first. Carries
/// the embedding computed during classification forward so the execute step never
/// re-embeds the same content.
enum Classification {
    Insert { embedding: Vec<f32> },
    /// Tier 1: exact duplicate, d < dupT.
    Skip,
    /// Tier 1.5: near-exact, auto-replace without LLM.
    AutoReplace { target: Memory, embedding: Vec<f32> },
    /// Tier 2: semantic overlap, needs LLM arbitration.
    NeedsLlm { target: Memory, embedding: Vec<f32> },
}

pub struct MemoryWriter {
    store: Arc<Store>,
    embedder: Arc<dyn Embedder>,
    llm: Arc<dyn Llm>,
    config: SieveConfig,
}

impl MemoryWriter {
    pub fn new(store: Arc<Store>, embedder: Arc<dyn Embedder>, llm: Arc<dyn Llm>, config: SieveConfig) -> Self {
        Self {
            store,
            embedder,
            llm,
            config,
        }
    }

    /// `processNewMemory` — single-extraction form, implemented in terms of the
    /// batch path so there is exactly one matcher implementation.
    pub async fn process_new_memory(&self, extraction: Extraction, agent_id: &str) -> Result<WriteOutcome> {
        let mut results = self.process_new_memory_batch(vec![extraction], agent_id).await?;
        Ok(results.remove(0))
    }

    /// `processNewMemoryBatch` (§4.3 batch path): classifies every extraction, then
    /// issues exactly one batched LLM call for the arbitration-needing subset.
    pub async fn process_new_memory_batch(
        &self,
        extractions: Vec<Extraction>,
        agent_id: &str,
    ) -> Result<Vec<WriteOutcome>> {
        let mut classifications = Vec::with_capacity(extractions.len());
        for extraction in &extractions {
            classifications.push(self.classify(extraction, agent_id).await?);
        }

        let needs_llm_idx: Vec<usize> = classifications
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c, Classification::NeedsLlm { .. }))
            .map(|(i, _)| i)
            .collect();

        let mut decisions: std::collections::HashMap<usize, (ArbitrationAction, Option<String>)> =
            std::collections::HashMap::new();

        if !needs_llm_idx.is_empty() {
            let pairs: Vec<ArbitrationRequest> = needs_llm_idx
                .iter()
                .map(|&i| {
                    let target = match &classifications[i] {
                        Classification::NeedsLlm { target, .. } => target,
                        _ => unreachable!(),
                    };
                    ArbitrationRequest {
                        existing_content: target.content.clone(),
                        new_content: extractions[i].content.clone(),
                    }
                })
                .collect();

            let batch_result = self.llm.arbitrate_batch(&pairs).await;
            let resolved = match batch_result {
                Ok(v) if v.len() == pairs.len() => v,
                // Batch parse failure (or provider mismatch): fall back to per-pair calls.
                _ => {
                    let mut per_pair = Vec::with_capacity(pairs.len());
                    for pair in &pairs {
                        per_pair.push(self.llm.arbitrate(pair).await?);
                    }
                    per_pair
                }
            };
            for (&i, decision) in needs_llm_idx.iter().zip(resolved.into_iter()) {
                decisions.insert(i, (decision.action, decision.merged_content));
            }
        }

        let mut out = Vec::with_capacity(extractions.len());
        for (i, (extraction, classification)) in extractions.into_iter().zip(classifications).enumerate() {
            let outcome = match classification {
                Classification::Insert { embedding } => self.insert(extraction, agent_id, embedding)?,
                Classification::Skip => WriteOutcome::Skipped,
                Classification::AutoReplace { target, embedding } => {
                    self.execute_supersede(extraction, target, agent_id, embedding)?
                }
                Classification::NeedsLlm { target, embedding } => {
                    let (action, merged) = decisions
                        .remove(&i)
                        .unwrap_or((ArbitrationAction::Replace, None));
                    match action {
                        ArbitrationAction::Keep => WriteOutcome::Skipped,
                        ArbitrationAction::Replace => {
                            self.execute_supersede(extraction, target, agent_id, embedding)?
                        }
                        ArbitrationAction::Merge => {
                            let mut merged_extraction = extraction;
                            if let Some(content) = merged {
                                merged_extraction.content = content;
                            }
                            self.execute_supersede(merged_extraction, target, agent_id, embedding)?
                        }
                    }
                }
            };
            out.push(outcome);
        }
        Ok(out)
    }

    /// Steps 1-6, 8 of §4.3: embed, search, and decide which ladder rung applies.
    /// Does not execute the decision — that happens afterward so the batch path can
    /// collect all `NeedsLlm` pairs before calling out.
    async fn classify(&self, extraction: &Extraction, agent_id: &str) -> Result<Classification> {
        let top_k = if extraction.category == Category::Correction { 10 } else { 3 };
        let embedding = self.embedder.embed(&extraction.content).await?;
        let candidates = self.store.vector_search(agent_id, &embedding, top_k)?;

        let family = extraction.category.family();
        let is_correction = extraction.category == Category::Correction;

        let mut best: Option<(Memory, f64)> = None;
        for (id, distance) in candidates {
            let Some(candidate) = self.store.get(&id)? else { continue };
            // Pinned memories are never arbitration candidates or supersede targets.
            if !candidate.is_live() || candidate.is_pinned {
                continue;
            }
            // Cross-family rule: user vs agent_* categories never supersede each other.
            if candidate.category.family() != family {
                continue;
            }
            if is_correction && !candidate.category.is_correction_target() {
                continue;
            }
            let better = match &best {
                None => true,
                Some((_, best_d)) => distance < *best_d,
            };
            if better {
                best = Some((candidate, distance));
            }
        }

        let Some((target, distance)) = best else {
            return Ok(Classification::Insert { embedding });
        };

        let dup_t = self.config.exact_dup_threshold;
        let sim_t = self.config.similarity_threshold;
        let sim_t_prime = if is_correction { (sim_t * 1.5).min(0.6) } else { sim_t };

        if distance < dup_t {
            return Ok(Classification::Skip);
        }
        if distance < dup_t * 1.5 {
            return Ok(Classification::AutoReplace { target, embedding });
        }
        if distance < sim_t_prime {
            return Ok(Classification::NeedsLlm { target, embedding });
        }
        Ok(Classification::Insert { embedding })
    }

    /// Tier 3 insert (§4.3 steps 2/8). Vector upsert happens after the row commits,
    /// matching the non-transactional window §5 documents for the vector index: a
    /// failed upsert here is logged and the memory stays text-only searchable.
    fn insert(&self, extraction: Extraction, agent_id: &str, embedding: Vec<f32>) -> Result<WriteOutcome> {
        let spec = NewMemory {
            agent_id: agent_id.to_string(),
            category: extraction.category,
            content: extraction.content,
            importance: extraction.importance,
            confidence: extraction.confidence,
            is_pinned: false,
            source: extraction.source,
            metadata: extraction.metadata,
            layer: None,
        };
        let memory = self.store.insert(spec)?;
        if let Err(err) = self.store.vector_upsert(&memory.id, &embedding) {
            tracing::warn!(memory_id = %memory.id, error = %err, "vector upsert failed, memory remains text-only");
        }
        Ok(WriteOutcome::Inserted(memory))
    }

    /// Step 7: in one transaction, insert the new row and mark the old one
    /// superseded; the vector upsert happens after commit (§5's documented
    /// non-transactional window for the vector index).
    fn execute_supersede(
        &self,
        extraction: Extraction,
        target: Memory,
        agent_id: &str,
        embedding: Vec<f32>,
    ) -> Result<WriteOutcome> {
        let is_correction = extraction.category == Category::Correction;
        let mut metadata = extraction.metadata.clone();
        if is_correction {
            metadata["feedback"] = json!({
                "feedback": "corrected",
                "original": target.content,
                "corrected": extraction.content,
            });
        }

        let spec = NewMemory {
            agent_id: agent_id.to_string(),
            category: extraction.category,
            content: extraction.content,
            importance: extraction.importance,
            confidence: extraction.confidence,
            is_pinned: false,
            source: extraction.source,
            metadata,
            layer: None,
        };

        let new_memory = self.store.insert_and_supersede(spec, &target.id)?;
        if let Err(err) = self.store.vector_upsert(&new_memory.id, &embedding) {
            tracing::warn!(memory_id = %new_memory.id, error = %err, "vector upsert failed, memory remains text-only");
        }
        Ok(WriteOutcome::SmartUpdated(new_memory))
    }
}

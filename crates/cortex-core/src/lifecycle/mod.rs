//! Lifecycle Engine (§4.6): decay, promotion, merging, archival, compression, and
//! profile synthesis, run in order on a configured schedule or on demand. Arming the
//! schedule is a `cortex-server` concern (§6.1); this module only implements one pass.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::{LayersConfig, LifecycleConfig, SieveConfig};
use crate::error::Result;
use crate::externals::{ArbitrationAction, ArbitrationRequest, Embedder, Llm};
use crate::model::{Category, Layer, Memory, NewMemory};
use crate::store::{ListFilter, MemoryPatch, Store};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleReport {
    pub dry_run: bool,
    pub decayed: usize,
    pub promoted: usize,
    pub merged: usize,
    pub archived: usize,
    pub compressed_groups: usize,
    pub compressed_entries: usize,
    pub deleted: usize,
    pub profiles_synthesized: usize,
}

pub struct LifecycleEngine {
    store: Arc<Store>,
    embedder: Arc<dyn Embedder>,
    llm: Arc<dyn Llm>,
    config: LifecycleConfig,
    sieve_config: SieveConfig,
    layers: LayersConfig,
}

impl LifecycleEngine {
    pub fn new(
        store: Arc<Store>,
        embedder: Arc<dyn Embedder>,
        llm: Arc<dyn Llm>,
        config: LifecycleConfig,
        sieve_config: SieveConfig,
        layers: LayersConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            llm,
            config,
            sieve_config,
            layers,
        }
    }

    /// Runs one full pass. `dry_run` performs every read and decision but no writes.
    pub async fn run(&self, dry_run: bool) -> Result<LifecycleReport> {
        let mut report = LifecycleReport {
            dry_run,
            ..Default::default()
        };

        report.decayed = self.decay_phase(dry_run)?;
        report.promoted = self.promotion_phase(dry_run)?;
        report.merged = self.merge_phase(dry_run).await?;
        report.archived = self.archival_phase(dry_run)?;
        let (groups, entries, deleted) = self.compression_phase(dry_run).await?;
        report.compressed_groups = groups;
        report.compressed_entries = entries;
        report.deleted = deleted;
        report.profiles_synthesized = self.profile_synthesis_phase(dry_run).await?;

        Ok(report)
    }

    /// Step 1: recompute `decay_score = exp(-lambda * age_days)` for every live
    /// memory; pinned memories are clamped to 1.0.
    fn decay_phase(&self, dry_run: bool) -> Result<usize> {
        let now = Utc::now();
        let batch = self.store.list(ListFilter::default(), self.config.max_batch_per_phase, 0)?;
        let mut touched = 0;
        for memory in batch {
            let age_days = (now - memory.updated_at).num_seconds() as f64 / 86_400.0;
            let decay_score = if memory.is_pinned {
                1.0
            } else {
                (-self.config.decay_lambda * age_days.max(0.0)).exp()
            };
            if (decay_score - memory.decay_score).abs() < f64::EPSILON {
                continue;
            }
            touched += 1;
            if !dry_run {
                self.store.update_decay_score(&memory.id, decay_score)?;
            }
        }
        Ok(touched)
    }

    /// Step 2: working memories with `importance * confidence >= promotionThreshold`
    /// and at least one access move to core.
    fn promotion_phase(&self, dry_run: bool) -> Result<usize> {
        let filter = ListFilter {
            layer: Some(Layer::Working),
            ..Default::default()
        };
        let batch = self.store.list(filter, self.config.max_batch_per_phase, 0)?;
        let mut promoted = 0;
        for memory in batch {
            let score = memory.importance * memory.confidence;
            if score < self.config.promotion_threshold || memory.access_count == 0 {
                continue;
            }
            promoted += 1;
            if !dry_run {
                self.store.update(
                    &memory.id,
                    MemoryPatch {
                        layer: Some(Layer::Core),
                        ..Default::default()
                    },
                )?;
            }
        }
        Ok(promoted)
    }

    /// Step 3: within core, find near-duplicate pairs and collapse them via the same
    /// LLM arbitration decision the writer uses, applied in bulk across existing rows
    /// instead of new-extraction-vs-existing-row.
    async fn merge_phase(&self, dry_run: bool) -> Result<usize> {
        let dup_threshold = self.sieve_config.exact_dup_threshold * 1.5;
        let mut merged = 0;

        for agent_id in self.store.list_agent_ids()? {
            let filter = ListFilter {
                agent_id: Some(agent_id.clone()),
                layer: Some(Layer::Core),
                ..Default::default()
            };
            let core_memories = self.store.list(filter, self.config.max_batch_per_phase, 0)?;
            let mut resolved: HashSet<String> = HashSet::new();

            for memory in &core_memories {
                if resolved.contains(&memory.id) || memory.is_pinned {
                    continue;
                }
                let embedding = self.embedder.embed(&memory.content).await?;
                let candidates = self.store.vector_search(&agent_id, &embedding, 5)?;
                let Some((other_id, _)) = candidates.into_iter().find(|(id, distance)| {
                    *id != memory.id && *distance < dup_threshold && !resolved.contains(id)
                }) else {
                    continue;
                };
                let Some(other) = core_memories.iter().find(|m| m.id == other_id) else {
                    continue;
                };
                if other.is_pinned || other.category.family() != memory.category.family() {
                    continue;
                }

                let decision = self
                    .llm
                    .arbitrate(&ArbitrationRequest {
                        existing_content: memory.content.clone(),
                        new_content: other.content.clone(),
                    })
                    .await?;
                if decision.action == ArbitrationAction::Keep {
                    continue;
                }

                merged += 1;
                resolved.insert(memory.id.clone());
                resolved.insert(other.id.clone());
                if dry_run {
                    continue;
                }

                let (keep, drop) = if memory.created_at >= other.created_at {
                    (memory, other)
                } else {
                    (other, memory)
                };
                if let Some(content) = &decision.merged_content {
                    self.store.update(
                        &keep.id,
                        MemoryPatch {
                            content: Some(content.clone()),
                            ..Default::default()
                        },
                    )?;
                }
                self.store.update(
                    &drop.id,
                    MemoryPatch {
                        superseded_by: Some(Some(keep.id.clone())),
                        ..Default::default()
                    },
                )?;
            }
        }
        Ok(merged)
    }

    /// Step 4: core memories decayed below threshold, old enough, move to archive.
    ///
    /// Age is measured from `created_at`, not `updated_at`: the decay phase above
    /// writes a new `decay_score` to this same memory on nearly every tick, and
    /// `Store::update` always stamps `updated_at = now()` regardless of which
    /// fields changed, so keying the floor off `updated_at` would reset it on
    /// every pass and a memory could never age past it.
    fn archival_phase(&self, dry_run: bool) -> Result<usize> {
        let now = Utc::now();
        let filter = ListFilter {
            layer: Some(Layer::Core),
            ..Default::default()
        };
        let batch = self.store.list(filter, self.config.max_batch_per_phase, 0)?;
        let mut archived = 0;
        for memory in batch {
            if memory.is_pinned || memory.decay_score >= self.config.archive_threshold {
                continue;
            }
            let age_days = (now - memory.created_at).num_seconds() / 86_400;
            if age_days < self.config.archive_age_floor_days {
                continue;
            }
            archived += 1;
            if !dry_run {
                self.store.update(
                    &memory.id,
                    MemoryPatch {
                        layer: Some(Layer::Archive),
                        ..Default::default()
                    },
                )?;
            }
        }
        Ok(archived)
    }

    /// Step 5: archive entries past TTL, grouped by (agent, category), condensed by
    /// LLM into one `summary` memory written back to core, or deleted if
    /// `compressBackToCore` is false. Returns (groups, entries touched, deleted).
    async fn compression_phase(&self, dry_run: bool) -> Result<(usize, usize, usize)> {
        let now = Utc::now();
        let mut groups_done = 0;
        let mut entries_touched = 0;
        let mut deleted = 0;

        for agent_id in self.store.list_agent_ids()? {
            let filter = ListFilter {
                agent_id: Some(agent_id.clone()),
                layer: Some(Layer::Archive),
                ..Default::default()
            };
            let archive_memories = self.store.list(filter, self.config.max_batch_per_phase, 0)?;

            let mut groups: HashMap<Category, Vec<Memory>> = HashMap::new();
            for memory in archive_memories {
                let age_days = (now - memory.updated_at).num_seconds() / 86_400;
                if age_days < self.layers.archive.ttl_days {
                    continue;
                }
                groups.entry(memory.category).or_default().push(memory);
            }

            for (category, members) in groups {
                if members.is_empty() {
                    continue;
                }
                groups_done += 1;
                entries_touched += members.len();
                if dry_run {
                    continue;
                }

                if !self.layers.archive.compress_back_to_core {
                    for m in &members {
                        self.store.delete(&m.id)?;
                    }
                    deleted += members.len();
                    continue;
                }

                let joined = members
                    .iter()
                    .map(|m| m.content.as_str())
                    .collect::<Vec<_>>()
                    .join("\n- ");
                let prompt = format!(
                    "Condense these {} archived memories into one terse summary paragraph:\n- {}",
                    category.as_str(),
                    joined
                );
                let summary = match self.llm.complete(&prompt).await {
                    Ok(s) => s,
                    Err(_) => members
                        .iter()
                        .map(|m| m.content.as_str())
                        .collect::<Vec<_>>()
                        .join("; "),
                };

                let spec = NewMemory {
                    agent_id: agent_id.clone(),
                    category: Category::Summary,
                    content: summary,
                    importance: 0.5,
                    confidence: 0.6,
                    is_pinned: false,
                    source: "lifecycle:compression".to_string(),
                    metadata: serde_json::json!({ "compressedFrom": members.iter().map(|m| &m.id).collect::<Vec<_>>() }),
                    layer: Some(Layer::Core),
                };
                let summary_memory = self.store.insert(spec)?;
                for m in &members {
                    self.store.update(
                        &m.id,
                        MemoryPatch {
                            superseded_by: Some(Some(summary_memory.id.clone())),
                            ..Default::default()
                        },
                    )?;
                }
            }
        }
        Ok((groups_done, entries_touched, deleted))
    }

    /// Step 6: per agent, condense core memories into a terse profile string stored
    /// in the agent's metadata; Sieve reads this back for deep-channel injection.
    async fn profile_synthesis_phase(&self, dry_run: bool) -> Result<usize> {
        let mut synthesized = 0;
        for agent_id in self.store.list_agent_ids()? {
            let filter = ListFilter {
                agent_id: Some(agent_id.clone()),
                layer: Some(Layer::Core),
                ..Default::default()
            };
            let core_memories = self.store.list(filter, self.config.max_batch_per_phase, 0)?;
            if core_memories.is_empty() {
                continue;
            }
            let joined = core_memories
                .iter()
                .map(|m| m.content.as_str())
                .collect::<Vec<_>>()
                .join("\n- ");
            let prompt = format!("Condense this user's known facts into a terse profile:\n- {joined}");
            let profile = match self.llm.complete(&prompt).await {
                Ok(p) => p,
                Err(_) => continue,
            };
            synthesized += 1;
            if !dry_run {
                self.store.set_agent_profile(&agent_id, &profile)?;
            }
        }
        Ok(synthesized)
    }
}

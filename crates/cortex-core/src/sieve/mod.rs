//! Sieve — the ingest orchestrator (§4.4): sanitize, window, fast channel, deep
//! channel, relation extraction, audit. The fast channel always completes its writes
//! before the deep channel's dedup search runs, since both share the same store and
//! vector index (§5 ordering guarantee).

mod sanitize;
mod windowing;

pub use windowing::{ConversationTurn, Role};

/// Shared with [`crate::gate`]: both the ingest and recall paths strip previously
/// injected context before doing anything else with the text (§4.4 step 1, §4.5 step 1).
pub use sanitize::sanitize as sanitize_for_recall;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::SieveConfig;
use crate::error::Result;
use crate::externals::{Embedder, Llm};
use crate::model::{new_id, Category, Channel, ExtractionLog, ExtractionLogBuilder, NewRelation, Predicate};
use crate::signals;
use crate::store::Store;
use crate::writer::{Extraction, MemoryWriter, WriteOutcome};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestInput {
    pub agent_id: String,
    pub session_id: Option<String>,
    pub user_message: String,
    pub assistant_message: Option<String>,
    pub messages: Option<Vec<ConversationTurn>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct IngestOutcome {
    pub written: u32,
    pub deduplicated: u32,
    pub smart_updated: u32,
}

#[derive(Debug, Deserialize)]
struct ExtractionResponse {
    #[serde(default)]
    nothing_extracted: bool,
    #[serde(default)]
    memories: Vec<ExtractedMemory>,
    #[serde(default)]
    relations: Vec<ExtractedRelation>,
}

#[derive(Debug, Deserialize)]
struct ExtractedMemory {
    category: String,
    content: String,
    #[serde(default = "default_importance")]
    importance: f64,
    #[serde(default = "default_confidence")]
    confidence: f64,
}

fn default_importance() -> f64 {
    0.5
}

fn default_confidence() -> f64 {
    0.7
}

#[derive(Debug, Deserialize)]
struct ExtractedRelation {
    subject: String,
    predicate: String,
    object: String,
    #[serde(default = "default_confidence")]
    confidence: f64,
}

pub struct Sieve {
    store: Arc<Store>,
    writer: MemoryWriter,
    extraction_llm: Arc<dyn Llm>,
    config: SieveConfig,
}

impl Sieve {
    pub fn new(
        store: Arc<Store>,
        embedder: Arc<dyn Embedder>,
        arbitration_llm: Arc<dyn Llm>,
        extraction_llm: Arc<dyn Llm>,
        config: SieveConfig,
    ) -> Self {
        let writer = MemoryWriter::new(store.clone(), embedder, arbitration_llm, config.clone());
        Self {
            store,
            writer,
            extraction_llm,
            config,
        }
    }

    pub async fn ingest(&self, input: IngestInput) -> Result<IngestOutcome> {
        let cleaned_user = sanitize::sanitize(&input.user_message);
        if cleaned_user.chars().count() < 3 {
            return Ok(IngestOutcome::default());
        }

        // Per-agent ingest backpressure (§5): two overlapping ingests for the same
        // agent must not race the matcher's dedup-search-then-write step against
        // each other. Held across both channels, since both write through the
        // same store and vector index for this agent.
        let agent_lock = self.store.lock_agent(&input.agent_id);
        let _guard = agent_lock.lock().await;

        let windowed_context = input.messages.as_deref().map(|turns| {
            windowing::window(
                turns,
                self.config.context_messages,
                self.config.max_conversation_chars,
                200,
            )
        });

        let mut outcome = IngestOutcome::default();
        let mut first_memory_id: Option<String> = None;

        let fast_log = self
            .run_fast_channel(&input, &cleaned_user, &mut outcome, &mut first_memory_id)
            .await?;
        self.store.insert_extraction_log(&fast_log)?;

        let deep_log = self
            .run_deep_channel(&input, &cleaned_user, windowed_context.as_deref(), &mut outcome, &mut first_memory_id)
            .await?;
        self.store.insert_extraction_log(&deep_log)?;

        Ok(outcome)
    }

    /// Step 3: regex signals, synchronous and cheap, written before the deep channel
    /// ever looks at the vector index.
    async fn run_fast_channel(
        &self,
        input: &IngestInput,
        cleaned_user: &str,
        outcome: &mut IngestOutcome,
        first_memory_id: &mut Option<String>,
    ) -> Result<ExtractionLog> {
        let started = Instant::now();
        let mut builder = ExtractionLogBuilder::default();

        if self.config.fast_channel_enabled {
            let detected = signals::detect(cleaned_user);
            let source = match &input.session_id {
                Some(sid) => format!("session:{sid}"),
                None => "session:unknown".to_string(),
            };
            let extractions: Vec<Extraction> = detected
                .into_iter()
                .map(|d| {
                    let mut e = Extraction::new(d.category, d.content, source.clone());
                    e.importance = d.importance;
                    e.confidence = d.confidence;
                    e
                })
                .collect();

            if !extractions.is_empty() {
                let results = self
                    .writer
                    .process_new_memory_batch(extractions, &input.agent_id)
                    .await?;
                for result in results {
                    record_outcome(&mut builder, outcome, first_memory_id, result);
                }
            }
        }

        Ok(build_log(
            builder,
            &input.agent_id,
            input.session_id.clone(),
            Channel::Fast,
            cleaned_user,
            started,
        ))
    }

    /// Step 4-5: LLM-based structured extraction plus relation upsert, skipped
    /// entirely for small talk.
    async fn run_deep_channel(
        &self,
        input: &IngestInput,
        cleaned_user: &str,
        windowed_context: Option<&str>,
        outcome: &mut IngestOutcome,
        first_memory_id: &mut Option<String>,
    ) -> Result<ExtractionLog> {
        let started = Instant::now();
        let mut builder = ExtractionLogBuilder::default();

        if signals::is_small_talk(cleaned_user) {
            return Ok(build_log(
                builder,
                &input.agent_id,
                input.session_id.clone(),
                Channel::Deep,
                cleaned_user,
                started,
            ));
        }

        let mut profile_preamble = String::new();
        if self.config.profile_injection {
            if let Some(agent) = self.store.get_agent(&input.agent_id)? {
                if !agent.profile.is_empty() {
                    profile_preamble = format!("Known user profile: {}\n\n", agent.profile);
                }
            }
        }

        let exchange = match windowed_context {
            Some(ctx) if !ctx.is_empty() => ctx.to_string(),
            _ => format!(
                "[USER] {}\n{}",
                cleaned_user,
                input
                    .assistant_message
                    .as_deref()
                    .map(|a| format!("[ASSISTANT] {a}\n"))
                    .unwrap_or_default()
            ),
        };

        let prompt = format!(
            "{profile_preamble}Extract durable facts, preferences, constraints and relations from this \
             exchange. Return JSON only: {{\"nothing_extracted\": true}} if nothing is worth \
             remembering, otherwise {{\"memories\": [{{\"category\", \"content\", \"importance\", \
             \"confidence\"}}], \"relations\": [{{\"subject\", \"predicate\", \"object\", \"confidence\"}}]}}.\n\n{exchange}"
        );

        // An unavailable or misbehaving extraction provider degrades to "nothing
        // extracted" rather than failing the whole ingest; the fast channel's writes
        // from this same call already landed.
        let raw = match self.extraction_llm.complete(&prompt).await {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(error = %err, "extraction LLM unavailable, deep channel skipped");
                return Ok(build_log(
                    builder,
                    &input.agent_id,
                    input.session_id.clone(),
                    Channel::Deep,
                    cleaned_user,
                    started,
                ));
            }
        };
        builder.raw_output = Some(raw.clone());

        let parsed: ExtractionResponse = match serde_json::from_str(&raw) {
            Ok(p) => p,
            Err(_) => {
                return Ok(build_log(
                    builder,
                    &input.agent_id,
                    input.session_id.clone(),
                    Channel::Deep,
                    cleaned_user,
                    started,
                ))
            }
        };

        if parsed.nothing_extracted {
            return Ok(build_log(
                builder,
                &input.agent_id,
                input.session_id.clone(),
                Channel::Deep,
                cleaned_user,
                started,
            ));
        }

        let valid: Vec<Extraction> = parsed
            .memories
            .into_iter()
            .filter_map(|m| validate_extracted_memory(m))
            .collect();

        if !valid.is_empty() {
            let results = self
                .writer
                .process_new_memory_batch(valid, &input.agent_id)
                .await?;
            for result in results {
                record_outcome(&mut builder, outcome, first_memory_id, result);
            }
        }

        if self.config.relation_extraction && !parsed.relations.is_empty() {
            for rel in parsed.relations {
                let Ok(predicate) = Predicate::from_str(&rel.predicate) else {
                    continue;
                };
                self.store.insert_relation(NewRelation {
                    agent_id: input.agent_id.clone(),
                    subject: rel.subject,
                    predicate,
                    object: rel.object,
                    confidence: rel.confidence.clamp(0.0, 1.0),
                    memory_id: first_memory_id.clone(),
                })?;
            }
        }

        Ok(build_log(
            builder,
            &input.agent_id,
            input.session_id.clone(),
            Channel::Deep,
            cleaned_user,
            started,
        ))
    }
}

fn validate_extracted_memory(m: ExtractedMemory) -> Option<Extraction> {
    if m.content.chars().count() < 3 {
        return None;
    }
    let category = Category::from_str(&m.category).ok()?;
    if !(0.0..=1.0).contains(&m.importance) {
        return None;
    }
    let mut extraction = Extraction::new(category, m.content, "deep_channel");
    extraction.importance = m.importance;
    extraction.confidence = m.confidence.clamp(0.0, 1.0);
    Some(extraction)
}

fn record_outcome(
    builder: &mut ExtractionLogBuilder,
    outcome: &mut IngestOutcome,
    first_memory_id: &mut Option<String>,
    result: WriteOutcome,
) {
    match &result {
        WriteOutcome::Inserted(m) | WriteOutcome::SmartUpdated(m) => {
            if first_memory_id.is_none() {
                *first_memory_id = Some(m.id.clone());
            }
        }
        WriteOutcome::Skipped => {}
    }
    match &result {
        WriteOutcome::Inserted(_) => outcome.written += 1,
        WriteOutcome::Skipped => outcome.deduplicated += 1,
        WriteOutcome::SmartUpdated(_) => outcome.smart_updated += 1,
    }
    builder.record(result);
}

fn build_log(
    builder: ExtractionLogBuilder,
    agent_id: &str,
    session_id: Option<String>,
    channel: Channel,
    exchange: &str,
    started: Instant,
) -> ExtractionLog {
    let preview: String = exchange.chars().take(200).collect();
    ExtractionLog {
        id: new_id(),
        agent_id: agent_id.to_string(),
        session_id,
        channel,
        exchange_preview: preview,
        raw_output: builder.raw_output,
        parsed_count: builder.parsed_count,
        written: builder.written,
        deduplicated: builder.deduplicated,
        smart_updated: builder.smart_updated,
        latency_ms: started.elapsed().as_millis() as u64,
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::externals::{DeterministicHashEmbedder, NullLlm};

    fn test_sieve() -> Sieve {
        let embedder = Arc::new(DeterministicHashEmbedder::new(64));
        let vector = Arc::new(crate::store::vector::UsearchBackend::new(64).unwrap());
        let store = Arc::new(Store::open_in_memory(vector).unwrap());
        let llm = Arc::new(NullLlm);
        Sieve::new(store, embedder, llm.clone(), llm, SieveConfig::default())
    }

    #[tokio::test]
    async fn short_message_is_skipped() {
        let sieve = test_sieve();
        let outcome = sieve
            .ingest(IngestInput {
                agent_id: "a1".to_string(),
                session_id: None,
                user_message: "hi".to_string(),
                assistant_message: None,
                messages: None,
            })
            .await
            .unwrap();
        assert_eq!(outcome.written, 0);
    }

    #[tokio::test]
    async fn fast_channel_captures_name() {
        let sieve = test_sieve();
        let outcome = sieve
            .ingest(IngestInput {
                agent_id: "a1".to_string(),
                session_id: Some("s1".to_string()),
                user_message: "My name is Alex and I live in Austin.".to_string(),
                assistant_message: None,
                messages: None,
            })
            .await
            .unwrap();
        assert!(outcome.written >= 1);
    }
}

//! Per-channel-run audit record. Purely for audit/UI; no core algorithm reads it back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Fast,
    Deep,
}

#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionLog {
    pub id: String,
    pub agent_id: String,
    pub session_id: Option<String>,
    pub channel: Channel,
    pub exchange_preview: String,
    pub raw_output: Option<String>,
    pub parsed_count: u32,
    pub written: u32,
    pub deduplicated: u32,
    pub smart_updated: u32,
    pub latency_ms: u64,
    pub created_at: DateTime<Utc>,
}

/// Accumulates counts across a channel run; flushed to a single [`ExtractionLog`] row.
#[derive(Debug, Clone, Default)]
pub struct ExtractionLogBuilder {
    pub parsed_count: u32,
    pub written: u32,
    pub deduplicated: u32,
    pub smart_updated: u32,
    pub raw_output: Option<String>,
}

impl ExtractionLogBuilder {
    pub fn record(&mut self, outcome: crate::writer::WriteOutcome) {
        self.parsed_count += 1;
        match outcome {
            crate::writer::WriteOutcome::Inserted(_) => self.written += 1,
            crate::writer::WriteOutcome::Skipped => self.deduplicated += 1,
            crate::writer::WriteOutcome::SmartUpdated(_) => self.smart_updated += 1,
        }
    }
}

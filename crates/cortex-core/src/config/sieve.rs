use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SieveConfig {
    pub fast_channel_enabled: bool,
    /// High-importance fast-channel signals skip batching and write immediately.
    pub high_signal_immediate: bool,
    /// Run fast and deep channels concurrently where ordering allows (§5 still
    /// requires fast-channel writes to land before deep-channel dedup search).
    pub parallel_channels: bool,
    pub profile_injection: bool,
    pub relation_extraction: bool,
    pub smart_update: bool,
    pub exact_dup_threshold: f64,
    pub similarity_threshold: f64,
    pub context_messages: usize,
    pub max_conversation_chars: usize,
    pub max_extraction_tokens: usize,
}

impl Default for SieveConfig {
    fn default() -> Self {
        Self {
            fast_channel_enabled: true,
            high_signal_immediate: true,
            parallel_channels: false,
            profile_injection: true,
            relation_extraction: true,
            smart_update: true,
            exact_dup_threshold: 0.10,
            similarity_threshold: 0.25,
            context_messages: 4,
            max_conversation_chars: 4000,
            max_extraction_tokens: 2000,
        }
    }
}

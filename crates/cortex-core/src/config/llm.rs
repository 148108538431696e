use serde::{Deserialize, Serialize};

/// Provider/model selection for one LLM role. Resolution to a concrete [`crate::
/// externals::Llm`] implementation happens at `cortex-server` boot (provider clients
/// are out of core scope per §1); the core only holds this descriptive config plus
/// the resolved trait object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "none".to_string(),
            model: String::new(),
            api_key: None,
            base_url: None,
            timeout_ms: 10_000,
        }
    }
}

/// `llm.extraction` and `llm.lifecycle` per §6 Configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct LlmRolesConfig {
    pub extraction: LlmConfig,
    pub lifecycle: LlmConfig,
}

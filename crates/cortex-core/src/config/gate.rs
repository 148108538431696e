use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RerankerConfig {
    pub enabled: bool,
    pub provider: String,
    /// Blend weight for rerank score vs. original fused score (§4.5 step 7).
    pub weight: f64,
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: "llm".to_string(),
            weight: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GateConfig {
    pub max_injection_tokens: usize,
    pub skip_small_talk: bool,
    pub query_expansion: bool,
    pub reranker: RerankerConfig,
    /// RRF fusion constant (§9 Open Question — conventional default, tunable).
    pub rrf_k: f64,
    /// Target pool size per fused list before post-fusion scoring.
    pub pool_size: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            max_injection_tokens: 1000,
            skip_small_talk: true,
            query_expansion: false,
            reranker: RerankerConfig::default(),
            rrf_k: 60.0,
            pool_size: 30,
        }
    }
}

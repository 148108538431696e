//! Per-subsystem configuration, aggregated into one [`CortexConfig`].
//!
//! Every field from spec §6's Configuration table is represented here. All structs
//! derive `Default` with the spec's stated defaults and `#[serde(default)]` so a
//! partial TOML/JSON document only needs to name the fields it overrides.

mod embedding;
mod gate;
mod layers;
mod lifecycle;
mod llm;
mod search;
mod sieve;
mod storage;

pub use embedding::EmbeddingConfig;
pub use gate::{GateConfig, RerankerConfig};
pub use layers::{ArchiveLayerConfig, CoreLayerConfig, LayersConfig, WorkingLayerConfig};
pub use lifecycle::LifecycleConfig;
pub use llm::{LlmConfig, LlmRolesConfig};
pub use search::SearchConfig;
pub use sieve::SieveConfig;
pub use storage::StorageConfig;

use serde::{Deserialize, Serialize};

/// Top-level configuration aggregating all subsystem configs.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CortexConfig {
    pub storage: StorageConfig,
    pub llm: LlmRolesConfig,
    pub embedding: EmbeddingConfig,
    pub search: SearchConfig,
    pub gate: GateConfig,
    pub sieve: SieveConfig,
    pub lifecycle: LifecycleConfig,
    pub layers: LayersConfig,
}

impl CortexConfig {
    /// Load config from a TOML string, falling back to defaults for missing fields.
    /// TOML *parsing location* (file discovery, `--config`/`CORTEX_CONFIG`) is a
    /// `cortex-server` concern; the schema lives here since core constructors take
    /// it directly.
    pub fn from_toml(toml_str: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = CortexConfig::default();
        assert_eq!(cfg.sieve.exact_dup_threshold, 0.10);
        assert_eq!(cfg.sieve.similarity_threshold, 0.25);
        assert_eq!(cfg.lifecycle.decay_lambda, 0.03);
        assert_eq!(cfg.gate.rrf_k, 60.0);
        assert_eq!(cfg.layers.working.ttl_hours, 48);
        assert_eq!(cfg.layers.archive.ttl_days, 90);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg = CortexConfig::from_toml("[sieve]\nexactDupThreshold = 0.2\n").unwrap();
        assert_eq!(cfg.sieve.exact_dup_threshold, 0.2);
        assert_eq!(cfg.sieve.similarity_threshold, 0.25);
    }
}

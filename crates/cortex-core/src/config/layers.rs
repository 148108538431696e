use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkingLayerConfig {
    pub ttl_hours: i64,
}

impl Default for WorkingLayerConfig {
    fn default() -> Self {
        Self { ttl_hours: 48 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CoreLayerConfig {
    pub max_entries: usize,
}

impl Default for CoreLayerConfig {
    fn default() -> Self {
        Self { max_entries: 100_000 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArchiveLayerConfig {
    pub ttl_days: i64,
    pub compress_back_to_core: bool,
}

impl Default for ArchiveLayerConfig {
    fn default() -> Self {
        Self {
            ttl_days: 90,
            compress_back_to_core: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct LayersConfig {
    pub working: WorkingLayerConfig,
    pub core: CoreLayerConfig,
    pub archive: ArchiveLayerConfig,
}

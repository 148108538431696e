use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LifecycleConfig {
    /// Cron-like schedule string; parsing/arming lives in `cortex-server`.
    pub schedule: String,
    pub promotion_threshold: f64,
    pub archive_threshold: f64,
    pub decay_lambda: f64,
    /// Minimum age in days before a core memory is archival-eligible, even if its
    /// decay score has already fallen below `archive_threshold`.
    pub archive_age_floor_days: i64,
    /// Per-phase max-batch cap so a tick cannot stop-the-world scan (§5).
    pub max_batch_per_phase: usize,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            schedule: "0 */6 * * *".to_string(),
            promotion_threshold: 0.72,
            archive_threshold: 0.2,
            decay_lambda: 0.03,
            archive_age_floor_days: 30,
            max_batch_per_phase: 500,
        }
    }
}

use serde::{Deserialize, Serialize};

/// The top-level `search` config block (§6): whether hybrid fusion runs at all and
/// the raw weights handed to [`crate::gate`]'s scoring step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchConfig {
    pub hybrid: bool,
    pub vector_weight: f64,
    pub text_weight: f64,
    pub recency_boost_window_days: i64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            hybrid: true,
            vector_weight: 0.7,
            text_weight: 0.3,
            recency_boost_window_days: 14,
        }
    }
}

//! Agent/tenant record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    pub name: String,
    /// Per-agent config overrides, merged over `CortexConfig` defaults.
    pub config_overrides: serde_json::Value,
    /// Synthesized user profile (lifecycle step 6), read by Sieve for deep-channel
    /// prompt injection. Empty string until the first profile synthesis pass.
    pub profile: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Agent {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            config_overrides: serde_json::json!({}),
            profile: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

use std::sync::{Arc, RwLock};

use cortex_core::externals::Embedder;
use cortex_core::{Cortex, CortexConfig};

/// Shared application state, handed to every handler via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub cortex: Arc<Cortex>,
    /// Kept alongside `Cortex` so `/search` can embed a raw debug query without
    /// a dedicated `Gate`/`Sieve` entry point for it.
    pub embedder: Arc<dyn Embedder>,
    pub auth_token: Option<Arc<str>>,
    /// The boot-time configuration snapshot served by `GET /config` and
    /// `GET /agents/:id/config`. `PATCH /config` updates this snapshot only —
    /// live reconfiguration of already-constructed Sieve/Gate/Lifecycle
    /// instances is out of scope (DESIGN.md).
    pub config: Arc<RwLock<CortexConfig>>,
}

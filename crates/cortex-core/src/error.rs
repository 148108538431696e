//! Error kinds shared across Store, Sieve, Gate, and the Lifecycle Engine.

/// The five error kinds Cortex's components classify every collaborator failure into.
///
/// Propagation policy: component boundaries (Sieve, Gate, Lifecycle) catch every
/// collaborator error and classify it into one of these. `Validation` is the caller's
/// fault and is never logged as an error; `Upstream` degrades the calling operation
/// locally; `Invariant` and `Fatal` stop the operation and surface as 5xx.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum CortexError {
    /// Malformed input: unknown category/predicate, out-of-range numeric, too-short
    /// content. Surfaced to the caller with 4xx semantics.
    #[error("validation error: {0}")]
    Validation(String),

    /// An LLM, embedding, or vector backend call failed or timed out. The caller
    /// recovers locally (fast-channel-only ingest, baseline hybrid recall, `replace`
    /// arbitration default).
    #[error("upstream failure: {0}")]
    Upstream(String),

    /// A store write would violate an invariant (layer/expires mismatch, supersede
    /// cycle). Fatal for that operation; the store itself remains consistent.
    #[error("invariant violated: {0}")]
    Invariant(String),

    /// A lifecycle tick overran its per-phase batch cap. Not surfaced to users; the
    /// remaining work is picked up by the next tick.
    #[error("schedule miss: {0}")]
    ScheduleMiss(String),

    /// The store is unavailable or corrupted. The process should refuse writes and
    /// report unhealthy.
    #[error("fatal store error: {0}")]
    Fatal(String),

    /// Database error, wrapped as `Fatal` territory but kept distinct so
    /// `rusqlite::Error` can convert via `#[from]`.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error, typically from opening the db file or vector index sidecar.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error, e.g. malformed LLM structured output or
    /// malformed `metadata` blobs.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl CortexError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }

    pub fn schedule_miss(msg: impl Into<String>) -> Self {
        Self::ScheduleMiss(msg.into())
    }

    pub fn fatal(msg: impl Into<String>) -> Self {
        Self::Fatal(msg.into())
    }

    /// Whether this error is the caller's fault (used by the REST adapter to pick a
    /// status code, and by log call sites to decide on `debug` vs `warn`/`error`).
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, CortexError>;

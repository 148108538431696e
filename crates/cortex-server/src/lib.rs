//! Library surface behind the `cortex-server` binary, split out so the HTTP
//! layer can be driven in-process by integration tests via `tower::ServiceExt`
//! without a live TCP listener.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod providers;
pub mod schedule;
pub mod state;

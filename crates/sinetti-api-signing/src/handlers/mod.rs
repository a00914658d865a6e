//! HTTP handlers.

pub mod auth;
pub mod documents;
pub mod payment;

/// Liveness probe.
pub async fn healthz() -> &'static str {
    "ok"
}

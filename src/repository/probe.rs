//! Availability probe for the credential store.

use std::time::Duration;

use super::UserRepository;

/// Outcome of a probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Reachable,
    Unreachable,
}

/// Race the store's cheapest read against a timer.
///
/// Advisory only: a `Reachable` result says nothing about the next write. On
/// timeout the in-flight read is dropped, not cancelled on the wire.
pub async fn probe(store: &dyn UserRepository, timeout: Duration) -> Availability {
    match tokio::time::timeout(timeout, store.ping()).await {
        Ok(Ok(())) => Availability::Reachable,
        Ok(Err(e)) => {
            tracing::warn!("⚠️  Database connection check failed: {}", e);
            Availability::Unreachable
        }
        Err(_) => {
            tracing::warn!("⚠️  Database connection check timed out after {:?}", timeout);
            Availability::Unreachable
        }
    }
}

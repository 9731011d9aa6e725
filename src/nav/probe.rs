//! Cheap "can this directory be expanded?" check, distinct from a listing.

use tracing::debug;

use crate::host::Host;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    HasChildren,
    Empty,
    /// The probe failed. The cause is not classified further; callers lock
    /// the node either way.
    Denied,
}

/// Ask `host` whether `path` has at least one accessible subdirectory.
///
/// Yields to the scheduler once before issuing the request so that a burst
/// of freshly mounted nodes spreads its probes over several turns.
pub async fn probe(host: &dyn Host, path: &str) -> ProbeOutcome {
    tokio::task::yield_now().await;
    match host.has_child_directories(path).await {
        Ok(true) => ProbeOutcome::HasChildren,
        Ok(false) => ProbeOutcome::Empty,
        Err(e) => {
            debug!(path, error = %e, "probe failed, locking node");
            ProbeOutcome::Denied
        }
    }
}

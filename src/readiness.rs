//! Startup readiness polling.
//!
//! A probe reports one of three states; the poller sleeps a fixed interval
//! between probes until the target is ready, fails terminally, or the
//! deadline passes.

use crate::catalog::CatalogAdapter;
use crate::error::{CatalogError, CatalogResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;

/// Outcome of a single readiness probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeStatus {
    /// Not ready yet; keep polling.
    Pending,
    Ready,
    /// Will never become ready; stop polling.
    Failed(String),
}

/// How often and how long to poll.
#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollSettings {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }
}

/// Poll `probe` until it reports [`ProbeStatus::Ready`].
///
/// Returns `Timeout` when the deadline passes first, and `Unavailable` when
/// the probe reports a terminal failure. The probe always runs at least once,
/// even with a zero timeout.
pub async fn poll_until_ready<F, Fut>(
    name: &str,
    settings: PollSettings,
    mut probe: F,
) -> CatalogResult<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ProbeStatus>,
{
    let started = Instant::now();
    let deadline = started + settings.timeout;
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        match probe().await {
            ProbeStatus::Ready => {
                info!(target_name = %name, attempts, "Ready");
                return Ok(());
            }
            ProbeStatus::Failed(reason) => {
                warn!(target_name = %name, attempts, reason = %reason, "Readiness check failed");
                return Err(CatalogError::unavailable(
                    format!("{} failed readiness check: {}", name, reason),
                    "Check the service logs and configuration",
                ));
            }
            ProbeStatus::Pending => {
                debug!(target_name = %name, attempts, "Not ready yet");
            }
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(CatalogError::timeout(
                format!("waiting for {}", name),
                started.elapsed().as_secs(),
            ));
        }
        tokio::time::sleep(settings.interval.min(deadline - now)).await;
    }
}

/// Probe a catalog by pinging it.
///
/// Unreachable backends are still starting up; any other error is terminal.
pub async fn probe_catalog(adapter: &dyn CatalogAdapter) -> ProbeStatus {
    match adapter.ping().await {
        Ok(()) => ProbeStatus::Ready,
        Err(e) if e.is_retryable() => {
            debug!(catalog = %adapter.kind(), error = %e, "Catalog not reachable yet");
            ProbeStatus::Pending
        }
        Err(e) => ProbeStatus::Failed(e.to_string()),
    }
}

/// Wait for every adapter in turn.
pub async fn wait_for_catalogs(
    adapters: &[&dyn CatalogAdapter],
    settings: PollSettings,
) -> CatalogResult<()> {
    for adapter in adapters {
        let name = adapter.kind().display_name();
        poll_until_ready(name, settings, || probe_catalog(*adapter)).await?;
    }
    Ok(())
}

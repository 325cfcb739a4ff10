//! Per-client admission control

use super::clock::{Clock, SystemClock};
use super::identity::ClientKey;
use super::store::{InMemoryWindowStore, WindowOutcome, WindowPolicy, WindowStore};
use crate::config::AdmissionConfig;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Outcome of an admission check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimitDecision {
    pub client_key: ClientKey,
    pub allowed: bool,
    /// Whole seconds until a retry can succeed; present iff denied
    pub retry_after_seconds: Option<u64>,
    /// Admissions permitted per window
    pub limit: u32,
    /// Admissions left in the current window
    pub remaining: u32,
    /// Whole seconds until the oldest admission leaves the window
    pub reset_after_seconds: u64,
}

/// Fixed quota of admissions per client key over a trailing window
#[derive(Debug, Clone)]
pub struct AdmissionController {
    policy: WindowPolicy,
    store: Arc<dyn WindowStore>,
    clock: Arc<dyn Clock>,
}

impl AdmissionController {
    /// Create an in-memory controller on the system clock
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            policy: WindowPolicy {
                max_requests,
                window,
            },
            store: Arc::new(InMemoryWindowStore::new()),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn from_config(config: &AdmissionConfig) -> Self {
        Self::new(config.max_requests, config.window())
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the counter store
    pub fn with_store(mut self, store: Arc<dyn WindowStore>) -> Self {
        self.store = store;
        self
    }

    pub fn limit(&self) -> u32 {
        self.policy.max_requests
    }

    pub fn window(&self) -> Duration {
        self.policy.window
    }

    /// Check and, when allowed, record an admission for `key`
    pub fn check(&self, key: &ClientKey) -> RateLimitDecision {
        let now = self.clock.now();
        match self.store.try_acquire(key, now, &self.policy) {
            WindowOutcome::Admitted {
                remaining,
                reset_after,
            } => RateLimitDecision {
                client_key: key.clone(),
                allowed: true,
                retry_after_seconds: None,
                limit: self.policy.max_requests,
                remaining,
                reset_after_seconds: self.whole_seconds(reset_after),
            },
            WindowOutcome::Rejected { retry_after } => {
                let retry_after = self.whole_seconds(retry_after);
                debug!(
                    client = %key,
                    retry_after_seconds = retry_after,
                    "admission denied"
                );
                RateLimitDecision {
                    client_key: key.clone(),
                    allowed: false,
                    retry_after_seconds: Some(retry_after),
                    limit: self.policy.max_requests,
                    remaining: 0,
                    reset_after_seconds: retry_after,
                }
            }
        }
    }

    /// Round up to whole seconds, clamped to [1, W]
    fn whole_seconds(&self, duration: Duration) -> u64 {
        let upper = ceil_secs(self.policy.window).max(1);
        ceil_secs(duration).clamp(1, upper)
    }

    /// Drop keys that have no admissions inside the window
    pub fn purge_idle(&self) -> usize {
        self.store.purge_idle(self.clock.now(), self.policy.window)
    }

    /// Forget all recorded admissions
    pub fn reset(&self) {
        self.store.reset();
    }

    pub fn tracked_keys(&self) -> usize {
        self.store.tracked_keys()
    }

    /// Purge idle keys periodically until the returned handle is aborted
    pub fn spawn_purge_task(&self, every: Duration) -> JoinHandle<()> {
        let controller = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let purged = controller.purge_idle();
                if purged > 0 {
                    info!(purged, remaining = controller.tracked_keys(), "purged idle admission keys");
                }
            }
        })
    }
}

fn ceil_secs(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos().div_ceil(1_000_000_000)).unwrap_or(u64::MAX)
}

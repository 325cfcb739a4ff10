//! Sliding-window counter storage

use super::identity::ClientKey;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

/// Quota applied to every client key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPolicy {
    pub max_requests: u32,
    pub window: Duration,
}

/// Result of a single check-and-record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowOutcome {
    Admitted {
        /// Admissions still available in the current window
        remaining: u32,
        /// Time until the oldest admission leaves the window
        reset_after: Duration,
    },
    Rejected {
        /// Time until the oldest admission leaves the window
        retry_after: Duration,
    },
}

/// Storage for per-key admission timestamps
///
/// `try_acquire` must check and record atomically for a given key. An
/// implementation backed by a shared store serves multi-instance deployments.
pub trait WindowStore: Send + Sync + fmt::Debug {
    fn try_acquire(&self, key: &ClientKey, now: Instant, policy: &WindowPolicy) -> WindowOutcome;

    /// Drop keys with no admissions left inside the window; returns how many
    fn purge_idle(&self, now: Instant, window: Duration) -> usize;

    fn reset(&self);

    fn tracked_keys(&self) -> usize;
}

/// In-process store; one `VecDeque` of admission instants per key
#[derive(Debug, Default)]
pub struct InMemoryWindowStore {
    windows: DashMap<ClientKey, VecDeque<Instant>>,
}

impl InMemoryWindowStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn evict_expired(timestamps: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(front) = timestamps.front() {
        if now.saturating_duration_since(*front) >= window {
            timestamps.pop_front();
        } else {
            break;
        }
    }
}

fn time_until_expiry(oldest: Instant, now: Instant, window: Duration) -> Duration {
    window.saturating_sub(now.saturating_duration_since(oldest))
}

impl WindowStore for InMemoryWindowStore {
    fn try_acquire(&self, key: &ClientKey, now: Instant, policy: &WindowPolicy) -> WindowOutcome {
        // The entry guard holds the shard lock for the whole check-and-record.
        let mut entry = self.windows.entry(key.clone()).or_default();
        let timestamps = entry.value_mut();
        evict_expired(timestamps, now, policy.window);

        if timestamps.len() < policy.max_requests as usize {
            timestamps.push_back(now);
            let oldest = timestamps.front().copied().unwrap_or(now);
            WindowOutcome::Admitted {
                remaining: policy.max_requests.saturating_sub(timestamps.len() as u32),
                reset_after: time_until_expiry(oldest, now, policy.window),
            }
        } else {
            let retry_after = timestamps
                .front()
                .map(|oldest| time_until_expiry(*oldest, now, policy.window))
                .unwrap_or(policy.window);
            WindowOutcome::Rejected { retry_after }
        }
    }

    fn purge_idle(&self, now: Instant, window: Duration) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, timestamps| {
            evict_expired(timestamps, now, window);
            !timestamps.is_empty()
        });
        before.saturating_sub(self.windows.len())
    }

    fn reset(&self) {
        self.windows.clear();
    }

    fn tracked_keys(&self) -> usize {
        self.windows.len()
    }
}

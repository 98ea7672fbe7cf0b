//! Per-subject cooldown
//!
//! Remembers when each subject last performed a protected action and rejects
//! repeats inside the interval. Decisions for one subject are taken under
//! that subject's map shard lock, so racing callers see exactly one winner.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::debug;

/// Outcome of a cooldown check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownDecision {
    Allowed,
    Denied { remaining: Duration },
}

impl CooldownDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Time left before the next attempt is allowed
    pub fn remaining(&self) -> Option<Duration> {
        match self {
            Self::Allowed => None,
            Self::Denied { remaining } => Some(*remaining),
        }
    }
}

/// Keyed last-action tracker
#[derive(Debug, Clone, Default)]
pub struct Cooldown {
    entries: Arc<DashMap<String, Instant>>,
}

impl Cooldown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to perform the action for `subject` now
    pub fn try_consume(&self, subject: &str, interval: Duration) -> CooldownDecision {
        self.try_consume_at(subject, interval, Instant::now())
    }

    /// Try to perform the action for `subject` at `now`
    ///
    /// A permitted attempt records `now`; a denied one leaves the entry alone.
    pub fn try_consume_at(&self, subject: &str, interval: Duration, now: Instant) -> CooldownDecision {
        match self.entries.entry(subject.to_string()) {
            Entry::Occupied(mut entry) => {
                let elapsed = now.saturating_duration_since(*entry.get());

                if elapsed < interval {
                    CooldownDecision::Denied {
                        remaining: interval - elapsed,
                    }
                } else {
                    entry.insert(now);
                    CooldownDecision::Allowed
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
                CooldownDecision::Allowed
            }
        }
    }

    /// Forget the last action for `subject`
    ///
    /// Used when the protected action failed after the slot was taken.
    pub fn reset(&self, subject: &str) {
        self.entries.remove(subject);
    }

    /// Remove entries older than `max_age`, returning how many were removed
    pub fn sweep(&self, max_age: Duration) -> usize {
        self.sweep_at(max_age, Instant::now())
    }

    pub fn sweep_at(&self, max_age: Duration, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, last| now.saturating_duration_since(*last) <= max_age);
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Spawn a task that sweeps every `every`, dropping entries older than `max_age`
    pub fn start_sweep_task(&self, every: Duration, max_age: Duration) -> JoinHandle<()> {
        let cooldown = self.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.tick().await;

            loop {
                interval.tick().await;

                let removed = cooldown.sweep(max_age);
                if removed > 0 {
                    debug!(removed, remaining = cooldown.len(), "Swept cooldown entries");
                }
            }
        })
    }
}

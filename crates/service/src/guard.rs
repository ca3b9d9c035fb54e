//! Abuse guard: advisory per-address limits on API calls and vote mutations.
//!
//! Two independent layers:
//! - [`FixedWindowLimiter`]: request counts per address in fixed windows.
//! - [`VoteTracker`]: sliding window of accepted vote mutations per address,
//!   with a minimum spacing between consecutive mutations.
//!
//! A vote takes its tracker slot up front and hands back a
//! [`VoteReservation`]. If the vote is then rejected or fails to store, the
//! caller releases the slot so only accepted mutations count.
//!
//! State is process-local; separate server instances keep separate windows.

use std::collections::VecDeque;
use std::time::Duration;

use dashmap::DashMap;
use futurebattles_core::{
    GuardLimits, RATE_LIMIT_WINDOW_SECS, VOTE_MIN_INTERVAL_MILLIS, VOTE_TRACKER_WINDOW_SECS,
};
use tokio::time::Instant;

/// Why a request was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardRejection {
    /// Fixed-window budget exhausted.
    WindowExhausted { retry_after: Duration },
    /// Too many vote mutations inside the sliding window.
    TooManyVotes { retry_after: Duration },
    /// Previous vote mutation was too recent.
    TooFast { retry_after: Duration },
}

impl GuardRejection {
    pub const fn retry_after(&self) -> Duration {
        match self {
            Self::WindowExhausted { retry_after }
            | Self::TooManyVotes { retry_after }
            | Self::TooFast { retry_after } => *retry_after,
        }
    }
}

/// Tracker slot taken by a vote that has not been stored yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteReservation {
    stamp: Instant,
}

struct Window {
    started_at: Instant,
    count: u32,
}

/// Fixed-window counter keyed by client address.
pub struct FixedWindowLimiter {
    windows: DashMap<String, Window>,
    limit: u32,
    window: Duration,
}

impl FixedWindowLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self { windows: DashMap::new(), limit, window }
    }

    /// Count one request from `addr`, rejecting it when the window is full.
    pub fn check(&self, addr: &str) -> Result<(), GuardRejection> {
        let now = Instant::now();
        let mut entry = self
            .windows
            .entry(addr.to_owned())
            .or_insert_with(|| Window { started_at: now, count: 0 });
        let elapsed = now.saturating_duration_since(entry.started_at);
        if elapsed >= self.window {
            entry.started_at = now;
            entry.count = 0;
        }
        if entry.count >= self.limit {
            let retry_after = self.window.saturating_sub(elapsed);
            return Err(GuardRejection::WindowExhausted { retry_after });
        }
        entry.count = entry.count.saturating_add(1);
        Ok(())
    }

    /// Drop windows that have fully elapsed.
    pub fn prune(&self) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, w| w.started_at.elapsed() < self.window);
        before.saturating_sub(self.windows.len())
    }
}

/// Sliding window of accepted vote mutations keyed by client address.
pub struct VoteTracker {
    history: DashMap<String, VecDeque<Instant>>,
    max_in_window: usize,
    window: Duration,
    min_interval: Duration,
}

impl VoteTracker {
    pub fn new(max_in_window: usize, window: Duration, min_interval: Duration) -> Self {
        Self { history: DashMap::new(), max_in_window, window, min_interval }
    }

    /// Record a mutation from `addr` unless it breaks either rule.
    pub fn check_and_record(&self, addr: &str) -> Result<VoteReservation, GuardRejection> {
        let now = Instant::now();
        let mut stamps = self.history.entry(addr.to_owned()).or_default();
        while stamps.front().is_some_and(|t| now.saturating_duration_since(*t) >= self.window) {
            stamps.pop_front();
        }
        if stamps.len() >= self.max_in_window {
            let oldest = stamps.front().copied().unwrap_or(now);
            let retry_after = self.window.saturating_sub(now.saturating_duration_since(oldest));
            return Err(GuardRejection::TooManyVotes { retry_after });
        }
        if let Some(last) = stamps.back() {
            let since_last = now.saturating_duration_since(*last);
            if since_last < self.min_interval {
                return Err(GuardRejection::TooFast {
                    retry_after: self.min_interval.saturating_sub(since_last),
                });
            }
        }
        stamps.push_back(now);
        Ok(VoteReservation { stamp: now })
    }

    /// Give back a slot taken by [`Self::check_and_record`].
    pub fn release(&self, addr: &str, reservation: VoteReservation) {
        let Some(mut stamps) = self.history.get_mut(addr) else {
            return;
        };
        if let Some(pos) = stamps.iter().rposition(|t| *t == reservation.stamp) {
            stamps.remove(pos);
        }
    }

    /// Drop addresses with no mutation inside the window.
    pub fn prune(&self) -> usize {
        let before = self.history.len();
        self.history.retain(|_, stamps| stamps.back().is_some_and(|t| t.elapsed() < self.window));
        before.saturating_sub(self.history.len())
    }
}

/// Both limiting layers, configured together.
pub struct AbuseGuard {
    api: FixedWindowLimiter,
    votes: FixedWindowLimiter,
    tracker: VoteTracker,
}

impl AbuseGuard {
    pub fn new(limits: GuardLimits) -> Self {
        let window = Duration::from_secs(RATE_LIMIT_WINDOW_SECS);
        Self {
            api: FixedWindowLimiter::new(limits.api_per_window, window),
            votes: FixedWindowLimiter::new(limits.votes_per_window, window),
            tracker: VoteTracker::new(
                limits.votes_per_tracker_window,
                Duration::from_secs(VOTE_TRACKER_WINDOW_SECS),
                Duration::from_millis(VOTE_MIN_INTERVAL_MILLIS),
            ),
        }
    }

    /// General API budget.
    pub fn check_api(&self, addr: &str) -> Result<(), GuardRejection> {
        self.api.check(addr)
    }

    /// Vote mutation budget, then the sliding-window tracker.
    pub fn check_vote(&self, addr: &str) -> Result<VoteReservation, GuardRejection> {
        self.votes.check(addr)?;
        self.tracker.check_and_record(addr).inspect_err(|rejection| {
            tracing::warn!(addr, ?rejection, "vote mutation rejected by tracker");
        })
    }

    /// Undo the tracker slot of a vote that was not stored.
    pub fn release_vote(&self, addr: &str, reservation: VoteReservation) {
        self.tracker.release(addr, reservation);
    }

    /// Drop idle per-address state.
    pub fn prune(&self) -> usize {
        self.api.prune() + self.votes.prune() + self.tracker.prune()
    }
}

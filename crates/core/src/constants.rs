//! Shared constants for futurebattles.
//!
//! Centralizes limits and defaults used by more than one crate.

/// PostgreSQL connection pool: maximum connections.
pub const PG_POOL_MAX_CONNECTIONS: u32 = 20;

/// PostgreSQL connection pool: acquire timeout in seconds.
pub const PG_POOL_ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// PostgreSQL connection pool: idle timeout in seconds.
pub const PG_POOL_IDLE_TIMEOUT_SECS: u64 = 300;

/// Name of the long-lived cookie carrying the anonymous voter identity.
pub const VOTER_COOKIE_NAME: &str = "voterId";

/// Identity cookie lifetime in days.
pub const VOTER_COOKIE_MAX_AGE_DAYS: i64 = 365;

/// Header every vote mutation must carry, and its expected value.
pub const VOTE_MARKER_HEADER: &str = "x-requested-with";
pub const VOTE_MARKER_VALUE: &str = "XMLHttpRequest";

/// Number of leading historical pairings whose candidates count as "recent".
pub const DEFAULT_RECENT_PAIRING_WINDOW: usize = 50;

/// Length of the per-address vote tracking window in seconds.
pub const VOTE_TRACKER_WINDOW_SECS: u64 = 5 * 60;

/// Accepted vote mutations per address inside the tracking window.
pub const DEFAULT_VOTE_WINDOW_MAX: usize = 15;

/// Minimum spacing between two vote mutations from one address, in milliseconds.
pub const VOTE_MIN_INTERVAL_MILLIS: u64 = 1000;

/// Fixed-window limiter window length in seconds.
pub const RATE_LIMIT_WINDOW_SECS: u64 = 60;

/// General API calls allowed per address per window.
pub const DEFAULT_API_RATE_LIMIT: u32 = 100;

/// Vote mutation calls allowed per address per window.
pub const DEFAULT_VOTE_RATE_LIMIT: u32 = 10;

/// Message returned with every 429 response.
pub const RATE_LIMIT_MESSAGE: &str = "Too many requests, please try again later.";

/// Number of voted matchups returned by the top-matchups view.
pub const TOP_MATCHUPS_LIMIT: usize = 10;

/// Number of candidates returned by the top-emcees view.
pub const TOP_EMCEES_LIMIT: usize = 6;

/// Maximum names accepted by one image batch request.
pub const MAX_IMAGE_BATCH: usize = 12;

/// Window used for the `activeToday` statistic, in hours.
pub const ACTIVE_TODAY_HOURS: i64 = 24;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futurebattles_core::VoteStats;

use crate::error::StorageError;

/// Aggregate statistics and health.
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Totals, with `active_today` counting votes created at or after `active_since`.
    async fn vote_stats(&self, active_since: DateTime<Utc>) -> Result<VoteStats, StorageError>;

    /// Round-trip to the store.
    async fn ping(&self) -> Result<(), StorageError>;
}

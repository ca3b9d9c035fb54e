use std::collections::HashMap;

use async_trait::async_trait;
use futurebattles_core::{MatchupId, VoteOutcome};

use crate::error::StorageError;

/// Vote persistence with one active vote per (voter, matchup).
#[async_trait]
pub trait VoteStore: Send + Sync {
    /// Insert a vote if absent, delete it if present, atomically.
    ///
    /// Returns the action taken and the pair's count after it. A concurrent
    /// identical insert that loses the race yields `StorageError::Duplicate`.
    async fn toggle_vote(
        &self,
        matchup: MatchupId,
        voter: &str,
    ) -> Result<VoteOutcome, StorageError>;

    /// Current vote count for one pair.
    async fn vote_count(&self, matchup: MatchupId) -> Result<i64, StorageError>;

    /// Vote count for every pair with at least one vote.
    async fn vote_counts(&self) -> Result<HashMap<MatchupId, i64>, StorageError>;

    /// Pairs the voter currently has a vote on.
    async fn voted_matchups(&self, voter: &str) -> Result<Vec<MatchupId>, StorageError>;
}

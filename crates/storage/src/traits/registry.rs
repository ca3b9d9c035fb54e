use async_trait::async_trait;
use futurebattles_core::{Candidate, HistoricalPairing, MatchupId};

use crate::error::StorageError;

/// Read access to the candidate registry.
#[async_trait]
pub trait CandidateStore: Send + Sync {
    /// All candidates ordered by name.
    async fn list_candidates(&self) -> Result<Vec<Candidate>, StorageError>;

    /// How many of `ids` exist.
    async fn count_existing(&self, ids: &[i32]) -> Result<usize, StorageError>;
}

/// Read access to the historical pairing record.
#[async_trait]
pub trait PairingStore: Send + Sync {
    /// All pairings in ascending id (import) order.
    async fn list_pairings(&self) -> Result<Vec<HistoricalPairing>, StorageError>;

    /// Whether the pair has already been matched, in either stored order.
    async fn is_paired(&self, matchup: MatchupId) -> Result<bool, StorageError>;
}

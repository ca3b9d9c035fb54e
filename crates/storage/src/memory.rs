//! In-memory storage backend.
//!
//! Mirrors the PostgreSQL schema constraints (unique vote per pair and voter,
//! candidate references) so services behave identically on either backend.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futurebattles_core::{
    Candidate, HistoricalPairing, MatchupId, VoteAction, VoteOutcome, VoteStats,
};
use tokio::sync::RwLock;

use crate::error::StorageError;
use crate::traits::{CandidateStore, PairingStore, StatsStore, VoteStore};

#[derive(Debug, Clone)]
struct StoredVote {
    matchup: MatchupId,
    voter: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Inner {
    candidates: Vec<Candidate>,
    pairings: Vec<HistoricalPairing>,
    votes: Vec<StoredVote>,
}

impl Inner {
    fn count_for(&self, matchup: MatchupId) -> i64 {
        let count = self.votes.iter().filter(|v| v.matchup == matchup).count();
        i64::try_from(count).unwrap_or(i64::MAX)
    }

    fn has_candidate(&self, id: i32) -> bool {
        self.candidates.iter().any(|c| c.id == id)
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Candidates get ids `1..=names.len()` in order; pairings reference those ids
    /// and get ids in slice order.
    pub fn seeded(names: &[&str], pairings: &[(i32, i32)]) -> Self {
        let candidates = names
            .iter()
            .zip(1_i32..)
            .map(|(name, id)| Candidate::new(id, *name))
            .collect();
        let pairings = pairings
            .iter()
            .zip(1_i32..)
            .map(|((a, b), id)| HistoricalPairing::new(id, *a, *b))
            .collect();
        Self {
            inner: Arc::new(RwLock::new(Inner { candidates, pairings, votes: Vec::new() })),
        }
    }

    /// Insert a vote with an explicit timestamp, bypassing the toggle.
    pub async fn insert_vote_at(
        &self,
        matchup: MatchupId,
        voter: &str,
        created_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut inner = self.inner.write().await;
        if inner.votes.iter().any(|v| v.matchup == matchup && v.voter == voter) {
            return Err(StorageError::Duplicate(format!("vote on {matchup} by {voter}")));
        }
        inner.votes.push(StoredVote { matchup, voter: voter.to_owned(), created_at });
        Ok(())
    }
}

#[async_trait]
impl CandidateStore for MemoryStorage {
    async fn list_candidates(&self) -> Result<Vec<Candidate>, StorageError> {
        let mut candidates = self.inner.read().await.candidates.clone();
        candidates.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(candidates)
    }

    async fn count_existing(&self, ids: &[i32]) -> Result<usize, StorageError> {
        let inner = self.inner.read().await;
        let unique: HashSet<i32> = ids.iter().copied().collect();
        Ok(unique.into_iter().filter(|id| inner.has_candidate(*id)).count())
    }
}

#[async_trait]
impl PairingStore for MemoryStorage {
    async fn list_pairings(&self) -> Result<Vec<HistoricalPairing>, StorageError> {
        let mut pairings = self.inner.read().await.pairings.clone();
        pairings.sort_by_key(|p| p.id);
        Ok(pairings)
    }

    async fn is_paired(&self, matchup: MatchupId) -> Result<bool, StorageError> {
        Ok(self
            .inner
            .read()
            .await
            .pairings
            .iter()
            .any(|p| p.involves(matchup.low()) && p.involves(matchup.high())))
    }
}

#[async_trait]
impl VoteStore for MemoryStorage {
    async fn toggle_vote(
        &self,
        matchup: MatchupId,
        voter: &str,
    ) -> Result<VoteOutcome, StorageError> {
        let mut inner = self.inner.write().await;
        if !inner.has_candidate(matchup.low()) || !inner.has_candidate(matchup.high()) {
            return Err(StorageError::InvalidReference(format!(
                "matchup {matchup} references an unknown emcee"
            )));
        }

        let before = inner.votes.len();
        inner.votes.retain(|v| !(v.matchup == matchup && v.voter == voter));
        let action = if inner.votes.len() < before {
            VoteAction::Unvoted
        } else {
            inner.votes.push(StoredVote {
                matchup,
                voter: voter.to_owned(),
                created_at: Utc::now(),
            });
            VoteAction::Voted
        };
        Ok(VoteOutcome { action, new_count: inner.count_for(matchup) })
    }

    async fn vote_count(&self, matchup: MatchupId) -> Result<i64, StorageError> {
        Ok(self.inner.read().await.count_for(matchup))
    }

    async fn vote_counts(&self) -> Result<HashMap<MatchupId, i64>, StorageError> {
        let inner = self.inner.read().await;
        let mut counts: HashMap<MatchupId, i64> = HashMap::new();
        for vote in &inner.votes {
            *counts.entry(vote.matchup).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn voted_matchups(&self, voter: &str) -> Result<Vec<MatchupId>, StorageError> {
        Ok(self
            .inner
            .read()
            .await
            .votes
            .iter()
            .filter(|v| v.voter == voter)
            .map(|v| v.matchup)
            .collect())
    }
}

#[async_trait]
impl StatsStore for MemoryStorage {
    async fn vote_stats(&self, active_since: DateTime<Utc>) -> Result<VoteStats, StorageError> {
        let inner = self.inner.read().await;
        let to_i64 = |n: usize| i64::try_from(n).unwrap_or(i64::MAX);
        let voters: HashSet<&str> = inner.votes.iter().map(|v| v.voter.as_str()).collect();
        let matchups: HashSet<MatchupId> = inner.votes.iter().map(|v| v.matchup).collect();
        let active = inner.votes.iter().filter(|v| v.created_at >= active_since).count();
        Ok(VoteStats {
            total_votes: to_i64(inner.votes.len()),
            unique_voters: to_i64(voters.len()),
            total_matchups: to_i64(matchups.len()),
            active_today: to_i64(active),
        })
    }

    async fn ping(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

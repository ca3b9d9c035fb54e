//! Unified storage backend with enum dispatch.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futurebattles_core::{Candidate, HistoricalPairing, MatchupId, VoteOutcome, VoteStats};

use crate::error::StorageError;
use crate::memory::MemoryStorage;
use crate::pg_storage::PgStorage;
use crate::traits::{CandidateStore, PairingStore, StatsStore, VoteStore};

macro_rules! dispatch {
    ($self:expr, $trait:path, $method:ident ( $($arg:expr),* $(,)? )) => {
        match $self {
            StorageBackend::Postgres(s) => <PgStorage as $trait>::$method(s, $($arg),*).await,
            StorageBackend::Memory(s) => <MemoryStorage as $trait>::$method(s, $($arg),*).await,
        }
    };
}

#[derive(Clone, Debug)]
pub enum StorageBackend {
    Postgres(PgStorage),
    Memory(MemoryStorage),
}

impl StorageBackend {
    pub async fn new_postgres(database_url: &str) -> Result<Self, StorageError> {
        Ok(Self::Postgres(PgStorage::new(database_url).await?))
    }

    pub fn new_memory(storage: MemoryStorage) -> Self {
        Self::Memory(storage)
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Memory(_) => "memory",
        }
    }
}

// ── CandidateStore ───────────────────────────────────────────────

#[async_trait]
impl CandidateStore for StorageBackend {
    async fn list_candidates(&self) -> Result<Vec<Candidate>, StorageError> {
        dispatch!(self, CandidateStore, list_candidates())
    }

    async fn count_existing(&self, ids: &[i32]) -> Result<usize, StorageError> {
        dispatch!(self, CandidateStore, count_existing(ids))
    }
}

// ── PairingStore ─────────────────────────────────────────────────

#[async_trait]
impl PairingStore for StorageBackend {
    async fn list_pairings(&self) -> Result<Vec<HistoricalPairing>, StorageError> {
        dispatch!(self, PairingStore, list_pairings())
    }

    async fn is_paired(&self, matchup: MatchupId) -> Result<bool, StorageError> {
        dispatch!(self, PairingStore, is_paired(matchup))
    }
}

// ── VoteStore ────────────────────────────────────────────────────

#[async_trait]
impl VoteStore for StorageBackend {
    async fn toggle_vote(
        &self,
        matchup: MatchupId,
        voter: &str,
    ) -> Result<VoteOutcome, StorageError> {
        dispatch!(self, VoteStore, toggle_vote(matchup, voter))
    }

    async fn vote_count(&self, matchup: MatchupId) -> Result<i64, StorageError> {
        dispatch!(self, VoteStore, vote_count(matchup))
    }

    async fn vote_counts(&self) -> Result<HashMap<MatchupId, i64>, StorageError> {
        dispatch!(self, VoteStore, vote_counts())
    }

    async fn voted_matchups(&self, voter: &str) -> Result<Vec<MatchupId>, StorageError> {
        dispatch!(self, VoteStore, voted_matchups(voter))
    }
}

// ── StatsStore ───────────────────────────────────────────────────

#[async_trait]
impl StatsStore for StorageBackend {
    async fn vote_stats(&self, active_since: DateTime<Utc>) -> Result<VoteStats, StorageError> {
        dispatch!(self, StatsStore, vote_stats(active_since))
    }

    async fn ping(&self) -> Result<(), StorageError> {
        dispatch!(self, StatsStore, ping())
    }
}

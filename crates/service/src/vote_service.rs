use std::sync::Arc;

use futurebattles_core::{MatchupId, VoteOutcome, VoteUpdate};
use futurebattles_storage::traits::{CandidateStore, PairingStore, VoteStore};
use futurebattles_storage::{StorageBackend, StorageError};

use crate::{LeaderboardService, ServiceError, VoteBroadcaster};

/// Write side: toggle votes, then evict cached views and announce the change.
pub struct VoteService {
    storage: Arc<StorageBackend>,
    leaderboard: Arc<LeaderboardService>,
    broadcaster: VoteBroadcaster,
}

impl VoteService {
    #[must_use]
    pub fn new(
        storage: Arc<StorageBackend>,
        leaderboard: Arc<LeaderboardService>,
        broadcaster: VoteBroadcaster,
    ) -> Self {
        Self { storage, leaderboard, broadcaster }
    }

    /// Record `voter`'s vote on `raw_matchup_id`, or retract it if present.
    pub async fn toggle(
        &self,
        raw_matchup_id: &str,
        voter: &str,
    ) -> Result<(MatchupId, VoteOutcome), ServiceError> {
        let matchup: MatchupId = raw_matchup_id.parse()?;
        self.validate(matchup).await?;

        let outcome = self.storage.toggle_vote(matchup, voter).await.map_err(|e| match e {
            StorageError::Duplicate(_) => {
                tracing::warn!(%matchup, "concurrent vote lost the unique-constraint race");
                ServiceError::Conflict("Vote already being processed, please retry".to_owned())
            },
            StorageError::InvalidReference(_) => {
                ServiceError::InvalidInput(format!("Unknown emcee in matchup {matchup}"))
            },
            other => ServiceError::Storage(other),
        })?;

        self.leaderboard.invalidate();
        self.broadcaster
            .publish(VoteUpdate { matchup_id: matchup, new_vote_count: outcome.new_count });
        tracing::info!(
            %matchup,
            action = %outcome.action,
            new_count = outcome.new_count,
            "vote toggled"
        );
        Ok((matchup, outcome))
    }

    /// Matchups `voter` currently has a vote on.
    pub async fn voted_matchups(&self, voter: &str) -> Result<Vec<MatchupId>, ServiceError> {
        let mut voted = self.storage.voted_matchups(voter).await?;
        voted.sort_unstable();
        Ok(voted)
    }

    async fn validate(&self, matchup: MatchupId) -> Result<(), ServiceError> {
        let ids = [matchup.low(), matchup.high()];
        let (existing, paired) = tokio::try_join!(
            self.storage.count_existing(&ids),
            self.storage.is_paired(matchup),
        )?;
        if existing != 2 {
            return Err(ServiceError::InvalidInput(format!("Unknown emcee in matchup {matchup}")));
        }
        if paired {
            return Err(ServiceError::InvalidInput(format!(
                "Matchup {matchup} has already battled"
            )));
        }
        Ok(())
    }
}

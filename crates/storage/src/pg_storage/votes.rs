//! VoteStore implementation for PgStorage.

use std::collections::HashMap;

use super::*;

use crate::traits::VoteStore;
use async_trait::async_trait;
use futurebattles_core::{VoteAction, VoteOutcome};

#[async_trait]
impl VoteStore for PgStorage {
    async fn toggle_vote(
        &self,
        matchup: MatchupId,
        voter: &str,
    ) -> Result<VoteOutcome, StorageError> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query(
            "DELETE FROM future_battle_votes
              WHERE emcee1_id = $1 AND emcee2_id = $2 AND voter_cookie = $3",
        )
        .bind(matchup.low())
        .bind(matchup.high())
        .bind(voter)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let action = if deleted > 0 {
            VoteAction::Unvoted
        } else {
            // A concurrent insert for the same voter blocks here and then
            // conflicts; that request is reported as a duplicate.
            let inserted = sqlx::query(
                "INSERT INTO future_battle_votes (emcee1_id, emcee2_id, voter_cookie)
                 VALUES ($1, $2, $3)
                 ON CONFLICT (emcee1_id, emcee2_id, voter_cookie) DO NOTHING",
            )
            .bind(matchup.low())
            .bind(matchup.high())
            .bind(voter)
            .execute(&mut *tx)
            .await?
            .rows_affected();
            if inserted == 0 {
                return Err(StorageError::Duplicate(format!(
                    "vote on {matchup} is already being recorded"
                )));
            }
            VoteAction::Voted
        };

        let new_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM future_battle_votes WHERE emcee1_id = $1 AND emcee2_id = $2",
        )
        .bind(matchup.low())
        .bind(matchup.high())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(VoteOutcome { action, new_count })
    }

    async fn vote_count(&self, matchup: MatchupId) -> Result<i64, StorageError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM future_battle_votes WHERE emcee1_id = $1 AND emcee2_id = $2",
        )
        .bind(matchup.low())
        .bind(matchup.high())
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn vote_counts(&self) -> Result<HashMap<MatchupId, i64>, StorageError> {
        let rows = sqlx::query(
            "SELECT emcee1_id, emcee2_id, COUNT(*) AS vote_count
               FROM future_battle_votes
              GROUP BY emcee1_id, emcee2_id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(|row| Ok((row_to_matchup_id(row)?, row.try_get::<i64, _>("vote_count")?)))
            .collect()
    }

    async fn voted_matchups(&self, voter: &str) -> Result<Vec<MatchupId>, StorageError> {
        let rows = sqlx::query(
            "SELECT emcee1_id, emcee2_id FROM future_battle_votes
              WHERE voter_cookie = $1 ORDER BY created_at",
        )
        .bind(voter)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_matchup_id).collect()
    }
}

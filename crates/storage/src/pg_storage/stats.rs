//! StatsStore implementation for PgStorage.

use super::*;

use crate::traits::StatsStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futurebattles_core::VoteStats;

#[async_trait]
impl StatsStore for PgStorage {
    async fn vote_stats(&self, active_since: DateTime<Utc>) -> Result<VoteStats, StorageError> {
        let row = sqlx::query(
            "SELECT
                 (SELECT COUNT(*) FROM future_battle_votes) AS total_votes,
                 (SELECT COUNT(DISTINCT voter_cookie) FROM future_battle_votes) AS unique_voters,
                 (SELECT COUNT(DISTINCT (emcee1_id, emcee2_id)) FROM future_battle_votes)
                     AS total_matchups,
                 (SELECT COUNT(*) FROM future_battle_votes WHERE created_at >= $1)
                     AS active_today",
        )
        .bind(active_since)
        .fetch_one(&self.pool)
        .await?;
        Ok(VoteStats {
            total_votes: row.try_get("total_votes")?,
            unique_voters: row.try_get("unique_voters")?,
            total_matchups: row.try_get("total_matchups")?,
            active_today: row.try_get("active_today")?,
        })
    }

    async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

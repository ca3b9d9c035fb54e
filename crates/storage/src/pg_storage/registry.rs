//! CandidateStore and PairingStore implementations for PgStorage.

use super::*;

use crate::traits::{CandidateStore, PairingStore};
use async_trait::async_trait;
use futurebattles_core::{Candidate, HistoricalPairing};

#[async_trait]
impl CandidateStore for PgStorage {
    async fn list_candidates(&self) -> Result<Vec<Candidate>, StorageError> {
        let rows = sqlx::query("SELECT id, name FROM emcees ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| Ok(Candidate { id: row.try_get("id")?, name: row.try_get("name")? }))
            .collect()
    }

    async fn count_existing(&self, ids: &[i32]) -> Result<usize, StorageError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM emcees WHERE id = ANY($1)")
            .bind(ids)
            .fetch_one(&self.pool)
            .await?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

#[async_trait]
impl PairingStore for PgStorage {
    async fn list_pairings(&self) -> Result<Vec<HistoricalPairing>, StorageError> {
        let rows = sqlx::query("SELECT id, emcee1_id, emcee2_id FROM battles ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| {
                Ok(HistoricalPairing {
                    id: row.try_get("id")?,
                    candidate_a_id: row.try_get("emcee1_id")?,
                    candidate_b_id: row.try_get("emcee2_id")?,
                })
            })
            .collect()
    }

    async fn is_paired(&self, matchup: MatchupId) -> Result<bool, StorageError> {
        let paired: bool = sqlx::query_scalar(
            "SELECT EXISTS (
                 SELECT 1 FROM battles
                  WHERE (emcee1_id = $1 AND emcee2_id = $2)
                     OR (emcee1_id = $2 AND emcee2_id = $1)
             )",
        )
        .bind(matchup.low())
        .bind(matchup.high())
        .fetch_one(&self.pool)
        .await?;
        Ok(paired)
    }
}

//! PostgreSQL storage backend using sqlx.
//!
//! Split into modular files by domain concern.

mod registry;
mod stats;
mod votes;

use crate::error::StorageError;
use futurebattles_core::{
    MatchupId, PG_POOL_ACQUIRE_TIMEOUT_SECS, PG_POOL_IDLE_TIMEOUT_SECS, PG_POOL_MAX_CONNECTIONS,
};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};

use super::pg_migrations::run_pg_migrations;

#[derive(Clone, Debug)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(PG_POOL_MAX_CONNECTIONS)
            .acquire_timeout(std::time::Duration::from_secs(PG_POOL_ACQUIRE_TIMEOUT_SECS))
            .idle_timeout(std::time::Duration::from_secs(PG_POOL_IDLE_TIMEOUT_SECS))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;
        run_pg_migrations(&pool).await.map_err(|e| StorageError::Migration(e.to_string()))?;
        tracing::info!("PgStorage initialized");
        Ok(Self { pool })
    }
}

/// Read an `(emcee1_id, emcee2_id)` pair back into a canonical id.
pub(crate) fn row_to_matchup_id(row: &sqlx::postgres::PgRow) -> Result<MatchupId, StorageError> {
    let first: i32 = row.try_get("emcee1_id")?;
    let second: i32 = row.try_get("emcee2_id")?;
    MatchupId::new(first, second).map_err(|e| StorageError::NotFound {
        entity: "matchup",
        id: format!("{first}-{second} ({e})"),
    })
}

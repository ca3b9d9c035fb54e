//! PostgreSQL schema migrations for futurebattles storage.
//!
//! Every statement is idempotent so the server can run them on each start,
//! including against databases created by the import tooling.

use sqlx::PgPool;

/// Run all PostgreSQL migrations.
pub async fn run_pg_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS emcees (
            id SERIAL PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS battles (
            id SERIAL PRIMARY KEY,
            emcee1_id INTEGER NOT NULL REFERENCES emcees (id),
            emcee2_id INTEGER NOT NULL REFERENCES emcees (id),
            CHECK (emcee1_id < emcee2_id),
            UNIQUE (emcee1_id, emcee2_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS future_battle_votes (
            id SERIAL PRIMARY KEY,
            emcee1_id INTEGER NOT NULL REFERENCES emcees (id),
            emcee2_id INTEGER NOT NULL REFERENCES emcees (id),
            voter_cookie TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            CHECK (emcee1_id < emcee2_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Older databases predate the timestamp column.
    sqlx::query(
        "ALTER TABLE future_battle_votes
             ADD COLUMN IF NOT EXISTS created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()",
    )
    .execute(pool)
    .await?;

    // One active vote per (pair, voter); the toggle relies on this for races.
    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_votes_pair_voter
             ON future_battle_votes (emcee1_id, emcee2_id, voter_cookie)",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_votes_voter ON future_battle_votes (voter_cookie)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_votes_created ON future_battle_votes (created_at DESC)",
    )
    .execute(pool)
    .await?;

    tracing::debug!("PostgreSQL migrations applied");
    Ok(())
}

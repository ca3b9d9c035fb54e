//! Integration tests for PgStorage.
//! Run with: DATABASE_URL=... cargo test -p futurebattles-storage -- --ignored pg_

#![allow(clippy::unwrap_used, reason = "integration test code")]

use futurebattles_core::{MatchupId, VoteAction};
use futurebattles_storage::traits::{CandidateStore, PairingStore, StatsStore, VoteStore};
use futurebattles_storage::PgStorage;
use uuid::Uuid;

async fn create_pg_storage() -> PgStorage {
    let url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for PgStorage integration tests");
    PgStorage::new(&url).await.expect("Failed to connect to PostgreSQL")
}

fn unique_voter() -> String {
    format!("test-{}", Uuid::new_v4())
}

/// First two candidate ids that have never been paired, if any.
async fn future_pair(storage: &PgStorage) -> Option<MatchupId> {
    let mut ids: Vec<i32> = storage.list_candidates().await.unwrap().iter().map(|c| c.id).collect();
    ids.sort_unstable();
    for (i, a) in ids.iter().enumerate() {
        for b in ids.iter().skip(i + 1) {
            let id = MatchupId::new(*a, *b).unwrap();
            if !storage.is_paired(id).await.unwrap() {
                return Some(id);
            }
        }
    }
    None
}

#[tokio::test]
#[ignore]
async fn pg_ping() {
    let storage = create_pg_storage().await;
    storage.ping().await.unwrap();
}

#[tokio::test]
#[ignore]
async fn pg_toggle_vote_round_trip() {
    let storage = create_pg_storage().await;
    let Some(matchup) = future_pair(&storage).await else {
        return;
    };
    let voter = unique_voter();
    let before = storage.vote_count(matchup).await.unwrap();

    let voted = storage.toggle_vote(matchup, &voter).await.unwrap();
    assert_eq!(voted.action, VoteAction::Voted);
    assert_eq!(voted.new_count, before + 1);
    assert!(storage.voted_matchups(&voter).await.unwrap().contains(&matchup));

    let unvoted = storage.toggle_vote(matchup, &voter).await.unwrap();
    assert_eq!(unvoted.action, VoteAction::Unvoted);
    assert_eq!(unvoted.new_count, before);
    assert!(storage.voted_matchups(&voter).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore]
async fn pg_vote_counts_include_new_vote() {
    let storage = create_pg_storage().await;
    let Some(matchup) = future_pair(&storage).await else {
        return;
    };
    let voter = unique_voter();
    storage.toggle_vote(matchup, &voter).await.unwrap();
    let counts = storage.vote_counts().await.unwrap();
    assert!(counts.get(&matchup).copied().unwrap_or(0) >= 1);
    storage.toggle_vote(matchup, &voter).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn pg_unknown_candidate_is_invalid_reference() {
    let storage = create_pg_storage().await;
    let matchup = MatchupId::new(i32::MAX - 1, i32::MAX).unwrap();
    let err = storage.toggle_vote(matchup, &unique_voter()).await.unwrap_err();
    assert!(matches!(err, futurebattles_storage::StorageError::InvalidReference(_)));
}

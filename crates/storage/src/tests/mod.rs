//! Tests for the in-memory backend and the enum dispatch layer.

use chrono::{Duration, Utc};
use futurebattles_core::{MatchupId, VoteAction};

use crate::traits::{CandidateStore, PairingStore, StatsStore, VoteStore};
use crate::{MemoryStorage, StorageBackend, StorageError};

fn abc() -> MemoryStorage {
    MemoryStorage::seeded(&["A", "B", "C"], &[(1, 2)])
}

fn mid(s: &str) -> MatchupId {
    s.parse().unwrap()
}

#[tokio::test]
async fn toggle_twice_restores_state() {
    let storage = abc();
    let first = storage.toggle_vote(mid("1-3"), "voter-x").await.unwrap();
    assert_eq!(first.action, VoteAction::Voted);
    assert_eq!(first.new_count, 1);

    let second = storage.toggle_vote(mid("1-3"), "voter-x").await.unwrap();
    assert_eq!(second.action, VoteAction::Unvoted);
    assert_eq!(second.new_count, 0);
    assert!(storage.voted_matchups("voter-x").await.unwrap().is_empty());
}

#[tokio::test]
async fn reversed_id_hits_same_row() {
    let storage = abc();
    storage.toggle_vote(mid("3-1"), "voter-x").await.unwrap();
    assert_eq!(storage.vote_count(mid("1-3")).await.unwrap(), 1);
    let outcome = storage.toggle_vote(mid("1-3"), "voter-x").await.unwrap();
    assert_eq!(outcome.action, VoteAction::Unvoted);
}

#[tokio::test]
async fn votes_are_per_voter() {
    let storage = abc();
    storage.toggle_vote(mid("2-3"), "voter-x").await.unwrap();
    let outcome = storage.toggle_vote(mid("2-3"), "voter-y").await.unwrap();
    assert_eq!(outcome.action, VoteAction::Voted);
    assert_eq!(outcome.new_count, 2);

    let counts = storage.vote_counts().await.unwrap();
    assert_eq!(counts.get(&mid("2-3")), Some(&2));
    assert_eq!(storage.voted_matchups("voter-y").await.unwrap(), vec![mid("2-3")]);
}

#[tokio::test]
async fn unknown_candidate_is_invalid_reference() {
    let storage = abc();
    let err = storage.toggle_vote(mid("1-99"), "voter-x").await.unwrap_err();
    assert!(matches!(err, StorageError::InvalidReference(_)));
}

#[tokio::test]
async fn registry_reads() {
    let storage = MemoryStorage::seeded(&["Zed", "Abe", "Mo"], &[(3, 1), (2, 3)]);
    let names: Vec<String> =
        storage.list_candidates().await.unwrap().into_iter().map(|c| c.name).collect();
    assert_eq!(names, vec!["Abe", "Mo", "Zed"]);

    let pairings = storage.list_pairings().await.unwrap();
    assert_eq!(pairings.len(), 2);
    assert_eq!((pairings[0].candidate_a_id, pairings[0].candidate_b_id), (1, 3));

    assert!(storage.is_paired(mid("1-3")).await.unwrap());
    assert!(storage.is_paired(mid("3-2")).await.unwrap());
    assert!(!storage.is_paired(mid("1-2")).await.unwrap());

    assert_eq!(storage.count_existing(&[1, 2, 2, 42]).await.unwrap(), 2);
}

#[tokio::test]
async fn stats_count_recent_votes() {
    let storage = abc();
    let now = Utc::now();
    storage.insert_vote_at(mid("1-3"), "old", now - Duration::hours(30)).await.unwrap();
    storage.toggle_vote(mid("1-3"), "fresh").await.unwrap();
    storage.toggle_vote(mid("2-3"), "fresh").await.unwrap();

    let stats = storage.vote_stats(now - Duration::hours(24)).await.unwrap();
    assert_eq!(stats.total_votes, 3);
    assert_eq!(stats.unique_voters, 2);
    assert_eq!(stats.total_matchups, 2);
    assert_eq!(stats.active_today, 2);
}

#[tokio::test]
async fn duplicate_direct_insert_is_rejected() {
    let storage = abc();
    storage.insert_vote_at(mid("1-3"), "x", Utc::now()).await.unwrap();
    let err = storage.insert_vote_at(mid("3-1"), "x", Utc::now()).await.unwrap_err();
    assert!(err.is_duplicate());
}

#[tokio::test]
async fn backend_dispatches_to_memory() {
    let backend = StorageBackend::new_memory(abc());
    assert_eq!(backend.kind(), "memory");
    backend.ping().await.unwrap();
    let outcome = backend.toggle_vote(mid("1-3"), "voter-x").await.unwrap();
    assert_eq!(outcome.new_count, 1);
    assert_eq!(backend.list_candidates().await.unwrap().len(), 3);
}

use std::sync::Arc;

use anyhow::{bail, Result};
use futurebattles_core::{AppConfig, MatchupId};
use futurebattles_service::LeaderboardService;
use futurebattles_storage::traits::{CandidateStore, PairingStore};
use futurebattles_storage::StorageBackend;

fn leaderboard(storage: StorageBackend, config: &AppConfig) -> LeaderboardService {
    LeaderboardService::new(Arc::new(storage), config.ranking, config.cache)
}

pub(crate) async fn run_stats(storage: StorageBackend, config: &AppConfig) -> Result<()> {
    let stats = leaderboard(storage, config).stats().await?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

pub(crate) async fn run_leaderboard(
    storage: StorageBackend,
    config: &AppConfig,
    limit: usize,
) -> Result<()> {
    let ranked = leaderboard(storage, config).future_matchups().await?;
    let shown = &ranked[..limit.min(ranked.len())];
    println!("{}", serde_json::to_string_pretty(shown)?);
    Ok(())
}

pub(crate) async fn run_check_matchup(
    storage: StorageBackend,
    first: &str,
    second: &str,
) -> Result<()> {
    let candidates = storage.list_candidates().await?;
    let find = |name: &str| {
        candidates.iter().find(|c| c.name.eq_ignore_ascii_case(name.trim())).map(|c| c.id)
    };
    let (Some(a), Some(b)) = (find(first), find(second)) else {
        bail!("Could not find both emcees: {first:?}, {second:?}");
    };
    let matchup = MatchupId::new(a, b)?;
    if storage.is_paired(matchup).await? {
        println!("{first} and {second} have already battled.");
    } else {
        println!("{first} vs {second} ({matchup}) is a potential future matchup.");
    }
    Ok(())
}

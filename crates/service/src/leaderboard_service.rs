use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use futurebattles_core::{
    rank_matchups, Candidate, CandidateTotal, CacheTtls, RankedMatchup, RankingInput,
    RankingPolicy, VoteStats, ACTIVE_TODAY_HOURS,
};
use futurebattles_storage::traits::{CandidateStore, PairingStore, StatsStore, VoteStore};
use futurebattles_storage::StorageBackend;

use crate::cache::{MemoryViewCache, ViewCache};
use crate::ServiceError;

const FUTURE_MATCHUPS_KEY: &str = "future-matchups";
const TOP_MATCHUPS_KEY: &str = "top-matchups";
const TOP_EMCEES_KEY: &str = "top-emcees";
const STATS_KEY: &str = "stats";

type MatchupView = Arc<Vec<RankedMatchup>>;
type CandidateView = Arc<Vec<CandidateTotal>>;

/// Read side of the voting board: ranked matchups, totals and stats, each
/// memoized for its TTL and evicted by [`LeaderboardService::invalidate`].
///
/// Every invalidation bumps a generation counter. A fill computed from reads
/// that started before an invalidation is never left in the cache.
pub struct LeaderboardService {
    storage: Arc<StorageBackend>,
    policy: RankingPolicy,
    matchups: Arc<dyn ViewCache<MatchupView>>,
    candidates: Arc<dyn ViewCache<CandidateView>>,
    stats: Arc<dyn ViewCache<VoteStats>>,
    generation: AtomicU64,
}

impl LeaderboardService {
    #[must_use]
    pub fn new(storage: Arc<StorageBackend>, policy: RankingPolicy, ttls: CacheTtls) -> Self {
        Self::with_caches(
            storage,
            policy,
            Arc::new(MemoryViewCache::new(ttls.leaderboard)),
            Arc::new(MemoryViewCache::new(ttls.leaderboard)),
            Arc::new(MemoryViewCache::new(ttls.stats)),
        )
    }

    #[must_use]
    pub fn with_caches(
        storage: Arc<StorageBackend>,
        policy: RankingPolicy,
        matchups: Arc<dyn ViewCache<MatchupView>>,
        candidates: Arc<dyn ViewCache<CandidateView>>,
        stats: Arc<dyn ViewCache<VoteStats>>,
    ) -> Self {
        Self { storage, policy, matchups, candidates, stats, generation: AtomicU64::new(0) }
    }

    pub async fn candidates(&self) -> Result<Vec<Candidate>, ServiceError> {
        Ok(self.storage.list_candidates().await?)
    }

    /// Full ranked list of future matchups.
    pub async fn future_matchups(&self) -> Result<MatchupView, ServiceError> {
        if let Some(hit) = self.matchups.get(FUTURE_MATCHUPS_KEY) {
            return Ok(hit);
        }

        let generation = self.generation();
        let (candidates, pairings, vote_counts) = tokio::try_join!(
            self.storage.list_candidates(),
            self.storage.list_pairings(),
            self.storage.vote_counts(),
        )?;
        let ranked = {
            let input = RankingInput {
                candidates: &candidates,
                pairings: &pairings,
                vote_counts: &vote_counts,
            };
            let mut rng = rand::thread_rng();
            Arc::new(rank_matchups(input, self.policy, &mut rng))
        };
        tracing::debug!(
            matchups = ranked.len(),
            candidates = candidates.len(),
            pairings = pairings.len(),
            "recomputed leaderboard"
        );
        self.fill(&*self.matchups, FUTURE_MATCHUPS_KEY, Arc::clone(&ranked), generation);
        Ok(ranked)
    }

    /// Voted matchups in leaderboard order, at most `limit`.
    pub async fn top_matchups(&self, limit: usize) -> Result<Vec<RankedMatchup>, ServiceError> {
        let voted = match self.matchups.get(TOP_MATCHUPS_KEY) {
            Some(hit) => hit,
            None => {
                let generation = self.generation();
                let all = self.future_matchups().await?;
                let voted: MatchupView =
                    Arc::new(all.iter().filter(|m| m.vote_count > 0).cloned().collect());
                self.fill(&*self.matchups, TOP_MATCHUPS_KEY, Arc::clone(&voted), generation);
                voted
            },
        };
        Ok(voted.iter().take(limit).cloned().collect())
    }

    /// Candidates ranked by votes summed over every matchup they appear in.
    pub async fn top_candidates(&self, limit: usize) -> Result<Vec<CandidateTotal>, ServiceError> {
        let ranked = match self.candidates.get(TOP_EMCEES_KEY) {
            Some(hit) => hit,
            None => {
                let generation = self.generation();
                let all = self.future_matchups().await?;
                let ranked = Arc::new(candidate_totals(&all));
                self.fill(&*self.candidates, TOP_EMCEES_KEY, Arc::clone(&ranked), generation);
                ranked
            },
        };
        Ok(ranked.iter().take(limit).cloned().collect())
    }

    pub async fn stats(&self) -> Result<VoteStats, ServiceError> {
        if let Some(hit) = self.stats.get(STATS_KEY) {
            return Ok(hit);
        }
        let generation = self.generation();
        let active_since = Utc::now() - chrono::Duration::hours(ACTIVE_TODAY_HOURS);
        let stats = self.storage.vote_stats(active_since).await?;
        self.fill(&*self.stats, STATS_KEY, stats, generation);
        Ok(stats)
    }

    pub async fn ping(&self) -> Result<(), ServiceError> {
        Ok(self.storage.ping().await?)
    }

    /// Evict every view a vote can change.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.matchups.evict(FUTURE_MATCHUPS_KEY);
        self.matchups.evict(TOP_MATCHUPS_KEY);
        self.candidates.evict(TOP_EMCEES_KEY);
        self.stats.evict(STATS_KEY);
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Store a freshly computed view unless an invalidation ran since `started`.
    ///
    /// The generation is re-checked after the insert as well, so an
    /// invalidation landing between the check and the insert still wins.
    fn fill<V>(&self, cache: &dyn ViewCache<V>, key: &str, value: V, started: u64) {
        if self.generation() != started {
            tracing::debug!(key, "skipping cache fill raced by a vote");
            return;
        }
        cache.insert(key, value);
        if self.generation() != started {
            cache.evict(key);
        }
    }

    /// Drop expired entries from every cache; returns how many were removed.
    pub fn evict_expired(&self) -> usize {
        self.matchups.evict_expired() + self.candidates.evict_expired() + self.stats.evict_expired()
    }
}

/// Per-candidate vote sums, highest first, ties by name.
fn candidate_totals(rows: &[RankedMatchup]) -> Vec<CandidateTotal> {
    let mut totals: HashMap<&str, i64> = HashMap::new();
    for row in rows.iter().filter(|m| m.vote_count > 0) {
        *totals.entry(row.candidate1.as_str()).or_default() += row.vote_count;
        *totals.entry(row.candidate2.as_str()).or_default() += row.vote_count;
    }
    let mut ranked: Vec<CandidateTotal> = totals
        .into_iter()
        .map(|(name, total_votes)| CandidateTotal { name: name.to_owned(), total_votes })
        .collect();
    ranked.sort_by(|a, b| b.total_votes.cmp(&a.total_votes).then_with(|| a.name.cmp(&b.name)));
    ranked
}

//! Leaderboard ranking engine.
//!
//! Enumerates every candidate pair that has not been historically matched and
//! orders it by one of two policies. The engine is pure: callers load the
//! candidates, pairings and vote counts and pass them in.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::{Candidate, HistoricalPairing, MatchupId, RankedMatchup, DEFAULT_RECENT_PAIRING_WINDOW};

/// How the leaderboard is ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingPolicy {
    /// Recency tiers first, then votes, ties shuffled per computation.
    Tiered { recent_window: usize },
    /// Votes first, then pairs whose candidates were paired longest ago.
    ByVotes,
}

impl Default for RankingPolicy {
    fn default() -> Self {
        Self::Tiered { recent_window: DEFAULT_RECENT_PAIRING_WINDOW }
    }
}

impl FromStr for RankingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tiered" => Ok(Self::default()),
            "by-votes" | "by_votes" | "votes" => Ok(Self::ByVotes),
            other => Err(format!("unknown ranking policy: {other}")),
        }
    }
}

impl fmt::Display for RankingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tiered { recent_window } => write!(f, "tiered(window={recent_window})"),
            Self::ByVotes => f.write_str("by-votes"),
        }
    }
}

/// Everything the engine reads.
#[derive(Debug, Clone, Copy)]
pub struct RankingInput<'a> {
    pub candidates: &'a [Candidate],
    pub pairings: &'a [HistoricalPairing],
    pub vote_counts: &'a HashMap<MatchupId, i64>,
}

struct Row<'a> {
    id: MatchupId,
    first: &'a Candidate,
    second: &'a Candidate,
    votes: i64,
}

/// Produce the ordered list of future matchups.
pub fn rank_matchups<R: Rng + ?Sized>(
    input: RankingInput<'_>,
    policy: RankingPolicy,
    rng: &mut R,
) -> Vec<RankedMatchup> {
    let mut rows = future_rows(&input);
    match policy {
        RankingPolicy::Tiered { recent_window } => {
            let recent = recent_candidates(input.pairings, recent_window);
            // Shuffle first; the stable sort then leaves equal keys in random order.
            rows.shuffle(rng);
            rows.sort_by_key(|row| {
                let tier = 1 + usize::from(recent.contains(&row.id.low()))
                    + usize::from(recent.contains(&row.id.high()));
                (Reverse(tier), Reverse(row.votes))
            });
        },
        RankingPolicy::ByVotes => {
            let last_paired = last_pairing_ids(input.pairings);
            rows.sort_by_key(|row| {
                let newest = last_paired
                    .get(&row.id.low())
                    .copied()
                    .max(last_paired.get(&row.id.high()).copied());
                // `None` sorts before `Some`, giving never-paired pairs priority.
                (Reverse(row.votes), newest)
            });
        },
    }
    rows.into_iter()
        .map(|row| RankedMatchup {
            candidate1: row.first.name.clone(),
            candidate2: row.second.name.clone(),
            matchup_id: row.id,
            vote_count: row.votes,
        })
        .collect()
}

/// Candidate ids appearing in the first `window` pairings by id.
pub fn recent_candidates(pairings: &[HistoricalPairing], window: usize) -> HashSet<i32> {
    let mut ordered: Vec<&HistoricalPairing> = pairings.iter().collect();
    ordered.sort_by_key(|p| p.id);
    ordered
        .into_iter()
        .take(window)
        .flat_map(|p| [p.candidate_a_id, p.candidate_b_id])
        .collect()
}

fn last_pairing_ids(pairings: &[HistoricalPairing]) -> HashMap<i32, i32> {
    let mut last: HashMap<i32, i32> = HashMap::new();
    for pairing in pairings {
        for candidate in [pairing.candidate_a_id, pairing.candidate_b_id] {
            let entry = last.entry(candidate).or_insert(pairing.id);
            *entry = (*entry).max(pairing.id);
        }
    }
    last
}

fn future_rows<'a>(input: &RankingInput<'a>) -> Vec<Row<'a>> {
    let played: HashSet<MatchupId> = input
        .pairings
        .iter()
        .filter_map(|p| MatchupId::new(p.candidate_a_id, p.candidate_b_id).ok())
        .collect();

    let mut candidates: Vec<&Candidate> = input.candidates.iter().collect();
    candidates.sort_by_key(|c| c.id);
    candidates.dedup_by_key(|c| c.id);

    let mut rows = Vec::new();
    for (i, first) in candidates.iter().enumerate() {
        for second in candidates.iter().skip(i + 1) {
            let Ok(id) = MatchupId::new(first.id, second.id) else {
                continue;
            };
            if played.contains(&id) {
                continue;
            }
            let votes = input.vote_counts.get(&id).copied().unwrap_or(0);
            rows.push(Row { id, first: *first, second: *second, votes });
        }
    }
    rows
}

use serde::{Deserialize, Serialize};

/// Aggregate voting statistics served by `/api/stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteStats {
    pub total_votes: i64,
    pub unique_voters: i64,
    /// Distinct matchups with at least one vote.
    pub total_matchups: i64,
    /// Votes cast in the last 24 hours.
    pub active_today: i64,
}

/// A candidate with the sum of votes over every matchup it appears in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateTotal {
    pub name: String,
    pub total_votes: i64,
}

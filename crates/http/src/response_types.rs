//! Response types (Serialize)

use std::collections::HashMap;

use futurebattles_core::{CandidateTotal, MatchupId, RankedMatchup, VoteAction};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub database_connected: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckVotesResponse {
    pub voted_matchups: Vec<MatchupId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    pub success: bool,
    pub action: VoteAction,
    pub new_vote_count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopMatchupsResponse {
    pub top_matchups: Vec<RankedMatchup>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopEmceesResponse {
    pub top_emcees: Vec<CandidateTotal>,
    pub emcee_images: HashMap<String, String>,
}

use serde::{Deserialize, Serialize};

/// A named entity that can be placed in a matchup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: i32,
    pub name: String,
}

impl Candidate {
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

/// A pair of candidates that has already been matched.
///
/// Stored with `candidate_a_id < candidate_b_id`; `id` order is import order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalPairing {
    pub id: i32,
    pub candidate_a_id: i32,
    pub candidate_b_id: i32,
}

impl HistoricalPairing {
    /// Builds a pairing, canonicalizing the candidate order.
    pub fn new(id: i32, first: i32, second: i32) -> Self {
        Self { id, candidate_a_id: first.min(second), candidate_b_id: first.max(second) }
    }

    pub fn involves(&self, candidate_id: i32) -> bool {
        self.candidate_a_id == candidate_id || self.candidate_b_id == candidate_id
    }
}

//! Request/query types (Deserialize)

use futurebattles_core::MAX_IMAGE_BATCH;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    #[serde(default)]
    pub matchup_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ImageBatchQuery {
    #[serde(default)]
    pub names: String,
}

impl ImageBatchQuery {
    /// Comma-separated names, trimmed, empties dropped, capped to one batch.
    pub fn names(&self) -> Vec<&str> {
        self.names
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .take(MAX_IMAGE_BATCH)
            .collect()
    }
}

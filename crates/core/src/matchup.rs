use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::CoreError;

/// Canonical identifier of an unordered candidate pair.
///
/// Always holds `low < high`, so `"5-3"` and `"3-5"` parse to the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatchupId {
    low: i32,
    high: i32,
}

impl MatchupId {
    pub fn new(first: i32, second: i32) -> Result<Self, CoreError> {
        if first == second {
            return Err(CoreError::SelfMatchup);
        }
        Ok(Self { low: first.min(second), high: first.max(second) })
    }

    pub const fn low(&self) -> i32 {
        self.low
    }

    pub const fn high(&self) -> i32 {
        self.high
    }
}

impl FromStr for MatchupId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CoreError::MissingMatchupId);
        }
        let (first, second) =
            s.split_once('-').ok_or_else(|| CoreError::MalformedMatchupId(s.to_owned()))?;
        let parse = |part: &str| -> Result<i32, CoreError> {
            part.trim()
                .parse::<i32>()
                .ok()
                .filter(|id| *id > 0)
                .ok_or_else(|| CoreError::MalformedMatchupId(s.to_owned()))
        };
        Self::new(parse(first)?, parse(second)?)
    }
}

impl fmt::Display for MatchupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

impl Serialize for MatchupId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MatchupId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedMatchup {
    pub candidate1: String,
    pub candidate2: String,
    pub matchup_id: MatchupId,
    pub vote_count: i64,
}

/// Result of a toggle vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteAction {
    Voted,
    Unvoted,
}

impl VoteAction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Voted => "voted",
            Self::Unvoted => "unvoted",
        }
    }
}

impl fmt::Display for VoteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteOutcome {
    pub action: VoteAction,
    pub new_count: i64,
}

/// Payload of the `voteUpdate` real-time event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteUpdate {
    pub matchup_id: MatchupId,
    pub new_vote_count: i64,
}

//! Core types for futurebattles
//!
//! Domain types shared across all other crates, plus the leaderboard
//! ranking engine which is pure and storage-agnostic.

mod candidate;
mod config;
mod constants;
mod env_config;
mod error;
mod matchup;
pub mod ranking;
mod stats;

pub use candidate::*;
pub use config::*;
pub use constants::*;
pub use env_config::*;
pub use error::*;
pub use matchup::*;
pub use ranking::{rank_matchups, RankingInput, RankingPolicy};
pub use stats::*;

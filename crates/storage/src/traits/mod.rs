//! Storage backend trait abstraction
//!
//! Async domain traits implemented by every backend.

pub mod registry;
pub mod stats;
pub mod vote;

pub use registry::{CandidateStore, PairingStore};
pub use stats::StatsStore;
pub use vote::VoteStore;

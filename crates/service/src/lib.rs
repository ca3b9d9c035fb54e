//! Service layer for futurebattles
//!
//! Centralizes business logic between HTTP handlers and storage: toggle
//! voting, the cached leaderboard, abuse limits, real-time fan-out and
//! portrait lookup.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short error vars are idiomatic")]

mod broadcaster;
pub mod cache;
mod error;
pub mod guard;
mod image_service;
mod leaderboard_service;
mod vote_service;

pub use broadcaster::VoteBroadcaster;
pub use cache::{MemoryViewCache, ViewCache};
pub use error::ServiceError;
pub use guard::{AbuseGuard, FixedWindowLimiter, GuardRejection, VoteReservation, VoteTracker};
pub use image_service::{slug_variants, ImageService};
pub use leaderboard_service::LeaderboardService;
pub use vote_service::VoteService;

//! Storage layer for futurebattles
//!
//! PostgreSQL storage through sqlx, plus an in-memory backend with identical
//! semantics. Both implement the async traits in [`traits`] and are unified by
//! [`StorageBackend`].

mod backend;
mod error;
mod memory;
mod pg_migrations;
mod pg_storage;
#[cfg(test)]
mod tests;
pub mod traits;

pub use backend::StorageBackend;
pub use error::StorageError;
pub use memory::MemoryStorage;
pub use pg_storage::PgStorage;

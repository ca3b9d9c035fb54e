//! Typed error enum for the service layer.
//!
//! Unifies storage failures, input validation and abuse rejections into a
//! single error type the HTTP layer maps onto status codes.

use std::time::Duration;

use futurebattles_core::CoreError;
use futurebattles_storage::StorageError;
use thiserror::Error;

use crate::guard::GuardRejection;

/// Service-layer error.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage operation failed (DB, duplicate, bad reference, etc.).
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    /// Caller provided invalid input (missing or malformed matchup id).
    #[error("{0}")]
    InvalidInput(String),

    /// The same vote is already being recorded by a concurrent request.
    #[error("{0}")]
    Conflict(String),

    /// An abuse limit was hit.
    #[error("{message}")]
    RateLimited { message: String, retry_after: Duration },

    /// The request is missing the marker header.
    #[error("{0}")]
    Forbidden(String),

    /// Outbound HTTP client could not be set up.
    #[error("upstream: {0}")]
    Upstream(String),
}

impl ServiceError {
    /// Whether this error is likely transient (worth retrying).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_transient(),
            _ => false,
        }
    }
}

impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<GuardRejection> for ServiceError {
    fn from(rejection: GuardRejection) -> Self {
        Self::RateLimited {
            message: futurebattles_core::RATE_LIMIT_MESSAGE.to_owned(),
            retry_after: rejection.retry_after(),
        }
    }
}

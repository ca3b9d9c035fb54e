//! HTTP API server for futurebattles.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(unreachable_pub, reason = "pub items are re-exported")]
#![allow(clippy::absolute_paths, reason = "Explicit paths for clarity")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short closure params are idiomatic")]
#![allow(clippy::shadow_reuse, reason = "Shadowing for Arc clones is idiomatic")]
#![allow(clippy::exhaustive_structs, reason = "HTTP types are stable")]
#![allow(clippy::single_call_fn, reason = "Helper functions improve readability")]

pub mod api_error;
mod handlers;
pub mod identity;
mod query_types;
mod response_types;

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futurebattles_core::AppConfig;
use futurebattles_service::{
    AbuseGuard, ImageService, LeaderboardService, MemoryViewCache, ServiceError, VoteBroadcaster,
    VoteService,
};
use futurebattles_storage::StorageBackend;
use tower_http::cors::CorsLayer;

use crate::api_error::ApiError;
use crate::response_types::StatusResponse;

const PRUNE_INTERVAL: Duration = Duration::from_secs(60);

/// Spawns background task that drops idle abuse-guard state and expired
/// cache entries every minute.
pub fn start_pruner(state: Arc<AppState>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PRUNE_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let guard_entries = state.guard.prune();
            let cache_entries = state.leaderboard.evict_expired() + state.images.evict_expired();
            if guard_entries > 0 || cache_entries > 0 {
                tracing::debug!(guard_entries, cache_entries, "pruned idle state");
            }
        }
    })
}

/// Shared application state for all HTTP handlers.
pub struct AppState {
    /// Cached read views: leaderboard, totals and stats
    pub leaderboard: Arc<LeaderboardService>,
    /// Toggle voting
    pub votes: Arc<VoteService>,
    /// Portrait lookup
    pub images: Arc<ImageService>,
    /// Per-address limits
    pub guard: Arc<AbuseGuard>,
    /// Fan-out for SSE vote updates
    pub broadcaster: VoteBroadcaster,
    /// Key clients on the proxy-appended `X-Forwarded-For` hop
    pub trust_proxy: bool,
}

impl AppState {
    /// Wire every service over one storage backend.
    pub fn from_config(
        storage: Arc<StorageBackend>,
        config: &AppConfig,
    ) -> Result<Self, ServiceError> {
        let broadcaster = VoteBroadcaster::default();
        let leaderboard =
            Arc::new(LeaderboardService::new(Arc::clone(&storage), config.ranking, config.cache));
        let votes =
            Arc::new(VoteService::new(storage, Arc::clone(&leaderboard), broadcaster.clone()));
        let images = Arc::new(ImageService::new(
            &config.images,
            Arc::new(MemoryViewCache::new(config.cache.images)),
        )?);
        let guard = Arc::new(AbuseGuard::new(config.guard));
        Ok(Self {
            leaderboard,
            votes,
            images,
            guard,
            broadcaster,
            trust_proxy: config.trust_proxy,
        })
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/status", get(api_status))
        .route("/emcees", get(handlers::matchups::list_emcees))
        .route("/future-matchups", get(handlers::matchups::future_matchups))
        .route("/stats", get(handlers::matchups::stats))
        .route("/top-matchups-images", get(handlers::matchups::top_matchups))
        .route("/top-emcees-individual", get(handlers::matchups::top_emcees))
        .route("/check-votes", post(handlers::votes::check_votes))
        .route("/vote-future", post(handlers::votes::vote_future))
        .route("/emcee-image-batch", get(handlers::images::emcee_image_batch))
        .route_layer(middleware::from_fn_with_state(Arc::clone(&state), api_rate_limit));

    Router::new()
        .route("/health", get(health))
        .route("/events", get(handlers::events::sse_events))
        .nest("/api", api)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn api_rate_limit(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let addr =
        identity::client_addr(request.headers(), request.extensions(), state.trust_proxy);
    if let Err(rejection) = state.guard.check_api(&addr) {
        tracing::warn!(%addr, path = %request.uri().path(), "api rate limit exceeded");
        return ApiError::from(ServiceError::from(rejection)).into_response();
    }
    next.run(request).await
}

async fn health() -> &'static str {
    "ok"
}

async fn api_status(State(state): State<Arc<AppState>>) -> (StatusCode, Json<StatusResponse>) {
    match state.leaderboard.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(StatusResponse {
                status: "ok",
                database_connected: true,
                message: "Database connection successful".to_owned(),
            }),
        ),
        Err(e) => {
            tracing::error!("Database status check failed: {e}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(StatusResponse {
                    status: "error",
                    database_connected: false,
                    message: "Database connection failed".to_owned(),
                }),
            )
        },
    }
}

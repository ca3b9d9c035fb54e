use std::sync::Arc;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use futurebattles_core::{Candidate, VoteStats, TOP_EMCEES_LIMIT, TOP_MATCHUPS_LIMIT};

use crate::api_error::ApiError;
use crate::response_types::{TopEmceesResponse, TopMatchupsResponse};
use crate::AppState;

pub async fn list_emcees(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Candidate>>, ApiError> {
    Ok(Json(state.leaderboard.candidates().await?))
}

pub async fn future_matchups(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let ranked = state.leaderboard.future_matchups().await?;
    Ok(Json(ranked.as_slice()).into_response())
}

pub async fn stats(State(state): State<Arc<AppState>>) -> Result<Json<VoteStats>, ApiError> {
    Ok(Json(state.leaderboard.stats().await?))
}

pub async fn top_matchups(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TopMatchupsResponse>, ApiError> {
    let top_matchups = state.leaderboard.top_matchups(TOP_MATCHUPS_LIMIT).await?;
    Ok(Json(TopMatchupsResponse { top_matchups }))
}

pub async fn top_emcees(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TopEmceesResponse>, ApiError> {
    let top_emcees = state.leaderboard.top_candidates(TOP_EMCEES_LIMIT).await?;
    let names: Vec<&str> = top_emcees.iter().map(|c| c.name.as_str()).collect();
    let emcee_images = state.images.lookup_batch(&names).await;
    Ok(Json(TopEmceesResponse { top_emcees, emcee_images }))
}

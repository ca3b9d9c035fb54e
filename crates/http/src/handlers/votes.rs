use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::{extract::State, http::HeaderMap, Json};
use axum_extra::extract::cookie::CookieJar;
use futurebattles_service::ServiceError;

use crate::api_error::ApiError;
use crate::identity::{ensure_voter, has_vote_marker, voter_id, ClientAddr};
use crate::query_types::VoteRequest;
use crate::response_types::{CheckVotesResponse, VoteResponse};
use crate::AppState;

pub async fn check_votes(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Json<CheckVotesResponse>, ApiError> {
    let voted_matchups = match voter_id(&jar) {
        Some(voter) => state.votes.voted_matchups(&voter).await?,
        None => Vec::new(),
    };
    Ok(Json(CheckVotesResponse { voted_matchups }))
}

pub async fn vote_future(
    State(state): State<Arc<AppState>>,
    ClientAddr(addr): ClientAddr,
    headers: HeaderMap,
    jar: CookieJar,
    body: Result<Json<VoteRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<VoteResponse>), ApiError> {
    if !has_vote_marker(&headers) {
        tracing::warn!(%addr, "vote without marker header");
        return Err(ServiceError::Forbidden("Invalid request".to_owned()).into());
    }
    let Json(request) = body.map_err(|rejection| {
        tracing::debug!(%addr, status = %rejection.status(), "unreadable vote body");
        ApiError::BadRequest(rejection.body_text())
    })?;
    let reservation = state.guard.check_vote(&addr).map_err(ServiceError::from)?;

    let (jar, voter) = ensure_voter(jar);
    let (_, outcome) = match state.votes.toggle(&request.matchup_id, &voter).await {
        Ok(toggled) => toggled,
        Err(e) => {
            state.guard.release_vote(&addr, reservation);
            return Err(e.into());
        },
    };
    Ok((
        jar,
        Json(VoteResponse {
            success: true,
            action: outcome.action,
            new_vote_count: outcome.new_count,
        }),
    ))
}

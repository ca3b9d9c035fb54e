#![allow(clippy::unwrap_used, reason = "test code")]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::extract::ConnectInfo;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use futures_util::StreamExt;
use futurebattles_core::{AppConfig, GuardLimits, ImageConfig};
use futurebattles_storage::{MemoryStorage, StorageBackend};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::{create_router, AppState};

fn config() -> AppConfig {
    AppConfig {
        images: ImageConfig {
            // Nothing listens on the discard port; lookups fail fast as misses.
            base_url: "http://127.0.0.1:9/emcees".to_owned(),
            timeout: Duration::from_millis(500),
        },
        // Requests below name their client through X-Forwarded-For.
        trust_proxy: true,
        ..AppConfig::default()
    }
}

fn router_with(config: &AppConfig, names: &[&str], pairings: &[(i32, i32)]) -> Router {
    let storage = Arc::new(StorageBackend::new_memory(MemoryStorage::seeded(names, pairings)));
    create_router(Arc::new(AppState::from_config(storage, config).unwrap()))
}

fn router() -> Router {
    router_with(&config(), &["A", "B", "C"], &[(1, 2)])
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

static NEXT_ADDR: AtomicU32 = AtomicU32::new(1);

/// Vote from a fresh client address so the per-address spacing rule stays out of the way.
fn vote(matchup_id: &str, cookie: Option<&str>) -> Request<Body> {
    let n = NEXT_ADDR.fetch_add(1, Ordering::Relaxed);
    vote_from(&format!("10.1.{}.{}", n / 256, n % 256), matchup_id, cookie)
}

fn vote_from(addr: &str, matchup_id: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::post("/api/vote-future")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", addr)
        .header("x-requested-with", "XMLHttpRequest");
    if let Some(voter) = cookie {
        builder = builder.header(header::COOKIE, format!("voterId={voter}"));
    }
    builder.body(Body::from(json!({ "matchupId": matchup_id }).to_string())).unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let response = router().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn status_reports_connected_store() {
    let response = router().oneshot(get("/api/status")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["database_connected"], true);
}

#[tokio::test]
async fn emcees_sorted_by_name() {
    let app = router_with(&config(), &["Zed", "Abra"], &[]);
    let body = body_json(app.oneshot(get("/api/emcees")).await.unwrap()).await;
    assert_eq!(body, json!([{"id": 2, "name": "Abra"}, {"id": 1, "name": "Zed"}]));
}

#[tokio::test]
async fn scenario_vote_and_unvote() {
    let app = router();

    let body = body_json(app.clone().oneshot(get("/api/future-matchups")).await.unwrap()).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    let mut ids: Vec<&str> = rows.iter().map(|r| r["matchup_id"].as_str().unwrap()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["1-3", "2-3"]);
    assert!(rows.iter().all(|r| r["vote_count"] == 0));

    let response = app.clone().oneshot(vote("1-3", Some("X"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body, json!({"success": true, "action": "voted", "newVoteCount": 1}));

    let response = app.clone().oneshot(vote("3-1", Some("X"))).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body, json!({"success": true, "action": "unvoted", "newVoteCount": 0}));
}

#[tokio::test]
async fn vote_without_marker_is_forbidden() {
    let request = Request::post("/api/vote-future")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"matchupId":"1-3"}"#))
        .unwrap();
    let app = router();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let stats = body_json(app.oneshot(get("/api/stats")).await.unwrap()).await;
    assert_eq!(stats["totalVotes"], 0);
}

#[tokio::test]
async fn bad_matchup_ids_are_rejected() {
    let app = router();
    for (id, voter) in [("", "a"), ("1-x", "b"), ("1-2", "c"), ("1-99", "d")] {
        let response = app.clone().oneshot(vote(id, Some(voter))).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{id:?}");
        let body = body_json(response).await;
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn first_vote_issues_cookie() {
    let response = router().oneshot(vote("1-3", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.starts_with("voterId="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Max-Age=31536000"));
}

#[tokio::test]
async fn returning_voter_keeps_cookie() {
    let response = router().oneshot(vote("1-3", Some("X"))).await.unwrap();
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn check_votes_lists_voter_matchups() {
    let app = router();
    app.clone().oneshot(vote("2-3", Some("X"))).await.unwrap();

    let request = Request::post("/api/check-votes")
        .header(header::COOKIE, "voterId=X")
        .body(Body::empty())
        .unwrap();
    let body = body_json(app.clone().oneshot(request).await.unwrap()).await;
    assert_eq!(body, json!({"votedMatchups": ["2-3"]}));

    let anonymous = Request::post("/api/check-votes").body(Body::empty()).unwrap();
    let body = body_json(app.oneshot(anonymous).await.unwrap()).await;
    assert_eq!(body, json!({"votedMatchups": []}));
}

#[tokio::test]
async fn stats_reflect_vote_immediately() {
    let app = router();
    let before = body_json(app.clone().oneshot(get("/api/stats")).await.unwrap()).await;
    assert_eq!(before, json!({"totalVotes": 0, "uniqueVoters": 0, "totalMatchups": 0, "activeToday": 0}));

    app.clone().oneshot(vote("1-3", Some("X"))).await.unwrap();
    let after = body_json(app.oneshot(get("/api/stats")).await.unwrap()).await;
    assert_eq!(after, json!({"totalVotes": 1, "uniqueVoters": 1, "totalMatchups": 1, "activeToday": 1}));
}

#[tokio::test]
async fn top_views_only_list_voted() {
    let app = router();
    app.clone().oneshot(vote("1-3", Some("X"))).await.unwrap();

    let body = body_json(app.clone().oneshot(get("/api/top-matchups-images")).await.unwrap()).await;
    let top = body["topMatchups"].as_array().unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0]["matchup_id"], "1-3");

    let body = body_json(app.oneshot(get("/api/top-emcees-individual")).await.unwrap()).await;
    assert_eq!(
        body["topEmcees"],
        json!([{"name": "A", "totalVotes": 1}, {"name": "C", "totalVotes": 1}])
    );
    assert_eq!(body["emceeImages"], json!({}));
}

#[tokio::test]
async fn image_batch_without_names_is_empty() {
    let body = body_json(router().oneshot(get("/api/emcee-image-batch")).await.unwrap()).await;
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn api_rate_limit_returns_429_with_retry_after() {
    let config = AppConfig {
        guard: GuardLimits { api_per_window: 2, ..GuardLimits::default() },
        ..config()
    };
    let app = router_with(&config, &["A", "B"], &[]);
    for _ in 0..2 {
        let response = app.clone().oneshot(get("/api/stats")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    let response = app.clone().oneshot(get("/api/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key(header::RETRY_AFTER));
    let body = body_json(response).await;
    assert_eq!(body["error"], "Too many requests, please try again later.");

    // Other addresses and non-API routes are unaffected.
    let other = Request::get("/api/stats")
        .header("x-forwarded-for", "198.51.100.2")
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.clone().oneshot(other).await.unwrap().status(), StatusCode::OK);
    assert_eq!(app.oneshot(get("/health")).await.unwrap().status(), StatusCode::OK);
}

#[tokio::test]
async fn rapid_second_vote_is_throttled() {
    let app = router();
    let first = app.clone().oneshot(vote_from("192.0.2.1", "1-3", Some("X"))).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let second = app.oneshot(vote_from("192.0.2.1", "2-3", Some("X"))).await.unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
}

fn raw_vote(content_type: &str, body: &'static str, marker: bool) -> Request<Body> {
    let mut builder = Request::post("/api/vote-future")
        .header(header::CONTENT_TYPE, content_type)
        .header("x-forwarded-for", "192.0.2.50");
    if marker {
        builder = builder.header("x-requested-with", "XMLHttpRequest");
    }
    builder.body(Body::from(body)).unwrap()
}

#[tokio::test]
async fn unreadable_vote_bodies_get_json_errors() {
    let app = router();
    let cases = [
        ("application/json", "{not json"),
        ("text/plain", r#"{"matchupId":"1-3"}"#),
        ("application/json", r#"{"matchupId":13}"#),
    ];
    for (content_type, body) in cases {
        let response = app.clone().oneshot(raw_vote(content_type, body, true)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{content_type} {body}");
        let json = body_json(response).await;
        assert!(json["error"].is_string(), "{content_type} {body}");
    }
}

#[tokio::test]
async fn missing_marker_checked_before_body() {
    let response = router().oneshot(raw_vote("text/plain", "{not json", false)).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await, json!({"error": "Invalid request"}));
}

#[tokio::test]
async fn rejected_vote_does_not_use_up_spacing() {
    let app = router();
    let bad = app.clone().oneshot(vote_from("192.0.2.7", "1-2", Some("X"))).await.unwrap();
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
    let good = app.oneshot(vote_from("192.0.2.7", "1-3", Some("X"))).await.unwrap();
    assert_eq!(good.status(), StatusCode::OK);
}

#[tokio::test]
async fn forwarded_for_ignored_without_trusted_proxy() {
    let config = AppConfig { trust_proxy: false, ..config() };
    let app = router_with(&config, &["A", "B", "C"], &[]);
    let peer = ConnectInfo(SocketAddr::from(([203, 0, 113, 9], 5000)));

    let mut statuses = Vec::new();
    for (i, id) in ["1-2", "1-3"].into_iter().enumerate() {
        let mut request = vote_from(&format!("10.9.9.{i}"), id, Some("X"));
        request.extensions_mut().insert(peer);
        statuses.push(app.clone().oneshot(request).await.unwrap().status());
    }
    assert_eq!(statuses, vec![StatusCode::OK, StatusCode::TOO_MANY_REQUESTS]);
}

#[tokio::test]
async fn events_stream_vote_updates() {
    let app = router();
    let response = app.clone().oneshot(get("/events")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap();
    assert!(content_type.starts_with("text/event-stream"));

    let voted = app.oneshot(vote("1-3", Some("X"))).await.unwrap();
    assert_eq!(voted.status(), StatusCode::OK);

    let mut stream = response.into_body().into_data_stream();
    let mut text = String::new();
    while !text.contains("\n\n") {
        let chunk = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        text.push_str(std::str::from_utf8(&chunk).unwrap());
    }

    let frame = text.split("\n\n").next().unwrap();
    let mut lines = frame.lines();
    assert_eq!(lines.next(), Some("event: voteUpdate"));
    let data = lines.next().unwrap().strip_prefix("data: ").unwrap();
    let payload: Value = serde_json::from_str(data).unwrap();
    assert_eq!(payload, json!({"matchupId": "1-3", "newVoteCount": 1}));
}

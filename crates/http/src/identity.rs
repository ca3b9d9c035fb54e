//! Who is calling: the voter cookie and the client address.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{Extensions, HeaderMap};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use futurebattles_core::{
    VOTER_COOKIE_MAX_AGE_DAYS, VOTER_COOKIE_NAME, VOTE_MARKER_HEADER, VOTE_MARKER_VALUE,
};
use uuid::Uuid;

use crate::AppState;

/// Client address used as the abuse-guard key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAddr(pub String);

impl FromRequestParts<Arc<AppState>> for ClientAddr {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(client_addr(&parts.headers, &parts.extensions, state.trust_proxy)))
    }
}

/// Socket peer, else `"unknown"`.
///
/// With `trust_proxy`, the last `X-Forwarded-For` hop wins: that is the one
/// the proxy appended, while earlier hops are whatever the client sent.
pub fn client_addr(headers: &HeaderMap, extensions: &Extensions, trust_proxy: bool) -> String {
    if trust_proxy {
        let forwarded = headers
            .get_all("x-forwarded-for")
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .last();
        if let Some(addr) = forwarded {
            return addr.to_owned();
        }
    }
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "unknown".to_owned(), |ConnectInfo(peer)| peer.ip().to_string())
}

/// Whether the request carries the marker header required for vote mutations.
pub fn has_vote_marker(headers: &HeaderMap) -> bool {
    headers
        .get(VOTE_MARKER_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim().eq_ignore_ascii_case(VOTE_MARKER_VALUE))
}

/// Voter id from the identity cookie, if the client has one.
pub fn voter_id(jar: &CookieJar) -> Option<String> {
    jar.get(VOTER_COOKIE_NAME)
        .map(|c| c.value().trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Existing voter id, or a fresh one with the cookie added to the jar.
pub fn ensure_voter(jar: CookieJar) -> (CookieJar, String) {
    if let Some(id) = voter_id(&jar) {
        return (jar, id);
    }
    let id = Uuid::new_v4().to_string();
    tracing::debug!(voter = %id, "issuing voter cookie");
    let cookie = Cookie::build((VOTER_COOKIE_NAME, id.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(VOTER_COOKIE_MAX_AGE_DAYS));
    (jar.add(cookie), id)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn peer(extensions: &mut Extensions) {
        extensions.insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))));
    }

    #[test]
    fn forwarded_for_ignored_unless_proxy_trusted() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7"));
        let mut extensions = Extensions::new();
        peer(&mut extensions);
        assert_eq!(client_addr(&headers, &extensions, false), "127.0.0.1");
        assert_eq!(client_addr(&HeaderMap::new(), &Extensions::new(), false), "unknown");
    }

    #[test]
    fn trusted_proxy_hop_wins_over_client_supplied_hops() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(" 1.2.3.4 , 203.0.113.7 "));
        let mut extensions = Extensions::new();
        peer(&mut extensions);
        assert_eq!(client_addr(&headers, &extensions, true), "203.0.113.7");

        headers.append("x-forwarded-for", HeaderValue::from_static("198.51.100.9"));
        assert_eq!(client_addr(&headers, &extensions, true), "198.51.100.9");

        assert_eq!(client_addr(&HeaderMap::new(), &extensions, true), "127.0.0.1");
    }

    #[test]
    fn marker_header_is_required() {
        let mut headers = HeaderMap::new();
        assert!(!has_vote_marker(&headers));
        headers.insert(VOTE_MARKER_HEADER, HeaderValue::from_static("fetch"));
        assert!(!has_vote_marker(&headers));
        headers.insert(VOTE_MARKER_HEADER, HeaderValue::from_static("XMLHttpRequest"));
        assert!(has_vote_marker(&headers));
    }

    #[test]
    fn ensure_voter_reuses_existing_cookie() {
        let jar = CookieJar::new().add(Cookie::new(VOTER_COOKIE_NAME, "abc"));
        let (_, id) = ensure_voter(jar);
        assert_eq!(id, "abc");

        let (jar, id) = ensure_voter(CookieJar::new());
        let cookie = jar.get(VOTER_COOKIE_NAME).unwrap();
        assert_eq!(cookie.value(), id);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(time::Duration::days(365)));
    }
}

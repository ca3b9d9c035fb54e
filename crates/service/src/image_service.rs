//! Portrait lookup for candidates.
//!
//! Each name is turned into a handful of slug guesses; the first profile page
//! on the image site whose `og:image` meta tag is present wins. Misses are
//! cached like hits so a missing portrait is not re-fetched every request.
//! Upstream failures (timeouts, connection errors, 5xx) are never cached.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use futures_util::future::join_all;
use futurebattles_core::{ImageConfig, MAX_IMAGE_BATCH};
use regex::Regex;
use reqwest::{StatusCode, Url};

use crate::cache::ViewCache;
use crate::ServiceError;

static OG_IMAGE_PROPERTY_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+property\s*=\s*["']og:image["'][^>]*content\s*=\s*["']([^"']+)["']"#)
        .unwrap()
});
static OG_IMAGE_CONTENT_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+content\s*=\s*["']([^"']+)["'][^>]*property\s*=\s*["']og:image["']"#)
        .unwrap()
});

/// Slug guesses for `name`, most likely first, without duplicates.
///
/// `"Mr. Ex"` yields `mr.-ex`, `mr-ex`, `mrex`, `mr_ex`.
pub fn slug_variants(name: &str) -> Vec<String> {
    let lower = name.trim().to_lowercase();
    let words: Vec<&str> = lower.split_whitespace().collect();
    let clean: Vec<String> = words
        .iter()
        .map(|w| w.chars().filter(|c| c.is_alphanumeric() || *c == '-').collect::<String>())
        .filter(|w| !w.is_empty())
        .collect();

    let candidates = [
        words.join("-"),
        clean.join("-"),
        clean.concat().replace('-', ""),
        clean.join("_"),
    ];
    let mut variants: Vec<String> = Vec::with_capacity(candidates.len());
    for slug in candidates {
        if !slug.is_empty() && !variants.contains(&slug) {
            variants.push(slug);
        }
    }
    variants
}

fn extract_og_image(html: &str) -> Option<&str> {
    [&*OG_IMAGE_PROPERTY_FIRST, &*OG_IMAGE_CONTENT_FIRST]
        .into_iter()
        .find_map(|re| re.captures(html).and_then(|c| c.get(1)))
        .map(|m| m.as_str().trim())
        .filter(|url| !url.is_empty())
}

/// Outcome of fetching one profile page.
enum PageFetch {
    Found(String),
    /// The page does not exist or carries no `og:image`.
    Missing,
    /// The site could not answer; the same slug may work later.
    Failed,
}

pub struct ImageService {
    client: reqwest::Client,
    base_url: String,
    cache: Arc<dyn ViewCache<Option<String>>>,
}

impl ImageService {
    pub fn new(
        config: &ImageConfig,
        cache: Arc<dyn ViewCache<Option<String>>>,
    ) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("futurebattles/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ServiceError::Upstream(e.to_string()))?;
        let base_url = config.base_url.trim_end_matches('/').to_owned();
        Ok(Self { client, base_url, cache })
    }

    /// Portrait URL for one name, `None` when no slug variant has one.
    pub async fn lookup(&self, name: &str) -> Option<String> {
        let key = name.trim();
        if key.is_empty() {
            return None;
        }
        if let Some(cached) = self.cache.get(key) {
            return cached;
        }

        let mut upstream_failed = false;
        for slug in slug_variants(key) {
            match self.fetch_image(&slug).await {
                PageFetch::Found(url) => {
                    self.cache.insert(key, Some(url.clone()));
                    return Some(url);
                },
                PageFetch::Missing => {},
                PageFetch::Failed => upstream_failed = true,
            }
        }
        if upstream_failed {
            tracing::debug!(name = key, "portrait lookup incomplete, not caching");
        } else {
            tracing::debug!(name = key, "no portrait found");
            self.cache.insert(key, None);
        }
        None
    }

    /// Concurrent lookup of up to [`MAX_IMAGE_BATCH`] names; misses are omitted.
    pub async fn lookup_batch<S: AsRef<str>>(&self, names: &[S]) -> HashMap<String, String> {
        let mut unique: Vec<&str> = Vec::new();
        for name in names.iter().map(|n| n.as_ref().trim()).filter(|n| !n.is_empty()) {
            if !unique.contains(&name) {
                unique.push(name);
            }
        }
        if unique.len() > MAX_IMAGE_BATCH {
            tracing::debug!(requested = unique.len(), "image batch truncated");
            unique.truncate(MAX_IMAGE_BATCH);
        }

        let lookups = unique.iter().map(|name| async move { (*name, self.lookup(name).await) });
        join_all(lookups)
            .await
            .into_iter()
            .filter_map(|(name, url)| url.map(|u| (name.to_owned(), u)))
            .collect()
    }

    pub fn evict_expired(&self) -> usize {
        self.cache.evict_expired()
    }

    async fn fetch_image(&self, slug: &str) -> PageFetch {
        let page_url = format!("{}/{slug}", self.base_url);
        let response = match self.client.get(&page_url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(url = %page_url, "portrait fetch failed: {e}");
                return PageFetch::Failed;
            },
        };
        let status = response.status();
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            tracing::debug!(url = %page_url, %status, "image site unavailable");
            return PageFetch::Failed;
        }
        if !status.is_success() {
            return PageFetch::Missing;
        }
        let html = match response.text().await {
            Ok(html) => html,
            Err(e) => {
                tracing::debug!(url = %page_url, "portrait page read failed: {e}");
                return PageFetch::Failed;
            },
        };
        let Some(raw) = extract_og_image(&html) else {
            return PageFetch::Missing;
        };
        // Relative image paths resolve against the page they came from.
        match Url::parse(&page_url).and_then(|base| base.join(raw)) {
            Ok(url) => PageFetch::Found(url.to_string()),
            Err(_) => PageFetch::Found(raw.to_owned()),
        }
    }
}

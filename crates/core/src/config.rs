//! Runtime configuration assembled from environment variables.

use std::time::Duration;

use crate::{
    env_non_empty, env_parse_with_default, RankingPolicy, DEFAULT_API_RATE_LIMIT,
    DEFAULT_RECENT_PAIRING_WINDOW, DEFAULT_VOTE_RATE_LIMIT, DEFAULT_VOTE_WINDOW_MAX,
};

/// Default site scraped for emcee portraits.
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://www.fliptop.com.ph/emcees";

/// TTLs for each cached view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    pub leaderboard: Duration,
    pub stats: Duration,
    pub images: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            leaderboard: Duration::from_secs(120),
            stats: Duration::from_secs(60),
            images: Duration::from_secs(3600),
        }
    }
}

/// Limits enforced by the abuse guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardLimits {
    pub api_per_window: u32,
    pub votes_per_window: u32,
    pub votes_per_tracker_window: usize,
}

impl Default for GuardLimits {
    fn default() -> Self {
        Self {
            api_per_window: DEFAULT_API_RATE_LIMIT,
            votes_per_window: DEFAULT_VOTE_RATE_LIMIT,
            votes_per_tracker_window: DEFAULT_VOTE_WINDOW_MAX,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_IMAGE_BASE_URL.to_owned(), timeout: Duration::from_secs(5) }
    }
}

/// Everything the server reads from its environment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub ranking: RankingPolicy,
    pub cache: CacheTtls,
    pub guard: GuardLimits,
    pub images: ImageConfig,
    /// Key clients on the `X-Forwarded-For` hop appended by a reverse proxy
    /// instead of the socket peer. Only safe behind a proxy that sets it.
    pub trust_proxy: bool,
}

impl AppConfig {
    /// Load from the process environment, falling back to defaults.
    pub fn from_env() -> Self {
        let recent_window =
            env_parse_with_default("FB_RECENT_PAIRING_WINDOW", DEFAULT_RECENT_PAIRING_WINDOW);
        let ranking = match env_non_empty("FB_RANKING_POLICY") {
            Some(raw) => match raw.parse::<RankingPolicy>() {
                Ok(RankingPolicy::Tiered { .. }) => RankingPolicy::Tiered { recent_window },
                Ok(policy) => policy,
                Err(e) => {
                    tracing::warn!(value = %raw, "{e}, using tiered ranking");
                    RankingPolicy::Tiered { recent_window }
                },
            },
            None => RankingPolicy::Tiered { recent_window },
        };

        let defaults = CacheTtls::default();
        let cache = CacheTtls {
            leaderboard: Duration::from_secs(env_parse_with_default(
                "FB_LEADERBOARD_TTL_SECS",
                defaults.leaderboard.as_secs(),
            )),
            stats: Duration::from_secs(env_parse_with_default(
                "FB_STATS_TTL_SECS",
                defaults.stats.as_secs(),
            )),
            images: Duration::from_secs(env_parse_with_default(
                "FB_IMAGE_TTL_SECS",
                defaults.images.as_secs(),
            )),
        };

        let guard = GuardLimits {
            api_per_window: env_parse_with_default("FB_API_RATE_LIMIT", DEFAULT_API_RATE_LIMIT),
            votes_per_window: env_parse_with_default("FB_VOTE_RATE_LIMIT", DEFAULT_VOTE_RATE_LIMIT),
            votes_per_tracker_window: env_parse_with_default(
                "FB_VOTE_WINDOW_MAX",
                DEFAULT_VOTE_WINDOW_MAX,
            ),
        };

        let images = ImageConfig {
            base_url: env_non_empty("FB_IMAGE_BASE_URL")
                .unwrap_or_else(|| DEFAULT_IMAGE_BASE_URL.to_owned())
                .trim_end_matches('/')
                .to_owned(),
            timeout: Duration::from_secs(env_parse_with_default("FB_IMAGE_TIMEOUT_SECS", 5_u64)),
        };

        Self {
            database_url: database_url_from_env(),
            ranking,
            cache,
            guard,
            images,
            trust_proxy: env_parse_with_default("FB_TRUST_PROXY", false),
        }
    }
}

/// `DATABASE_URL`, or a URL assembled from the libpq `PG*` variables.
fn database_url_from_env() -> Option<String> {
    if let Some(url) = env_non_empty("DATABASE_URL") {
        return Some(url);
    }
    let host = env_non_empty("PGHOST")?;
    let port = env_parse_with_default("PGPORT", 5432_u16);
    let database = env_non_empty("PGDATABASE").unwrap_or_else(|| "postgres".to_owned());
    let user = env_non_empty("PGUSER").unwrap_or_else(|| "postgres".to_owned());
    let auth = match env_non_empty("PGPASSWORD") {
        Some(password) => format!("{user}:{password}"),
        None => user,
    };
    Some(format!("postgres://{auth}@{host}:{port}/{database}"))
}

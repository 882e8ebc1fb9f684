use std::time::Duration;

use clap::Args;

pub const DEFAULT_BASE_URL: &str = "https://boardgamegeek.com/xmlapi2";

// matches how long the old requests cache kept BGG responses
const TWELVE_HOURS: u64 = 12 * 60 * 60;

/// Settings for talking to the BGG XML API. Each can come from the
/// environment (or a `.env` file) as well as the command line.
#[derive(Args, Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    #[arg(long, env = "BGG_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "PLAYLOG_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,

    /// Retries for transient failures (timeouts, 5xx, 429)
    #[arg(long, env = "PLAYLOG_RETRIES", default_value_t = 3)]
    pub retries: usize,

    /// How long fetched plays and thumbnails stay cached
    #[arg(long, env = "PLAYLOG_CACHE_TTL_SECS", default_value_t = TWELVE_HOURS)]
    pub cache_ttl_secs: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout_secs: 10,
            retries: 3,
            cache_ttl_secs: TWELVE_HOURS,
        }
    }
}

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Prefix of every configuration variable
pub const ENV_PREFIX: &str = "VIBECAST_";

/// Recommender configuration loaded from `VIBECAST_*` environment variables
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Listen Notes API key; the provider is skipped without one
    pub listen_notes_api_key: Option<String>,

    #[serde(default = "default_listen_notes_url")]
    pub listen_notes_url: String,

    /// Spotify bearer token; the provider is skipped without one
    pub spotify_access_token: Option<String>,

    #[serde(default = "default_spotify_api_url")]
    pub spotify_api_url: String,

    #[serde(default = "default_provider_timeout_ms")]
    pub provider_timeout_ms: u64,

    #[serde(default = "default_search_deadline_ms")]
    pub search_deadline_ms: u64,

    /// JSON file for ratings and learned weights; in-memory when unset
    pub store_path: Option<PathBuf>,

    /// Serve the offline demo catalog when every provider comes back empty
    #[serde(default = "default_demo_fallback")]
    pub demo_fallback: bool,
}

fn default_listen_notes_url() -> String {
    "https://listen-api.listennotes.com/api/v2".to_string()
}

fn default_spotify_api_url() -> String {
    "https://api.spotify.com".to_string()
}

fn default_provider_timeout_ms() -> u64 {
    8_000
}

fn default_search_deadline_ms() -> u64 {
    20_000
}

fn default_demo_fallback() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_notes_api_key: None,
            listen_notes_url: default_listen_notes_url(),
            spotify_access_token: None,
            spotify_api_url: default_spotify_api_url(),
            provider_timeout_ms: default_provider_timeout_ms(),
            search_deadline_ms: default_search_deadline_ms(),
            store_path: None,
            demo_fallback: default_demo_fallback(),
        }
    }
}

impl Config {
    /// Load configuration from the environment (and an optional `.env`)
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::prefixed(ENV_PREFIX)
            .from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Load configuration from explicit `(name, value)` pairs
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed(ENV_PREFIX)
            .from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }

    pub fn search_deadline(&self) -> Duration {
        Duration::from_millis(self.search_deadline_ms)
    }

    pub fn has_live_provider(&self) -> bool {
        self.listen_notes_api_key.is_some() || self.spotify_access_token.is_some()
    }
}

//! Podcast-database provider backed by the Listen Notes search API.
//!
//! One request per query: `GET {base}/search?type=episode`, authenticated
//! with the `X-ListenAPI-Key` header. Episodes are limited to 5-180 minutes
//! and the last year of publications.

use crate::error::{ProviderError, Result};
use crate::provider::CatalogProvider;
use async_trait::async_trait;
use catalog::Episode;
use catalog::normalize::{normalize_batch, normalize_listen_notes_value};
use chrono::{Duration, Utc};
use reqwest::Client as HttpClient;
use serde::Deserialize;
use tracing::{debug, instrument};

pub const DEFAULT_BASE_URL: &str = "https://listen-api.listennotes.com/api/v2";

const PROVIDER: &str = "listen_notes";

/// Results stay undecoded so one bad record cannot fail the page
#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

#[derive(Clone)]
pub struct ListenNotesProvider {
    http_client: HttpClient,
    api_key: Option<String>,
    base_url: String,
}

impl ListenNotesProvider {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point at a different API root (mock servers, proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_http_client(mut self, http_client: HttpClient) -> Self {
        self.http_client = http_client;
        self
    }
}

#[async_trait]
impl CatalogProvider for ListenNotesProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    #[instrument(skip(self), fields(provider = PROVIDER))]
    async fn search_by_category(&self, term: &str, limit: usize) -> Result<Vec<Episode>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::unauthenticated(PROVIDER))?;

        let published_after = (Utc::now() - Duration::days(365))
            .timestamp_millis()
            .to_string();
        let url = format!("{}/search", self.base_url);

        let response = self
            .http_client
            .get(&url)
            .header("X-ListenAPI-Key", api_key)
            .query(&[
                ("q", term),
                ("type", "episode"),
                ("len_min", "5"),
                ("len_max", "180"),
                ("published_after", published_after.as_str()),
                ("safe_mode", "1"),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::http(PROVIDER, e))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ProviderError::unauthenticated(PROVIDER));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                provider: PROVIDER.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let payload: SearchResponse =
            response.json().await.map_err(|e| ProviderError::Malformed {
                provider: PROVIDER.to_string(),
                reason: e.to_string(),
            })?;

        let mut episodes = normalize_batch(&payload.results, PROVIDER, normalize_listen_notes_value);
        episodes.truncate(limit);

        debug!(term, count = episodes.len(), "Listen Notes search complete");
        Ok(episodes)
    }
}

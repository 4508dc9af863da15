//! Streaming-platform provider backed by the Spotify Web API.
//!
//! ## Algorithm
//! 1. Search shows for the query (`/v1/search?type=show`)
//! 2. Order shows by popularity, keep the top `MAX_SHOWS`
//! 3. Fetch up to `EPISODES_PER_SHOW` recent episodes per show, concurrently
//! 4. A show whose episode listing fails is kept as a show record
//!
//! Token acquisition happens outside this crate; the provider only carries
//! a bearer token and reports itself unavailable without one.

use crate::error::{ProviderError, Result};
use crate::provider::CatalogProvider;
use async_trait::async_trait;
use catalog::Episode;
use catalog::normalize::{
    SpotifyEpisode, SpotifyShow, decode_record, normalize_spotify_episode, normalize_spotify_show,
};
use futures::future::join_all;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

pub const DEFAULT_API_URL: &str = "https://api.spotify.com";

const PROVIDER: &str = "spotify";
const MAX_SHOWS: usize = 10;
const EPISODES_PER_SHOW: usize = 5;

/// Spotify paging object; `items` may contain nulls and stay undecoded
#[derive(Deserialize)]
struct Page {
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

impl Page {
    /// Decode every non-null item, dropping (and logging) the ones that fail
    fn decode<T: DeserializeOwned>(self) -> Vec<T> {
        self.items
            .iter()
            .filter(|item| !item.is_null())
            .filter_map(|item| match decode_record(item, PROVIDER) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(provider = PROVIDER, error = %e, "Dropping malformed record");
                    None
                }
            })
            .collect()
    }
}

#[derive(Deserialize)]
struct ShowSearchResponse {
    shows: Option<Page>,
}

#[derive(Clone)]
pub struct SpotifyProvider {
    http_client: HttpClient,
    access_token: Option<String>,
    api_url: String,
    market: String,
}

impl SpotifyProvider {
    pub fn new(access_token: Option<String>) -> Self {
        Self {
            http_client: HttpClient::new(),
            access_token: access_token.filter(|t| !t.trim().is_empty()),
            api_url: DEFAULT_API_URL.to_string(),
            market: "US".to_string(),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_market(mut self, market: impl Into<String>) -> Self {
        self.market = market.into();
        self
    }

    pub fn with_http_client(mut self, http_client: HttpClient) -> Self {
        self.http_client = http_client;
        self
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}{}", self.api_url, path);
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(token)
            .query(query)
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

        response.json().await.map_err(|e| ProviderError::Malformed {
            provider: PROVIDER.to_string(),
            reason: e.to_string(),
        })
    }

    async fn search_shows(&self, token: &str, term: &str, limit: usize) -> Result<Vec<SpotifyShow>> {
        let limit = limit.clamp(1, 50).to_string();
        let response: ShowSearchResponse = self
            .get_json(
                token,
                "/v1/search",
                &[
                    ("q", term),
                    ("type", "show"),
                    ("market", self.market.as_str()),
                    ("limit", limit.as_str()),
                ],
            )
            .await?;

        let mut shows: Vec<SpotifyShow> = response
            .shows
            .map(Page::decode)
            .unwrap_or_default();
        // Stable: equal popularity keeps search order
        shows.sort_by(|a, b| b.popularity.unwrap_or(0).cmp(&a.popularity.unwrap_or(0)));
        Ok(shows)
    }

    async fn show_episodes(&self, token: &str, show: &SpotifyShow) -> Result<Vec<SpotifyEpisode>> {
        let id = show.id.as_deref().ok_or_else(|| ProviderError::Malformed {
            provider: PROVIDER.to_string(),
            reason: "show without id".to_string(),
        })?;
        let limit = EPISODES_PER_SHOW.to_string();
        let page: Page = self
            .get_json(
                token,
                &format!("/v1/shows/{id}/episodes"),
                &[("market", self.market.as_str()), ("limit", limit.as_str())],
            )
            .await?;
        Ok(page.decode())
    }

    /// Episodes of one show, or the show itself when its listing fails
    async fn expand_show(&self, token: &str, show: &SpotifyShow) -> Vec<Episode> {
        match self.show_episodes(token, show).await {
            Ok(raw_episodes) if !raw_episodes.is_empty() => raw_episodes
                .iter()
                .filter_map(|raw| match normalize_spotify_episode(raw, show) {
                    Ok(episode) => Some(episode),
                    Err(e) => {
                        warn!(provider = PROVIDER, error = %e, "Dropping malformed record");
                        None
                    }
                })
                .collect(),
            Ok(_) => show_record(show),
            Err(e) => {
                warn!(
                    provider = PROVIDER,
                    show = show.name.as_deref().unwrap_or("?"),
                    error = %e,
                    "Episode listing failed, keeping show record"
                );
                show_record(show)
            }
        }
    }
}

fn show_record(show: &SpotifyShow) -> Vec<Episode> {
    match normalize_spotify_show(show) {
        Ok(record) => vec![record],
        Err(e) => {
            warn!(provider = PROVIDER, error = %e, "Dropping malformed record");
            Vec::new()
        }
    }
}

#[async_trait]
impl CatalogProvider for SpotifyProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn is_available(&self) -> bool {
        self.access_token.is_some()
    }

    #[instrument(skip(self), fields(provider = PROVIDER))]
    async fn search_by_category(&self, term: &str, limit: usize) -> Result<Vec<Episode>> {
        let token = self
            .access_token
            .as_deref()
            .ok_or_else(|| ProviderError::unauthenticated(PROVIDER))?;

        let shows = self.search_shows(token, term, limit.max(MAX_SHOWS)).await?;
        let top_shows = &shows[..shows.len().min(MAX_SHOWS)];

        let expanded = join_all(top_shows.iter().map(|show| self.expand_show(token, show))).await;
        let mut episodes: Vec<Episode> = expanded.into_iter().flatten().collect();
        episodes.truncate(limit);

        debug!(
            term,
            shows = top_shows.len(),
            count = episodes.len(),
            "Spotify search complete"
        );
        Ok(episodes)
    }
}

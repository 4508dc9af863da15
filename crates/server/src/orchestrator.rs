//! # Recommendation Orchestrator
//!
//! This module coordinates the recommendation flow for many listeners:
//! 1. Map the mood/theme selection to category search terms
//! 2. Gather an episode pool from the catalog providers
//! 3. Rank the pool against the listener's stored preferences
//! 4. Serve the top pick, then shuffled alternatives
//! 5. Feed ratings and playback back into the preference store
//!
//! Every listener gets a `SessionState` of their own, keyed by a session id.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use catalog::{
    DemoCatalog, Episode, ImplicitFeedback, PreferenceWeight, RatingRecord, VibeSelection,
    search_terms_for,
};
use pipeline::{Ranker, ScoredEpisode, ScoringEngine, SessionState, ShuffleSelector};
use sources::{
    AggregatorConfig, CatalogAggregator, DemoProvider, ListenNotesProvider, ProviderStatus,
    SpotifyProvider,
};
use store::{FallbackStore, JsonFileStore, MemoryStore, PlaybackEvent, PreferenceStore};

use crate::config::Config;

pub type SessionId = String;

#[derive(Error, Debug, PartialEq)]
pub enum RecommenderError {
    #[error("Unknown session: {0}")]
    UnknownSession(SessionId),
}

/// Result of one search
#[derive(Debug, Clone)]
pub struct Recommendation {
    /// Best episode, `None` when nothing fits the selection
    pub pick: Option<ScoredEpisode>,
    /// Full ranked list the shuffles draw from
    pub ranked: Vec<ScoredEpisode>,
    /// Episodes gathered before duration filtering
    pub pool_size: usize,
}

/// Main orchestrator that owns the providers, the ranking core, the
/// preference store and all live sessions
pub struct Recommender {
    aggregator: CatalogAggregator,
    ranker: Ranker,
    store: Arc<dyn PreferenceStore>,
    shuffler: Mutex<ShuffleSelector<StdRng>>,
    sessions: RwLock<HashMap<SessionId, Arc<Mutex<SessionState>>>>,
}

impl Recommender {
    pub fn new(aggregator: CatalogAggregator, store: Arc<dyn PreferenceStore>) -> Self {
        let ranker = Ranker::new(Arc::new(ScoringEngine::new(store.clone())));
        Self {
            aggregator,
            ranker,
            store,
            shuffler: Mutex::new(ShuffleSelector::new(StdRng::from_os_rng())),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_ranker(mut self, ranker: Ranker) -> Self {
        self.ranker = ranker;
        self
    }

    /// Deterministic shuffles
    pub fn with_shuffle_seed(mut self, seed: u64) -> Self {
        self.shuffler = Mutex::new(ShuffleSelector::new(StdRng::seed_from_u64(seed)));
        self
    }

    /// Build providers and the store from configuration.
    ///
    /// 1. Listen Notes and Spotify are added when credentials are present
    /// 2. Without any live provider the demo catalog is searched directly
    /// 3. A configured store path gets a JSON file store mirrored in memory
    pub async fn from_config(config: &Config) -> Result<Self> {
        let mut aggregator = CatalogAggregator::new().with_config(
            AggregatorConfig::default()
                .with_provider_timeout(config.provider_timeout())
                .with_search_deadline(config.search_deadline()),
        );

        if let Some(token) = &config.spotify_access_token {
            aggregator = aggregator.add_provider(
                SpotifyProvider::new(Some(token.clone())).with_api_url(&config.spotify_api_url),
            );
        }
        if let Some(key) = &config.listen_notes_api_key {
            aggregator = aggregator.add_provider(
                ListenNotesProvider::new(Some(key.clone())).with_base_url(&config.listen_notes_url),
            );
        }
        if !config.has_live_provider() {
            info!("No catalog credentials configured, using the demo catalog");
            aggregator = aggregator.add_provider(DemoProvider::new());
        }
        if config.demo_fallback {
            aggregator = aggregator.with_demo_fallback(DemoCatalog::new());
        }

        let store: Arc<dyn PreferenceStore> = match &config.store_path {
            Some(path) => {
                let file = JsonFileStore::open(path)
                    .await
                    .with_context(|| format!("Failed to open preference store {:?}", path))?;
                info!("Using preference store at {:?}", path);
                Arc::new(FallbackStore::new(file, MemoryStore::new()))
            }
            None => Arc::new(MemoryStore::new()),
        };

        Ok(Self::new(aggregator, store))
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    pub async fn start_session(&self) -> SessionId {
        let id = uuid::Uuid::new_v4().to_string();
        self.sessions
            .write()
            .await
            .insert(id.clone(), Arc::new(Mutex::new(SessionState::new())));
        info!(session = %id, "Started session");
        id
    }

    pub async fn end_session(&self, session_id: &str) -> bool {
        self.sessions.write().await.remove(session_id).is_some()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn session(&self, session_id: &str) -> Result<Arc<Mutex<SessionState>>> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| RecommenderError::UnknownSession(session_id.to_string()).into())
    }

    // =========================================================================
    // Ranking API
    // =========================================================================

    /// Main entry point: search, rank and pick for a selection.
    ///
    /// The ranked list becomes the session's shuffle pool and its top
    /// entry the current pick.
    pub async fn recommend(
        &self,
        session_id: &str,
        selection: &VibeSelection,
    ) -> Result<Recommendation> {
        let start_time = Instant::now();
        let session = self.session(session_id).await?;

        let terms = search_terms_for(&selection.moods, &selection.themes);
        let pool = self
            .aggregator
            .search(&terms, selection.target_minutes)
            .await
            .context("Catalog search failed")?;
        info!(
            "Gathered {} episodes for {} search terms",
            pool.len(),
            terms.len()
        );

        let mut state = session.lock().await;
        let ranked = self
            .ranker
            .rank(&pool, selection, &mut state)
            .await
            .context("Ranking failed")?;
        state.begin_search(ranked.clone());
        let pick = state.current.clone();

        match &pick {
            Some(top) => info!(
                session = %session_id,
                "Recommended {} ({:.1}) in {:.2?}",
                top.episode.id,
                top.score,
                start_time.elapsed()
            ),
            None => info!(session = %session_id, "No episode fits the selection"),
        }

        Ok(Recommendation {
            pick,
            ranked,
            pool_size: pool.len(),
        })
    }

    /// Rank a caller-supplied pool within a session.
    ///
    /// Like `recommend`, the result becomes the session's shuffle pool and
    /// its top entry the current pick.
    pub async fn rank_episodes(
        &self,
        session_id: &str,
        pool: &[Episode],
        selection: &VibeSelection,
    ) -> Result<Vec<ScoredEpisode>> {
        let session = self.session(session_id).await?;
        let mut state = session.lock().await;
        let ranked = self
            .ranker
            .rank(pool, selection, &mut state)
            .await
            .context("Ranking failed")?;
        state.begin_search(ranked.clone());
        Ok(ranked)
    }

    /// Next alternative for the session; the current pick counts as skipped.
    ///
    /// `Ok(None)` means the session has run out of fresh episodes.
    pub async fn shuffle_next(&self, session_id: &str) -> Result<Option<ScoredEpisode>> {
        let session = self.session(session_id).await?;
        let mut state = session.lock().await;
        if state.current.is_some() {
            state.record_skip();
        }

        let next = self.shuffler.lock().await.next(&mut state);
        if next.is_none() {
            info!(session = %session_id, "Shuffle exhausted, a new search is needed");
        }
        Ok(next)
    }

    /// Store a rating, learn from it and end the session's skip streak
    pub async fn submit_rating(
        &self,
        record: RatingRecord,
        session_id: Option<&str>,
    ) -> Result<Vec<PreferenceWeight>> {
        let weights = store::submit_rating(self.store.as_ref(), record)
            .await
            .context("Failed to submit rating")?;

        if let Some(session_id) = session_id {
            match self.session(session_id).await {
                Ok(session) => session.lock().await.reset_skips(),
                Err(e) => warn!("Rating stored without session update: {}", e),
            }
        }
        Ok(weights)
    }

    pub async fn record_playback(&self, event: PlaybackEvent) -> Result<ImplicitFeedback> {
        store::record_playback(self.store.as_ref(), event)
            .await
            .context("Failed to record playback")
    }

    pub fn provider_status(&self) -> Vec<ProviderStatus> {
        self.aggregator.provider_status()
    }

    pub fn store(&self) -> &Arc<dyn PreferenceStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{Mood, Theme};
    use std::collections::HashSet;

    // ============================================================================
    // Test Fixtures
    // ============================================================================

    fn demo_recommender() -> Recommender {
        let aggregator = CatalogAggregator::new()
            .add_provider(DemoProvider::new())
            .with_demo_fallback(DemoCatalog::new());
        Recommender::new(aggregator, Arc::new(MemoryStore::new())).with_shuffle_seed(3)
    }

    fn selection() -> VibeSelection {
        VibeSelection::new(vec![Mood::Bored], vec![Theme::Laugh], 30)
    }

    // ============================================================================
    // Tests
    // ============================================================================

    #[tokio::test]
    async fn test_recommend_sets_current_pick() {
        let recommender = demo_recommender();
        let session = recommender.start_session().await;

        let recommendation = recommender.recommend(&session, &selection()).await.unwrap();
        let pick = recommendation.pick.expect("demo catalog has a match");
        assert_eq!(pick.episode.id, recommendation.ranked[0].episode.id);
        assert!(pick.episode.id.starts_with("demo:"));
        assert!(recommendation.pool_size >= recommendation.ranked.len());
    }

    #[tokio::test]
    async fn test_unknown_session_is_rejected() {
        let recommender = demo_recommender();
        let err = recommender.shuffle_next("missing").await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<RecommenderError>(),
            Some(&RecommenderError::UnknownSession("missing".to_string()))
        );
    }

    #[tokio::test]
    async fn test_shuffles_until_exhausted_without_repeats() {
        let recommender = demo_recommender();
        let session = recommender.start_session().await;
        let recommendation = recommender.recommend(&session, &selection()).await.unwrap();

        let mut seen: HashSet<String> = recommendation
            .pick
            .iter()
            .map(|p| p.episode.id.clone())
            .collect();
        while let Some(next) = recommender.shuffle_next(&session).await.unwrap() {
            assert!(seen.insert(next.episode.id.clone()));
        }
        assert_eq!(seen.len(), recommendation.ranked.len());
    }

    #[tokio::test]
    async fn test_rank_episodes_feeds_shuffle() {
        let recommender = demo_recommender();
        let session = recommender.start_session().await;
        let pool: Vec<Episode> = (0..6)
            .map(|i| Episode::new(format!("own:{i}"), format!("Episode {i}"), format!("Show {i}"), 45 * 60))
            .collect();
        let selection = VibeSelection::new(vec![Mood::Bored], vec![Theme::Laugh], 45);

        let ranked = recommender
            .rank_episodes(&session, &pool, &selection)
            .await
            .unwrap();
        assert_eq!(ranked.len(), 6);
        let top = ranked[0].episode.id.clone();

        let mut alternatives = HashSet::new();
        while let Some(next) = recommender.shuffle_next(&session).await.unwrap() {
            assert_ne!(next.episode.id, top);
            assert!(alternatives.insert(next.episode.id.clone()));
        }
        assert_eq!(alternatives.len(), 5);
    }

    #[tokio::test]
    async fn test_skips_reset_by_rating() {
        let recommender = demo_recommender();
        let session = recommender.start_session().await;
        recommender.recommend(&session, &selection()).await.unwrap();
        recommender.shuffle_next(&session).await.unwrap();
        recommender.shuffle_next(&session).await.unwrap();

        let state = recommender.session(&session).await.unwrap();
        assert_eq!(state.lock().await.consecutive_skips, 2);

        let current = state.lock().await.current.clone().unwrap();
        let record = RatingRecord::new(
            current.episode.id.clone(),
            5,
            vec![Mood::Bored],
            vec![Theme::Laugh],
        )
        .unwrap();
        let weights = recommender
            .submit_rating(record, Some(&session))
            .await
            .unwrap();

        assert_eq!(weights.len(), 1);
        assert_eq!(state.lock().await.consecutive_skips, 0);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let recommender = demo_recommender();
        let first = recommender.start_session().await;
        let second = recommender.start_session().await;
        assert_ne!(first, second);

        recommender.recommend(&first, &selection()).await.unwrap();
        let untouched = recommender.session(&second).await.unwrap();
        assert_eq!(untouched.lock().await.session_count, 0);
        assert!(untouched.lock().await.recent.is_empty());

        assert!(recommender.end_session(&first).await);
        assert_eq!(recommender.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_from_config_without_credentials_uses_demo() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            store_path: Some(dir.path().join("prefs.json")),
            ..Config::default()
        };
        let recommender = Recommender::from_config(&config).await.unwrap();

        let status = recommender.provider_status();
        assert_eq!(status.len(), 1);
        assert_eq!(status[0].name, "demo");

        let feedback = recommender
            .record_playback(PlaybackEvent::new("demo:1", 900, 1800))
            .await
            .unwrap();
        assert_eq!(feedback.plays, 1);
        assert!((feedback.completion_rate - 0.5).abs() < 1e-9);
    }
}

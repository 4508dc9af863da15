//! Ranker: duration filtering with progressive widening, concurrent
//! scoring and a deterministic sort.

use crate::filter_pipeline::FilterPipeline;
use crate::filters::DurationWindowFilter;
use crate::scoring::{ScoredEpisode, ScoringContext, ScoringEngine};
use crate::session::SessionState;
use anyhow::{Context, Result};
use catalog::{Episode, VibeSelection};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Duration windows and the widening threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct RankerConfig {
    /// First window, minutes either side of the target
    pub primary_tolerance_minutes: f64,
    /// Window used when the first one keeps too few episodes
    pub widened_tolerance_minutes: f64,
    /// Survivors needed to skip widening
    pub min_candidates: usize,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            primary_tolerance_minutes: 15.0,
            widened_tolerance_minutes: 25.0,
            min_candidates: 15,
        }
    }
}

#[derive(Clone)]
pub struct Ranker {
    engine: Arc<ScoringEngine>,
    config: RankerConfig,
}

impl Ranker {
    pub fn new(engine: Arc<ScoringEngine>) -> Self {
        Self {
            engine,
            config: RankerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RankerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &RankerConfig {
        &self.config
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Episodes inside the duration window, widened when too few survive.
    ///
    /// ## Algorithm
    /// 1. Keep episodes within the primary tolerance
    /// 2. With fewer than `min_candidates` survivors, re-filter the
    ///    original pool with the widened tolerance
    pub fn filter_candidates(
        &self,
        pool: &[Episode],
        selection: &VibeSelection,
    ) -> Result<Vec<Episode>> {
        let primary = FilterPipeline::new()
            .add_filter(DurationWindowFilter::new(self.config.primary_tolerance_minutes));
        let candidates = primary
            .apply(pool.to_vec(), selection)
            .context("Primary duration filter failed")?;

        if candidates.len() >= self.config.min_candidates {
            return Ok(candidates);
        }

        debug!(
            "Only {} candidates within ±{} min, widening to ±{} min",
            candidates.len(),
            self.config.primary_tolerance_minutes,
            self.config.widened_tolerance_minutes
        );
        let widened = FilterPipeline::new()
            .add_filter(DurationWindowFilter::new(self.config.widened_tolerance_minutes));
        widened
            .apply(pool.to_vec(), selection)
            .context("Widened duration filter failed")
    }

    /// Rank a pool for a selection and remember the top pick.
    ///
    /// ## Algorithm
    /// 1. Filter by duration (with widening)
    /// 2. Score every survivor concurrently against one shared context
    /// 3. Sort by score descending, ties by episode id ascending
    /// 4. Push the top pick onto the session's recent window
    ///
    /// An empty result is not an error.
    #[instrument(skip(self, pool, session), fields(pool = pool.len()))]
    pub async fn rank(
        &self,
        pool: &[Episode],
        selection: &VibeSelection,
        session: &mut SessionState,
    ) -> Result<Vec<ScoredEpisode>> {
        let start_time = Instant::now();
        let candidates = self.filter_candidates(pool, selection)?;
        if candidates.is_empty() {
            info!("No episodes within the duration window");
            return Ok(Vec::new());
        }

        let ctx = ScoringContext::new(selection.clone(), session.recent.clone());
        let mut ranked = join_all(
            candidates
                .iter()
                .map(|episode| self.engine.score(episode, &ctx)),
        )
        .await;
        sort_ranked(&mut ranked);

        if let Some(top) = ranked.first() {
            session.recent.push(&top.episode);
        }

        info!(
            "Ranked {} of {} episodes in {:.2?}",
            ranked.len(),
            pool.len(),
            start_time.elapsed()
        );
        Ok(ranked)
    }
}

/// Score descending, then episode id ascending
pub fn sort_ranked(ranked: &mut [ScoredEpisode]) {
    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.episode.id.cmp(&b.episode.id))
    });
}

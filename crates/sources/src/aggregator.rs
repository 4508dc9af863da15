//! # Catalog Aggregator
//!
//! Turns category search terms into one de-duplicated episode pool.
//!
//! ## Algorithm
//! 1. Primary query = first term (or "podcast" when there are none), plus up
//!    to `supplementary_queries` following terms
//! 2. Walk providers in priority order; skip unavailable ones
//! 3. Run each query under the per-provider timeout, bounded by the overall
//!    search deadline; a failed or timed-out call ends that provider's turn
//! 4. Merge results: de-duplicate by id and by normalized title (first
//!    occurrence wins, categories are unioned), tag every episode with the
//!    query it was found under
//! 5. Stop asking further providers once `max_results` unique episodes exist
//! 6. Optionally narrow the pool to +/-50% of the target duration
//! 7. Empty pool: fall back to the demo catalog, or report every failure

use crate::error::{AggregateError, ProviderError};
use crate::provider::{CatalogProvider, ProviderStatus};
use catalog::{DemoCatalog, Episode, normalized_title};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, timeout};
use tracing::{debug, error, info, instrument, warn};

/// Query used when a selection maps to no category at all
pub const FALLBACK_QUERY: &str = "podcast";

#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Stop querying further providers at this many unique episodes
    pub max_results: usize,
    /// Extra queries after the primary one
    pub supplementary_queries: usize,
    /// `limit` passed to each provider call
    pub per_query_limit: usize,
    pub provider_timeout: Duration,
    pub search_deadline: Duration,
    pub duration_prefilter: bool,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            max_results: 20,
            supplementary_queries: 2,
            per_query_limit: 20,
            provider_timeout: Duration::from_millis(8_000),
            search_deadline: Duration::from_millis(20_000),
            duration_prefilter: true,
        }
    }
}

impl AggregatorConfig {
    pub fn with_provider_timeout(mut self, provider_timeout: Duration) -> Self {
        self.provider_timeout = provider_timeout;
        self
    }

    pub fn with_search_deadline(mut self, search_deadline: Duration) -> Self {
        self.search_deadline = search_deadline;
        self
    }

    pub fn with_duration_prefilter(mut self, enabled: bool) -> Self {
        self.duration_prefilter = enabled;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

// =============================================================================
// Merged Pool
// =============================================================================

/// Insertion-ordered pool with id and title identity
#[derive(Default)]
struct MergedPool {
    episodes: Vec<Episode>,
    by_id: HashMap<String, usize>,
    by_title: HashMap<String, usize>,
}

impl MergedPool {
    fn len(&self) -> usize {
        self.episodes.len()
    }

    fn insert(&mut self, mut episode: Episode, query: &str) {
        episode.add_category(query);
        let title_key = normalized_title(&episode.title);

        let existing = self
            .by_id
            .get(&episode.id)
            .or_else(|| self.by_title.get(&title_key))
            .copied();

        match existing {
            Some(index) => {
                let kept = &mut self.episodes[index];
                for category in &episode.categories {
                    kept.add_category(category);
                }
            }
            None => {
                let index = self.episodes.len();
                self.by_id.insert(episode.id.clone(), index);
                self.by_title.entry(title_key).or_insert(index);
                self.episodes.push(episode);
            }
        }
    }

    fn into_episodes(self) -> Vec<Episode> {
        self.episodes
    }
}

// =============================================================================
// Aggregator
// =============================================================================

pub struct CatalogAggregator {
    providers: Vec<Arc<dyn CatalogProvider>>,
    demo_fallback: Option<DemoCatalog>,
    config: AggregatorConfig,
}

impl CatalogAggregator {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            demo_fallback: None,
            config: AggregatorConfig::default(),
        }
    }

    /// Append a provider; earlier providers have priority
    pub fn add_provider(mut self, provider: impl CatalogProvider + 'static) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    pub fn add_shared_provider(mut self, provider: Arc<dyn CatalogProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Last-resort catalog used when every provider comes back empty
    pub fn with_demo_fallback(mut self, catalog: DemoCatalog) -> Self {
        self.demo_fallback = Some(catalog);
        self
    }

    pub fn with_config(mut self, config: AggregatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    pub fn provider_status(&self) -> Vec<ProviderStatus> {
        self.providers
            .iter()
            .map(|p| ProviderStatus {
                name: p.name().to_string(),
                available: p.is_available(),
            })
            .collect()
    }

    /// Queries issued for a term list: primary first, then supplementary
    pub fn queries_for(&self, terms: &[String]) -> Vec<String> {
        match terms.first() {
            None => vec![FALLBACK_QUERY.to_string()],
            Some(primary) => std::iter::once(primary.clone())
                .chain(
                    terms
                        .iter()
                        .skip(1)
                        .take(self.config.supplementary_queries)
                        .cloned(),
                )
                .collect(),
        }
    }

    /// Gather a de-duplicated pool for `terms`.
    ///
    /// # Errors
    /// `AggregateError::AllProvidersFailed` when the pool is empty and no demo
    /// fallback is configured; the messages name every provider's failure.
    #[instrument(skip(self, terms), fields(terms = terms.len()))]
    pub async fn search(
        &self,
        terms: &[String],
        target_minutes: u32,
    ) -> Result<Vec<Episode>, AggregateError> {
        let queries = self.queries_for(terms);
        let deadline = Instant::now() + self.config.search_deadline;
        let mut pool = MergedPool::default();
        let mut failures: Vec<String> = Vec::new();

        'providers: for provider in &self.providers {
            if pool.len() >= self.config.max_results {
                break;
            }
            let name = provider.name().to_string();
            if !provider.is_available() {
                debug!(provider = %name, "Skipping unavailable provider");
                failures.push(ProviderError::unauthenticated(&name).to_string());
                continue;
            }

            let before = pool.len();
            for query in &queries {
                if pool.len() >= self.config.max_results {
                    break;
                }
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    warn!("Search deadline reached, not querying further providers");
                    failures.push(format!("search deadline reached before {name}"));
                    break 'providers;
                }
                let budget = remaining.min(self.config.provider_timeout);

                let call = provider.search_by_category(query, self.config.per_query_limit);
                match timeout(budget, call).await {
                    Ok(Ok(episodes)) => {
                        debug!(provider = %name, query = %query, count = episodes.len(), "Provider answered");
                        for episode in episodes {
                            pool.insert(episode, query);
                        }
                    }
                    Ok(Err(e)) => {
                        warn!(provider = %name, query = %query, error = %e, "Provider failed");
                        failures.push(e.to_string());
                        break;
                    }
                    Err(_) => {
                        let e = ProviderError::Timeout {
                            provider: name.clone(),
                            timeout_ms: budget.as_millis() as u64,
                        };
                        warn!(provider = %name, query = %query, error = %e, "Provider timed out");
                        failures.push(e.to_string());
                        break;
                    }
                }
            }

            let contributed = pool.len() - before;
            if contributed == 0 {
                failures.push(format!("{name} returned no episodes"));
            }
            info!(provider = %name, contributed, total = pool.len(), "Provider done");
        }

        let mut episodes = pool.into_episodes();

        if episodes.is_empty() {
            return match &self.demo_fallback {
                Some(catalog) => {
                    info!("No provider results, using demo catalog");
                    Ok(catalog.best_of())
                }
                None => {
                    error!(failures = failures.len(), "All catalog providers failed");
                    Err(AggregateError::AllProvidersFailed { messages: failures })
                }
            };
        }

        if self.config.duration_prefilter && episodes.len() > self.config.max_results {
            episodes = prefilter_by_duration(episodes, target_minutes);
        }

        Ok(episodes)
    }
}

impl Default for CatalogAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// Keep episodes within +/-50% of the target, unless that leaves 5 or fewer
fn prefilter_by_duration(episodes: Vec<Episode>, target_minutes: u32) -> Vec<Episode> {
    let target = target_minutes as f64;
    let (min, max) = (target * 0.5, target * 1.5);
    let kept: Vec<Episode> = episodes
        .iter()
        .filter(|e| {
            let minutes = e.duration_minutes();
            minutes >= min && minutes <= max
        })
        .cloned()
        .collect();

    if kept.len() > 5 {
        debug!(before = episodes.len(), after = kept.len(), "Applied duration prefilter");
        kept
    } else {
        episodes
    }
}

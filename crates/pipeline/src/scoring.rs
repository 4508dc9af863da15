//! Scoring engine: turns one episode plus the request context into a
//! weighted score with an explanation.
//!
//! ## Algorithm
//! 1. Compute the content factors (category, duration, popularity, top
//!    quality, quality signals, diversity, keyword fallback)
//! 2. Read the preference store for the personal-fit factor
//! 3. Sum `factor * weight` over all factors, unnormalized
//! 4. Collect every factor's reasons in computation order

use crate::factors::{self, Factor};
use crate::session::RecentWindow;
use catalog::{
    CategorySet, Episode, ImplicitFeedback, PreferenceWeight, RatingRecord, VibeSelection,
    categories_for,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use store::PreferenceStore;
use tracing::{debug, warn};

/// Personal fit when the store knows nothing about this episode or selection
pub const NEUTRAL_PERSONAL_FIT: f64 = 0.5;

/// Bound of the raw personal bonus before normalization
const PERSONAL_BONUS_LIMIT: f64 = 6.0;

/// Multiplier on the mean learned (mood, theme) weight
const LEARNED_WEIGHT_SCALE: f64 = 3.0;

/// Multiplier on per-mood rating deviations
const MOOD_RATING_SCALE: f64 = 1.5;

// =============================================================================
// Weights & Breakdown
// =============================================================================

/// Weight of each factor in the final sum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringWeights {
    pub category: f64,
    pub duration: f64,
    pub personal: f64,
    pub popularity: f64,
    pub top_quality: f64,
    pub quality: f64,
    pub diversity: f64,
    pub keyword: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            category: 30.0,
            duration: 25.0,
            personal: 20.0,
            popularity: 35.0,
            top_quality: 15.0,
            quality: 12.0,
            diversity: 5.0,
            keyword: 0.0,
        }
    }
}

impl ScoringWeights {
    /// Re-enable the legacy keyword tiebreaker
    pub fn with_keyword_fallback(mut self, weight: f64) -> Self {
        self.keyword = weight;
        self
    }
}

/// Raw factor values of one scored episode.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub category: f64,
    pub duration: f64,
    pub personal: f64,
    pub popularity: f64,
    pub top_quality: f64,
    pub quality: f64,
    pub diversity: f64,
    pub keyword: f64,
}

impl ScoreBreakdown {
    pub fn weighted(&self, weights: &ScoringWeights) -> f64 {
        self.category * weights.category
            + self.duration * weights.duration
            + self.personal * weights.personal
            + self.popularity * weights.popularity
            + self.top_quality * weights.top_quality
            + self.quality * weights.quality
            + self.diversity * weights.diversity
            + self.keyword * weights.keyword
    }
}

/// An episode with its score and explanation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredEpisode {
    pub episode: Episode,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    pub match_reasons: Vec<String>,
}

impl ScoredEpisode {
    /// Human-readable explanation, reasons joined in computation order
    pub fn match_reason(&self) -> String {
        self.match_reasons.join(" • ")
    }
}

// =============================================================================
// Context
// =============================================================================

/// Per-request inputs shared by every episode scored in one ranking call.
#[derive(Debug, Clone)]
pub struct ScoringContext {
    pub selection: VibeSelection,
    pub categories: CategorySet,
    pub now: DateTime<Utc>,
    pub recent: RecentWindow,
}

impl ScoringContext {
    pub fn new(selection: VibeSelection, recent: RecentWindow) -> Self {
        Self::at(selection, recent, Utc::now())
    }

    /// Context with a fixed clock
    pub fn at(selection: VibeSelection, recent: RecentWindow, now: DateTime<Utc>) -> Self {
        let categories = categories_for(&selection.moods, &selection.themes);
        Self {
            selection,
            categories,
            now,
            recent,
        }
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Scores episodes against a selection using content factors and the
/// listener's stored feedback.
#[derive(Clone)]
pub struct ScoringEngine {
    store: Arc<dyn PreferenceStore>,
    weights: ScoringWeights,
}

impl ScoringEngine {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self {
            store,
            weights: ScoringWeights::default(),
        }
    }

    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Score one episode. Never fails: a store error only zeroes the
    /// personal-fit factor.
    pub async fn score(&self, episode: &Episode, ctx: &ScoringContext) -> ScoredEpisode {
        let selection = &ctx.selection;
        let category = factors::category_relevance(episode, &ctx.categories);
        let duration = factors::duration_fit(episode, selection.target_minutes);
        let personal = self.personal_fit(episode, selection).await;
        let popularity = factors::popularity(episode);
        let top_quality = factors::top_quality(episode);
        let quality = factors::quality_signals(episode, ctx.now);
        let diversity = factors::diversity(episode, &ctx.recent);
        let keyword = factors::keyword_match(episode, &selection.moods, &selection.themes);

        let breakdown = ScoreBreakdown {
            category: category.value,
            duration: duration.value,
            personal: personal.value,
            popularity: popularity.value,
            top_quality: top_quality.value,
            quality: quality.value,
            diversity: diversity.value,
            keyword: keyword.value,
        };
        let score = breakdown.weighted(&self.weights);

        let mut match_reasons = Vec::new();
        for factor in [category, duration, personal, popularity, top_quality, quality, diversity] {
            match_reasons.extend(factor.reasons);
        }
        if self.weights.keyword > 0.0 {
            match_reasons.extend(keyword.reasons);
        }

        debug!(episode = %episode.id, score, "Scored episode");

        ScoredEpisode {
            episode: episode.clone(),
            score,
            breakdown,
            match_reasons,
        }
    }

    async fn personal_fit(&self, episode: &Episode, selection: &VibeSelection) -> Factor {
        let lookup = futures::try_join!(
            self.store.ratings_for_episode(&episode.id),
            self.store.get_preference_weights(),
            self.store.get_implicit_feedback(&episode.id),
        );

        match lookup {
            Ok((ratings, weights, implicit)) => {
                match personal_bonus(&ratings, &weights, implicit.as_ref(), selection) {
                    Some(bonus) => {
                        let value = normalize_bonus(bonus);
                        let factor = Factor::new(value);
                        if value > 0.6 {
                            factor.with_reason("Matches what you've enjoyed before")
                        } else {
                            factor
                        }
                    }
                    None => Factor::new(NEUTRAL_PERSONAL_FIT),
                }
            }
            Err(e) => {
                warn!(
                    store = self.store.name(),
                    episode = %episode.id,
                    error = %e,
                    "Preference lookup failed, personal fit set to 0"
                );
                Factor::new(0.0)
            }
        }
    }
}

// =============================================================================
// Personal Fit
// =============================================================================

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Raw personal bonus, or `None` when there is no signal at all.
///
/// ## Algorithm
/// 1. Overall rating of this episode: avg - 3
/// 2. Each selected mood: 1.5 * (avg of this episode's ratings under that mood - 3)
/// 3. Each selected theme: avg - 3 of ratings under that theme
/// 4. Learned weights of the selected (mood, theme) pairs: 3 * mean
/// 5. Implicit: (completion - 0.5) * 4 once played, minus skip and
///    fast-forward penalties
pub fn personal_bonus(
    ratings: &[RatingRecord],
    weights: &[PreferenceWeight],
    implicit: Option<&ImplicitFeedback>,
    selection: &VibeSelection,
) -> Option<f64> {
    let mut bonus = 0.0;
    let mut has_signal = false;

    if let Some(avg) = mean(ratings.iter().map(|r| r.rating as f64)) {
        bonus += avg - 3.0;
        has_signal = true;
    }

    for mood in &selection.moods {
        let under_mood = ratings
            .iter()
            .filter(|r| r.moods.contains(mood))
            .map(|r| r.rating as f64);
        if let Some(avg) = mean(under_mood) {
            bonus += MOOD_RATING_SCALE * (avg - 3.0);
        }
    }

    for theme in &selection.themes {
        let under_theme = ratings
            .iter()
            .filter(|r| r.themes.contains(theme))
            .map(|r| r.rating as f64);
        if let Some(avg) = mean(under_theme) {
            bonus += avg - 3.0;
        }
    }

    let pairs = selection.pairs();
    let learned = weights
        .iter()
        .filter(|w| pairs.contains(&w.key()))
        .map(|w| w.weight);
    if let Some(avg) = mean(learned) {
        bonus += LEARNED_WEIGHT_SCALE * avg;
        has_signal = true;
    }

    if let Some(feedback) = implicit {
        if feedback.plays > 0 {
            bonus += (feedback.completion_rate - 0.5) * 4.0;
        }
        bonus -= (0.5 * feedback.skip_count as f64).min(2.0);
        bonus -= (0.25 * feedback.fast_forward_count as f64).min(1.0);
        has_signal |= feedback.plays > 0 || feedback.skip_count > 0 || feedback.fast_forward_count > 0;
    }

    has_signal.then_some(bonus)
}

/// Clamp to [-6, 6] and map onto [0, 1]
pub fn normalize_bonus(bonus: f64) -> f64 {
    let clamped = bonus.clamp(-PERSONAL_BONUS_LIMIT, PERSONAL_BONUS_LIMIT);
    (clamped + PERSONAL_BONUS_LIMIT) / (2.0 * PERSONAL_BONUS_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{Mood, Theme};
    use store::{MemoryStore, StoreSnapshot};

    fn selection() -> VibeSelection {
        VibeSelection::new(vec![Mood::Happy], vec![Theme::Laugh], 45)
    }

    fn engine_with(snapshot: StoreSnapshot) -> ScoringEngine {
        ScoringEngine::new(Arc::new(MemoryStore::with_snapshot(snapshot)))
    }

    #[test]
    fn test_default_weights() {
        let weights = ScoringWeights::default();
        assert_eq!(weights.popularity, 35.0);
        assert_eq!(weights.keyword, 0.0);
        assert_eq!(weights.with_keyword_fallback(10.0).keyword, 10.0);
    }

    #[test]
    fn test_personal_bonus_without_signal() {
        assert_eq!(personal_bonus(&[], &[], None, &selection()), None);
        let untouched = ImplicitFeedback::default();
        assert_eq!(personal_bonus(&[], &[], Some(&untouched), &selection()), None);
    }

    #[test]
    fn test_personal_bonus_from_ratings() {
        let ratings = vec![
            RatingRecord::new("e", 5, vec![Mood::Happy], vec![Theme::Laugh]).unwrap(),
        ];
        // overall +2, mood 1.5 * 2, theme +2
        let bonus = personal_bonus(&ratings, &[], None, &selection()).unwrap();
        assert!((bonus - 7.0).abs() < 1e-9);
        assert_eq!(normalize_bonus(bonus), 1.0);
    }

    #[test]
    fn test_personal_bonus_ignores_unselected_pairs() {
        let mut weight = PreferenceWeight::new(Mood::Sad, Theme::Cry);
        weight.weight = 1.0;
        assert_eq!(personal_bonus(&[], &[weight], None, &selection()), None);
    }

    #[test]
    fn test_personal_bonus_implicit_penalties() {
        let feedback = ImplicitFeedback {
            skip_count: 10,
            fast_forward_count: 10,
            ..ImplicitFeedback::default()
        };
        let bonus = personal_bonus(&[], &[], Some(&feedback), &selection()).unwrap();
        assert!((bonus + 3.0).abs() < 1e-9);
        assert!((normalize_bonus(bonus) - 0.25).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_score_sums_weighted_factors() {
        let engine = engine_with(StoreSnapshot::default());
        let episode = Episode::new("a", "A", "Show", 45 * 60)
            .with_categories(["Comedy"])
            .with_popularity(90);
        let ctx = ScoringContext::new(selection(), RecentWindow::default());

        let scored = engine.score(&episode, &ctx).await;
        let expected = scored.breakdown.weighted(engine.weights());
        assert!((scored.score - expected).abs() < 1e-9);
        assert_eq!(scored.breakdown.personal, NEUTRAL_PERSONAL_FIT);
        assert_eq!(scored.breakdown.duration, 1.0);
        assert!(scored.match_reason().contains("Perfect length at 45 minutes"));
        assert!(scored.match_reason().contains("🔥 Highly popular podcast"));
    }

    #[tokio::test]
    async fn test_keyword_reasons_only_when_enabled() {
        let episode = Episode::new("a", "Funny stuff", "Show", 45 * 60);
        let ctx = ScoringContext::new(selection(), RecentWindow::default());

        let plain = engine_with(StoreSnapshot::default());
        let scored = plain.score(&episode, &ctx).await;
        assert!(scored.breakdown.keyword > 0.0);
        assert!(!scored.match_reason().contains("mood"));

        let legacy = plain
            .clone()
            .with_weights(ScoringWeights::default().with_keyword_fallback(10.0));
        let scored = legacy.score(&episode, &ctx).await;
        assert!(scored.match_reason().contains("Matches your happy mood (funny)"));
    }
}

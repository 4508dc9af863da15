//! Shuffle selector: alternatives to the current pick without repeats.
//!
//! ## Algorithm
//! 1. On the first shuffle after a search, sample up to `max_options`
//!    unique episodes from tiered prefixes of the ranked list, skipping
//!    the current pick and everything already shown
//! 2. Later shuffles walk the generated batch in order
//! 3. When the batch is used up it is cleared and the next shuffle
//!    regenerates against the updated shown set
//! 4. Nothing eligible left means the session is exhausted

use crate::scoring::ScoredEpisode;
use crate::session::SessionState;
use rand::Rng;
use std::collections::HashSet;
use tracing::{debug, info};

/// Batch size and tier boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct ShuffleConfig {
    pub max_options: usize,
    pub max_attempts: usize,
    /// Ranked prefix sizes of the premium, quality and exploration tiers
    pub premium_size: usize,
    pub quality_size: usize,
    pub exploration_size: usize,
}

impl Default for ShuffleConfig {
    fn default() -> Self {
        Self {
            max_options: 10,
            max_attempts: 50,
            premium_size: 5,
            quality_size: 15,
            exploration_size: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Premium,
    Quality,
    Exploration,
}

/// Probability of drawing from each tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierWeights {
    pub premium: f64,
    pub quality: f64,
    pub exploration: f64,
}

impl TierWeights {
    /// Weights for a listener's experience and current skip streak.
    ///
    /// New listeners (< 3 searches) lean on the premium tier, regulars
    /// (< 10) get a broader mix, experienced listeners the broadest. Two or
    /// more consecutive skips switch exploration off.
    pub fn for_session(session_count: u32, consecutive_skips: u32) -> Self {
        let weights = if session_count < 3 {
            Self {
                premium: 0.70,
                quality: 0.25,
                exploration: 0.05,
            }
        } else if session_count < 10 {
            Self {
                premium: 0.50,
                quality: 0.30,
                exploration: 0.20,
            }
        } else {
            Self {
                premium: 0.40,
                quality: 0.35,
                exploration: 0.25,
            }
        };

        if consecutive_skips >= 2 {
            let total = weights.premium + weights.quality;
            Self {
                premium: weights.premium / total,
                quality: weights.quality / total,
                exploration: 0.0,
            }
        } else {
            weights
        }
    }

    /// Tier for a uniform roll in [0, 1)
    pub fn pick(&self, roll: f64) -> Tier {
        if roll < self.premium {
            Tier::Premium
        } else if roll < self.premium + self.quality || self.exploration <= 0.0 {
            Tier::Quality
        } else {
            Tier::Exploration
        }
    }
}

pub struct ShuffleSelector<R: Rng> {
    rng: R,
    config: ShuffleConfig,
}

impl<R: Rng> ShuffleSelector<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            config: ShuffleConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ShuffleConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ShuffleConfig {
        &self.config
    }

    fn tier_len(&self, tier: Tier, ranked_len: usize) -> usize {
        let size = match tier {
            Tier::Premium => self.config.premium_size,
            Tier::Quality => self.config.quality_size,
            Tier::Exploration => self.config.exploration_size,
        };
        size.min(ranked_len)
    }

    /// Sample a fresh batch of unique, not-yet-shown alternatives.
    ///
    /// Stops at `max_options` picks or `max_attempts` draws. When sampling
    /// finds nothing, the exploration prefix is swept in rank order so a
    /// remaining eligible episode is never missed.
    pub fn generate_options(&mut self, session: &SessionState) -> Vec<ScoredEpisode> {
        let ranked = &session.ranked;
        let weights = TierWeights::for_session(session.session_count, session.consecutive_skips);
        let current_id = session.current.as_ref().map(|c| c.episode.id.as_str());
        let eligible = |candidate: &ScoredEpisode, picked: &HashSet<String>| {
            let id = candidate.episode.id.as_str();
            Some(id) != current_id && !session.has_shown(id) && !picked.contains(id)
        };

        let mut options = Vec::new();
        let mut picked = HashSet::new();
        for _ in 0..self.config.max_attempts {
            if options.len() >= self.config.max_options {
                break;
            }
            let tier = weights.pick(self.rng.random::<f64>());
            let len = self.tier_len(tier, ranked.len());
            if len == 0 {
                break;
            }
            let candidate = &ranked[self.rng.random_range(0..len)];
            if eligible(candidate, &picked) {
                picked.insert(candidate.episode.id.clone());
                options.push(candidate.clone());
            }
        }

        if options.is_empty() {
            let sweep = self.tier_len(Tier::Exploration, ranked.len());
            if let Some(candidate) = ranked[..sweep].iter().find(|&c| eligible(c, &picked)) {
                options.push(candidate.clone());
            }
        }

        debug!(
            "Generated {} shuffle options (premium {:.2}, quality {:.2}, exploration {:.2})",
            options.len(),
            weights.premium,
            weights.quality,
            weights.exploration
        );
        options
    }

    /// Next alternative for the session, or `None` once exhausted.
    ///
    /// The returned episode becomes the session's current pick and is
    /// marked shown.
    pub fn next(&mut self, session: &mut SessionState) -> Option<ScoredEpisode> {
        if session.shuffle.options.is_empty() {
            session.shuffle.options = self.generate_options(session);
            session.shuffle.cursor = 0;
        }
        if session.shuffle.options.is_empty() {
            info!("Shuffle exhausted after {} episodes", session.shuffle.shown.len());
            return None;
        }

        let pick = session.shuffle.options[session.shuffle.cursor].clone();
        session.shuffle.cursor += 1;
        if session.shuffle.cursor >= session.shuffle.options.len() {
            session.shuffle.options.clear();
            session.shuffle.cursor = 0;
        }

        session.shuffle.shown.insert(pick.episode.id.clone());
        session.current = Some(pick.clone());
        Some(pick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ScoreBreakdown;
    use catalog::Episode;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn ranked(n: usize) -> Vec<ScoredEpisode> {
        (0..n)
            .map(|i| ScoredEpisode {
                episode: Episode::new(format!("e{i:02}"), "T", "Show", 1800),
                score: 100.0 - i as f64,
                breakdown: ScoreBreakdown::default(),
                match_reasons: Vec::new(),
            })
            .collect()
    }

    fn selector(seed: u64) -> ShuffleSelector<StdRng> {
        ShuffleSelector::new(StdRng::seed_from_u64(seed))
    }

    #[test]
    fn test_tier_weights_by_experience() {
        assert_eq!(TierWeights::for_session(0, 0).premium, 0.70);
        assert_eq!(TierWeights::for_session(5, 0).exploration, 0.20);
        assert_eq!(TierWeights::for_session(12, 1).quality, 0.35);
    }

    #[test]
    fn test_skips_disable_exploration() {
        let weights = TierWeights::for_session(12, 2);
        assert_eq!(weights.exploration, 0.0);
        assert!((weights.premium + weights.quality - 1.0).abs() < 1e-9);
        assert_eq!(weights.pick(0.999), Tier::Quality);
    }

    #[test]
    fn test_batch_is_unique_and_excludes_shown() {
        let mut session = SessionState::new();
        session.begin_search(ranked(40));
        session.shuffle.shown.insert("e01".to_string());

        let options = selector(7).generate_options(&session);
        assert!(!options.is_empty());
        assert!(options.len() <= 10);

        let ids: HashSet<_> = options.iter().map(|o| o.episode.id.clone()).collect();
        assert_eq!(ids.len(), options.len());
        assert!(!ids.contains("e00"));
        assert!(!ids.contains("e01"));
    }

    #[test]
    fn test_next_never_repeats_until_exhausted() {
        let mut session = SessionState::new();
        session.begin_search(ranked(12));
        let mut selector = selector(42);

        let mut seen = HashSet::from(["e00".to_string()]);
        while let Some(pick) = selector.next(&mut session) {
            assert!(seen.insert(pick.episode.id.clone()), "repeated {}", pick.episode.id);
            assert_eq!(session.current.as_ref(), Some(&pick));
        }
        assert_eq!(seen.len(), 12);
        assert!(selector.next(&mut session).is_none());
    }

    #[test]
    fn test_small_pool_exhausts() {
        let mut session = SessionState::new();
        session.begin_search(ranked(1));
        assert!(selector(1).next(&mut session).is_none());

        let mut empty = SessionState::new();
        empty.begin_search(Vec::new());
        assert!(selector(1).next(&mut empty).is_none());
    }
}

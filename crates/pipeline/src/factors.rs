//! Content factors of the scoring engine.
//!
//! Every factor is a pure function of the episode and the request context,
//! returns a value in a fixed range, and may add qualitative reasons that
//! end up in the episode's match explanation.

use crate::session::RecentWindow;
use catalog::{CategorySet, Episode, Mood, Theme, mood_keywords, theme_keywords};
use chrono::{DateTime, Utc};

/// One factor's value plus the reasons it contributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Factor {
    pub value: f64,
    pub reasons: Vec<String>,
}

impl Factor {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            reasons: Vec::new(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reasons.push(reason.into());
        self
    }
}

fn rounded_minutes(episode: &Episode) -> i64 {
    episode.duration_minutes().round() as i64
}

// =============================================================================
// Category Relevance
// =============================================================================

const CATEGORY_BASE: f64 = 0.4;
const PRIMARY_MATCH_BONUS: f64 = 0.15;
const SECONDARY_MATCH_BONUS: f64 = 0.05;
const MAX_COUNTED_MATCHES: usize = 2;

/// Trust in category-filtered search, in [0, 1].
///
/// ## Algorithm
/// 1. Base 0.4 for being in a category-constrained result set
/// 2. Description over 100 chars +0.1, named publisher +0.05, cover art +0.05
/// 3. +0.15 per primary category match, +0.05 per secondary-only match,
///    each counted at most twice
pub fn category_relevance(episode: &Episode, categories: &CategorySet) -> Factor {
    let mut value = CATEGORY_BASE;
    if episode.description.chars().count() > 100 {
        value += 0.1;
    }
    if !episode.publisher.trim().is_empty() {
        value += 0.05;
    }
    if episode.cover_art_url.is_some() {
        value += 0.05;
    }

    let primary: Vec<&String> = episode
        .categories
        .iter()
        .filter(|c| categories.is_primary(c))
        .collect();
    let secondary: Vec<&String> = episode
        .categories
        .iter()
        .filter(|c| !categories.is_primary(c) && categories.is_secondary(c))
        .collect();

    value += PRIMARY_MATCH_BONUS * primary.len().min(MAX_COUNTED_MATCHES) as f64;
    value += SECONDARY_MATCH_BONUS * secondary.len().min(MAX_COUNTED_MATCHES) as f64;

    let factor = Factor::new(value.clamp(0.0, 1.0));
    match (primary.first(), secondary.first()) {
        (Some(category), _) => factor.with_reason(format!("Right in {category} for your vibe")),
        (None, Some(category)) => factor.with_reason(format!("Related to {category}")),
        (None, None) => factor,
    }
}

// =============================================================================
// Duration
// =============================================================================

/// Tiered fit of the episode length to the target, in [0.1, 1].
///
/// Long-form targets (over an hour) keep 0.3 for anything beyond the 15
/// minute tier in either direction so the factor never rises with distance.
pub fn duration_fit(episode: &Episode, target_minutes: u32) -> Factor {
    let diff = (episode.duration_minutes() - target_minutes as f64).abs();
    let minutes = rounded_minutes(episode);

    if diff <= 2.0 {
        Factor::new(1.0).with_reason(format!("Perfect length at {minutes} minutes"))
    } else if diff <= 5.0 {
        Factor::new(0.8).with_reason(format!("Close to your time at {minutes} minutes"))
    } else if diff <= 10.0 {
        Factor::new(0.6).with_reason(format!("Near your time at {minutes} minutes"))
    } else if diff <= 15.0 {
        Factor::new(0.4)
    } else if target_minutes > 60 {
        Factor::new(0.3).with_reason(format!("Long-form listen at {minutes} minutes"))
    } else {
        Factor::new(0.1)
    }
}

// =============================================================================
// Popularity
// =============================================================================

/// Follower count that maps to the full follower share
const FOLLOWER_SCALE: f64 = 1_000_000.0;

/// Blend of provider popularity (60%), log-scaled followers (30%) and
/// inverse chart position (10%), clamped to [0, 1]. Missing signals add 0.
pub fn popularity(episode: &Episode) -> Factor {
    let provider = episode.popularity.map(|p| p as f64 / 100.0).unwrap_or(0.0);
    let followers = episode
        .follower_count
        .map(|f| (1.0 + f as f64).ln() / (1.0 + FOLLOWER_SCALE).ln())
        .unwrap_or(0.0);
    let chart = episode
        .chart_position
        .filter(|&p| (1..=100).contains(&p))
        .map(|p| (101.0 - p as f64) / 100.0)
        .unwrap_or(0.0);

    let value = (0.6 * provider + 0.3 * followers + 0.1 * chart).clamp(0.0, 1.0);
    let factor = Factor::new(value);
    if value >= 0.5 {
        factor.with_reason("🔥 Highly popular podcast")
    } else if value >= 0.3 {
        factor.with_reason("Popular with listeners")
    } else {
        factor
    }
}

// =============================================================================
// Top Quality
// =============================================================================

pub fn top_quality(episode: &Episode) -> Factor {
    if episode.is_top_quality {
        Factor::new(1.0).with_reason("⭐ From an official catalog")
    } else {
        Factor::new(0.0)
    }
}

// =============================================================================
// Quality Signals
// =============================================================================

const PROFESSIONAL_WORDS: &[&str] = &["interview", "discussion", "analysis", "review"];
const SPAM_PHRASES: &[&str] = &[
    "subscribe now",
    "click here",
    "free money",
    "limited time",
    "buy now",
];

/// Mixed case and a reasonable length
fn has_professional_title(title: &str) -> bool {
    let length = title.chars().count();
    let has_upper = title.chars().any(char::is_uppercase);
    let has_lower = title.chars().any(char::is_lowercase);
    (10..=100).contains(&length) && has_upper && has_lower
}

/// Heuristic production quality, in [0, 1].
///
/// ## Algorithm
/// 1. Cover art +0.15
/// 2. Metadata completeness: title, description, publisher, art +0.05 each
/// 3. Recency: within 7 days +0.2, 30 days +0.12, 90 days +0.05
/// 4. Professional title shape +0.15
/// 5. Professional words in title or description +0.15
/// 6. Description over 200 chars +0.15
/// 7. Each spam phrase -0.3
pub fn quality_signals(episode: &Episode, now: DateTime<Utc>) -> Factor {
    let mut value = 0.0;
    let mut reasons = Vec::new();

    if episode.cover_art_url.is_some() {
        value += 0.15;
    }

    let complete = [
        !episode.title.trim().is_empty(),
        !episode.description.trim().is_empty(),
        !episode.publisher.trim().is_empty(),
        episode.cover_art_url.is_some(),
    ];
    value += 0.05 * complete.iter().filter(|&&present| present).count() as f64;

    if let Some(published_at) = episode.published_at {
        let age_days = (now - published_at).num_days();
        if (0..=7).contains(&age_days) {
            value += 0.2;
            reasons.push("Recently published".to_string());
        } else if (0..=30).contains(&age_days) {
            value += 0.12;
        } else if (0..=90).contains(&age_days) {
            value += 0.05;
        }
    }

    if has_professional_title(&episode.title) {
        value += 0.15;
    }

    let text = format!("{} {}", episode.title, episode.description).to_lowercase();
    if PROFESSIONAL_WORDS.iter().any(|word| text.contains(word)) {
        value += 0.15;
    }

    if episode.description.chars().count() > 200 {
        value += 0.15;
    }

    let spam_hits = SPAM_PHRASES.iter().filter(|p| text.contains(*p)).count();
    value -= 0.3 * spam_hits as f64;

    let value = value.clamp(0.0, 1.0);
    if value >= 0.7 {
        reasons.push("High production quality".to_string());
    }
    Factor { value, reasons }
}

// =============================================================================
// Diversity
// =============================================================================

/// -0.5 for a recently surfaced episode, +0.2 for a podcast not in the
/// recent window, else 0.
pub fn diversity(episode: &Episode, recent: &RecentWindow) -> Factor {
    if recent.contains_episode(&episode.id) {
        Factor::new(-0.5)
    } else if !recent.contains_podcast(&episode.podcast_name) {
        let factor = Factor::new(0.2);
        if recent.is_empty() {
            factor
        } else {
            factor.with_reason("Something new for you")
        }
    } else {
        Factor::new(0.0)
    }
}

// =============================================================================
// Keyword Fallback
// =============================================================================

/// Substring matches against the static mood and theme keyword tables.
///
/// Mood keywords count 2 points each, theme keywords 3; the sum is scaled
/// so that 10 points saturate at 1.0.
pub fn keyword_match(episode: &Episode, moods: &[Mood], themes: &[Theme]) -> Factor {
    let text = format!(
        "{} {} {}",
        episode.title, episode.description, episode.podcast_name
    )
    .to_lowercase();
    let mut points = 0.0;
    let mut reasons = Vec::new();

    for &mood in moods {
        let matched: Vec<&str> = mood_keywords(mood)
            .iter()
            .copied()
            .filter(|keyword| text.contains(keyword))
            .collect();
        if !matched.is_empty() {
            points += 2.0 * matched.len() as f64;
            reasons.push(format!(
                "Matches your {} mood ({})",
                mood.label(),
                matched.join(", ")
            ));
        }
    }

    for &theme in themes {
        let matched: Vec<&str> = theme_keywords(theme)
            .iter()
            .copied()
            .filter(|keyword| text.contains(keyword))
            .collect();
        if !matched.is_empty() {
            points += 3.0 * matched.len() as f64;
            reasons.push(format!("Perfect to {} ({})", theme.label(), matched.join(", ")));
        }
    }

    Factor {
        value: (points / 10.0).min(1.0),
        reasons,
    }
}

//! Core domain types for podcast recommendation.
//!
//! This module defines the records every other crate passes around:
//! - `Mood` and `Theme`: the two closed vocabularies a user picks from
//! - `Episode`: the provider-agnostic episode (or show) record
//! - `VibeSelection`: one user request (moods, themes, target length)
//! - `RatingRecord`, `PreferenceWeight`, `ImplicitFeedback`: feedback data
//!   owned by the preference store

use crate::error::{CatalogError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Type Aliases
// =============================================================================

/// Provider-prefixed episode identifier (e.g. "ln:abc123", "sp:4rOoJ6Egrf8K2IrywzwOMk")
pub type EpisodeId = String;

/// Length assumed for show records that carry no per-episode duration
pub const SHOW_DEFAULT_MINUTES: f64 = 30.0;

// =============================================================================
// Mood & Theme
// =============================================================================

/// How the listener feels right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Happy,
    Sad,
    Anxious,
    Bored,
    Curious,
    Tired,
    Focused,
    Stressed,
    SurpriseMe,
    DontKnow,
}

impl Mood {
    /// All ten moods in display order
    pub fn all() -> &'static [Mood] {
        &[
            Mood::Happy,
            Mood::Sad,
            Mood::Anxious,
            Mood::Bored,
            Mood::Curious,
            Mood::Tired,
            Mood::Focused,
            Mood::Stressed,
            Mood::SurpriseMe,
            Mood::DontKnow,
        ]
    }

    /// Stable snake_case name, identical to the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Anxious => "anxious",
            Mood::Bored => "bored",
            Mood::Curious => "curious",
            Mood::Tired => "tired",
            Mood::Focused => "focused",
            Mood::Stressed => "stressed",
            Mood::SurpriseMe => "surprise_me",
            Mood::DontKnow => "dont_know",
        }
    }

    /// Human-readable label used in match reasons
    pub fn label(&self) -> &'static str {
        match self {
            Mood::SurpriseMe => "surprise me",
            Mood::DontKnow => "don't know",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = canonical_name(s);
        Mood::all()
            .iter()
            .copied()
            .find(|mood| mood.as_str() == wanted)
            .ok_or_else(|| CatalogError::UnknownMood(s.to_string()))
    }
}

/// The experience the listener is after
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Laugh,
    Cry,
    Learn,
    BeInspired,
    Escape,
    Chill,
    BeDistracted,
    BeShocked,
    Reflect,
    StayUpdated,
    FeelSeen,
    KillTime,
}

impl Theme {
    /// All twelve themes in display order
    pub fn all() -> &'static [Theme] {
        &[
            Theme::Laugh,
            Theme::Cry,
            Theme::Learn,
            Theme::BeInspired,
            Theme::Escape,
            Theme::Chill,
            Theme::BeDistracted,
            Theme::BeShocked,
            Theme::Reflect,
            Theme::StayUpdated,
            Theme::FeelSeen,
            Theme::KillTime,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Laugh => "laugh",
            Theme::Cry => "cry",
            Theme::Learn => "learn",
            Theme::BeInspired => "be_inspired",
            Theme::Escape => "escape",
            Theme::Chill => "chill",
            Theme::BeDistracted => "be_distracted",
            Theme::BeShocked => "be_shocked",
            Theme::Reflect => "reflect",
            Theme::StayUpdated => "stay_updated",
            Theme::FeelSeen => "feel_seen",
            Theme::KillTime => "kill_time",
        }
    }

    /// Human-readable label ("be inspired", "kill time", ...)
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = canonical_name(s);
        Theme::all()
            .iter()
            .copied()
            .find(|theme| theme.as_str() == wanted)
            .ok_or_else(|| CatalogError::UnknownTheme(s.to_string()))
    }
}

/// Accept "Be-Inspired", "be inspired" and "be_inspired" alike
fn canonical_name(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .replace(['-', ' '], "_")
        .replace('\'', "")
}

// =============================================================================
// Episode
// =============================================================================

/// A normalized, provider-agnostic podcast episode.
///
/// `audio_length_sec == 0` marks a show record (no per-episode duration);
/// `duration_minutes` substitutes `SHOW_DEFAULT_MINUTES` for those.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: EpisodeId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub podcast_name: String,
    #[serde(default)]
    pub publisher: String,
    pub audio_length_sec: u32,
    #[serde(default)]
    pub cover_art_url: Option<String>,
    #[serde(default)]
    pub external_url: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    /// Sourced from a curated/official provider feed
    #[serde(default)]
    pub is_top_quality: bool,

    // Provider-dependent popularity signals
    /// 0-100
    #[serde(default)]
    pub popularity: Option<u8>,
    #[serde(default)]
    pub follower_count: Option<u64>,
    /// 1-100, lower is better
    #[serde(default)]
    pub chart_position: Option<u16>,
    #[serde(default)]
    pub episode_count: Option<u32>,

    /// Named external links ("spotify", "apple", ...)
    #[serde(default)]
    pub platform_links: BTreeMap<String, String>,
    /// Provider genres plus every category term this episode was found under
    #[serde(default)]
    pub categories: Vec<String>,
}

impl Episode {
    /// Create a minimal episode; remaining fields default to empty/None.
    pub fn new(
        id: impl Into<EpisodeId>,
        title: impl Into<String>,
        podcast_name: impl Into<String>,
        audio_length_sec: u32,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            podcast_name: podcast_name.into(),
            publisher: String::new(),
            audio_length_sec,
            cover_art_url: None,
            external_url: None,
            published_at: None,
            is_top_quality: false,
            popularity: None,
            follower_count: None,
            chart_position: None,
            episode_count: None,
            platform_links: BTreeMap::new(),
            categories: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = publisher.into();
        self
    }

    pub fn with_cover_art(mut self, url: impl Into<String>) -> Self {
        self.cover_art_url = Some(url.into());
        self
    }

    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }

    pub fn with_popularity(mut self, popularity: u8) -> Self {
        self.popularity = Some(popularity.min(100));
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_top_quality(mut self, is_top_quality: bool) -> Self {
        self.is_top_quality = is_top_quality;
        self
    }

    /// Whether this record is a whole show rather than a single episode
    pub fn is_show_record(&self) -> bool {
        self.audio_length_sec == 0
    }

    /// Episode length in minutes, or the show estimate for show records
    pub fn duration_minutes(&self) -> f64 {
        if self.is_show_record() {
            SHOW_DEFAULT_MINUTES
        } else {
            self.audio_length_sec as f64 / 60.0
        }
    }

    /// Add a category tag unless an equal (case-insensitive) one is present
    pub fn add_category(&mut self, category: &str) {
        let exists = self
            .categories
            .iter()
            .any(|c| c.eq_ignore_ascii_case(category));
        if !exists {
            self.categories.push(category.to_string());
        }
    }

    /// Case-insensitive check against the episode's category tags
    pub fn has_category(&self, category: &str) -> bool {
        self.categories
            .iter()
            .any(|c| c.eq_ignore_ascii_case(category))
    }
}

/// Lowercase, strip punctuation, collapse whitespace.
///
/// Used as the secondary identity key when de-duplicating across providers.
pub fn normalized_title(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

// =============================================================================
// User Selection
// =============================================================================

/// One recommendation request: 0+ moods, 0+ themes and a target length.
///
/// The UI caps moods at two; the core accepts any count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VibeSelection {
    pub moods: Vec<Mood>,
    pub themes: Vec<Theme>,
    pub target_minutes: u32,
}

impl VibeSelection {
    pub fn new(moods: Vec<Mood>, themes: Vec<Theme>, target_minutes: u32) -> Self {
        Self {
            moods,
            themes,
            target_minutes,
        }
    }

    /// Every (mood, theme) pair of the selection, moods outermost
    pub fn pairs(&self) -> Vec<(Mood, Theme)> {
        self.moods
            .iter()
            .flat_map(|&mood| self.themes.iter().map(move |&theme| (mood, theme)))
            .collect()
    }
}

// =============================================================================
// Feedback Types
// =============================================================================

/// One explicit star rating. Immutable once created; corrections are new records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    pub episode_id: EpisodeId,
    /// 1-5 stars
    pub rating: u8,
    pub moods: Vec<Mood>,
    pub themes: Vec<Theme>,
    pub timestamp_ms: i64,
    #[serde(default)]
    pub comment: Option<String>,
}

impl RatingRecord {
    /// Create a rating stamped with the current time.
    ///
    /// # Errors
    /// `CatalogError::InvalidRating` unless `rating` is within 1..=5
    pub fn new(
        episode_id: impl Into<EpisodeId>,
        rating: u8,
        moods: Vec<Mood>,
        themes: Vec<Theme>,
    ) -> Result<Self> {
        let record = Self {
            episode_id: episode_id.into(),
            rating,
            moods,
            themes,
            timestamp_ms: Utc::now().timestamp_millis(),
            comment: None,
        };
        record.validate()?;
        Ok(record)
    }

    /// Re-check a record that was built field by field or deserialized
    pub fn validate(&self) -> Result<()> {
        if !(1..=5).contains(&self.rating) {
            return Err(CatalogError::InvalidRating { value: self.rating });
        }
        Ok(())
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_timestamp_ms(mut self, timestamp_ms: i64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
    }

    /// Every (mood, theme) pair this rating touches
    pub fn pairs(&self) -> Vec<(Mood, Theme)> {
        self.moods
            .iter()
            .flat_map(|&mood| self.themes.iter().map(move |&theme| (mood, theme)))
            .collect()
    }
}

/// Learned affinity for a (mood, theme) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceWeight {
    pub mood: Mood,
    pub theme: Theme,
    /// Always within [-1, 1]
    pub weight: f64,
    pub episode_count: u32,
    pub avg_rating: f64,
    pub last_updated: DateTime<Utc>,
}

impl PreferenceWeight {
    /// A fresh, neutral row for a pair nobody has rated yet
    pub fn new(mood: Mood, theme: Theme) -> Self {
        Self {
            mood,
            theme,
            weight: 0.0,
            episode_count: 0,
            avg_rating: 0.0,
            last_updated: Utc::now(),
        }
    }

    pub fn key(&self) -> (Mood, Theme) {
        (self.mood, self.theme)
    }
}

/// Engagement signals gathered from playback, per episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImplicitFeedback {
    pub skip_count: u32,
    /// Running mean of listened fraction, 0.0-1.0
    pub completion_rate: f64,
    pub fast_forward_count: u32,
    pub total_play_time_sec: u64,
    /// Number of playback events folded into `completion_rate`
    #[serde(default)]
    pub plays: u32,
    pub last_updated: DateTime<Utc>,
}

impl Default for ImplicitFeedback {
    fn default() -> Self {
        Self {
            skip_count: 0,
            completion_rate: 0.0,
            fast_forward_count: 0,
            total_play_time_sec: 0,
            plays: 0,
            last_updated: Utc::now(),
        }
    }
}

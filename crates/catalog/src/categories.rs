//! Category mapper: moods and themes to podcast-catalog taxonomy.
//!
//! Pure lookup tables. The aggregator issues category queries derived from
//! these instead of free-text keyword searches, and the scoring engine reads
//! the same tiers back to grade category relevance.
//!
//! ## Algorithm
//! 1. For every selected mood, then every selected theme, append its primary
//!    and secondary categories to the matching tier (first-seen order)
//! 2. Expand every primary and secondary category into its sub-genres using
//!    the taxonomy table
//! 3. Search terms are primary, then secondary, then sub-genres, de-duplicated

use crate::types::{Mood, Theme};
use serde::{Deserialize, Serialize};

/// Primary and secondary catalog categories for one mood or theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryMapping {
    pub primary: &'static [&'static str],
    pub secondary: &'static [&'static str],
}

/// The three tiers derived from one user selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySet {
    pub primary: Vec<String>,
    pub secondary: Vec<String>,
    pub subcategories: Vec<String>,
}

impl CategorySet {
    pub fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.secondary.is_empty() && self.subcategories.is_empty()
    }

    /// Whether `category` is in the primary tier (case-insensitive)
    pub fn is_primary(&self, category: &str) -> bool {
        self.primary.iter().any(|c| c.eq_ignore_ascii_case(category))
    }

    /// Whether `category` is in the secondary tier (case-insensitive)
    pub fn is_secondary(&self, category: &str) -> bool {
        self.secondary
            .iter()
            .any(|c| c.eq_ignore_ascii_case(category))
    }
}

// =============================================================================
// Taxonomy
// =============================================================================

/// Top-level catalog categories with their sub-genres
pub const TAXONOMY: &[(&str, &[&str])] = &[
    (
        "Arts",
        &["Books", "Design", "Fashion & Beauty", "Food", "Performing Arts", "Visual Arts"],
    ),
    (
        "Business",
        &["Careers", "Entrepreneurship", "Investing", "Management", "Marketing", "Non-Profit"],
    ),
    (
        "Comedy",
        &["Comedy Interviews", "Improv", "Stand-Up", "Entertainment", "Talk Shows", "Radio Comedy"],
    ),
    (
        "Education",
        &["Courses", "How To", "Language Learning", "Self-Improvement"],
    ),
    ("Fiction", &["Comedy Fiction", "Drama", "Science Fiction"]),
    ("Government", &[]),
    ("History", &[]),
    (
        "Health & Fitness",
        &["Alternative Health", "Fitness", "Medicine", "Mental Health", "Nutrition", "Sexuality"],
    ),
    (
        "Leisure",
        &[
            "Animation & Manga",
            "Automotive",
            "Aviation",
            "Crafts",
            "Games",
            "Hobbies",
            "Home & Garden",
            "Video Games",
        ],
    ),
    (
        "Music",
        &["Music Commentary", "Music History", "Music Interviews"],
    ),
    (
        "News",
        &[
            "Business News",
            "Daily News",
            "Entertainment News",
            "News Commentary",
            "Politics",
            "Sports News",
            "Tech News",
        ],
    ),
    (
        "Religion & Spirituality",
        &["Buddhism", "Christianity", "Hinduism", "Islam", "Judaism", "Religion", "Spirituality"],
    ),
    (
        "Science",
        &[
            "Astronomy",
            "Chemistry",
            "Earth Sciences",
            "Life Sciences",
            "Mathematics",
            "Natural Sciences",
            "Nature",
            "Physics",
            "Social Sciences",
        ],
    ),
    (
        "Society & Culture",
        &["Documentary", "Personal Journals", "Philosophy", "Places & Travel", "Relationships"],
    ),
    (
        "Sports",
        &[
            "Baseball",
            "Basketball",
            "Cricket",
            "Fantasy Sports",
            "Football",
            "Golf",
            "Hockey",
            "Rugby",
            "Soccer",
            "Swimming",
            "Tennis",
            "Volleyball",
            "Wilderness",
            "Wrestling",
        ],
    ),
    ("Technology", &[]),
    ("True Crime", &[]),
    (
        "TV & Film",
        &["After Shows", "Film History", "Film Interviews", "Film Reviews", "TV Reviews"],
    ),
];

/// Sub-genres of a top-level category; unknown names (including sub-genres
/// used directly as secondary categories) have none.
pub fn subcategories_of(category: &str) -> &'static [&'static str] {
    TAXONOMY
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, subs)| *subs)
        .unwrap_or(&[])
}

// =============================================================================
// Mood / Theme Tables
// =============================================================================

pub fn mood_categories(mood: Mood) -> CategoryMapping {
    let (primary, secondary): (&'static [&'static str], &'static [&'static str]) = match mood {
        Mood::Happy => (
            &["Comedy", "Music", "Health & Fitness"],
            &["Arts", "Leisure", "Society & Culture"],
        ),
        Mood::Sad => (
            &["Health & Fitness", "Society & Culture", "Religion & Spirituality"],
            &["Music", "Arts", "Education"],
        ),
        Mood::Anxious => (
            &["Health & Fitness", "Religion & Spirituality", "Education"],
            &["Society & Culture", "Music"],
        ),
        Mood::Bored => (
            &["Comedy", "TV & Film", "Leisure"],
            &["True Crime", "News", "Sports"],
        ),
        Mood::Curious => (
            &["Science", "Education", "History"],
            &["Technology", "News", "Society & Culture"],
        ),
        Mood::Tired => (
            &["Health & Fitness", "Religion & Spirituality", "Music"],
            &["Society & Culture", "Fiction"],
        ),
        Mood::Focused => (
            &["Education", "Business", "Science"],
            &["Technology", "Health & Fitness", "News"],
        ),
        Mood::Stressed => (
            &["Health & Fitness", "Religion & Spirituality", "Music"],
            &["Comedy", "Society & Culture"],
        ),
        Mood::SurpriseMe => (
            &["Comedy", "True Crime", "Science"],
            &["Fiction", "TV & Film", "Leisure"],
        ),
        Mood::DontKnow => (
            &["Comedy", "News", "Society & Culture"],
            &["Education", "Health & Fitness", "Arts"],
        ),
    };
    CategoryMapping { primary, secondary }
}

pub fn theme_categories(theme: Theme) -> CategoryMapping {
    let (primary, secondary): (&'static [&'static str], &'static [&'static str]) = match theme {
        Theme::Laugh => (&["Comedy"], &["TV & Film", "Leisure"]),
        Theme::Cry => (
            &["Fiction", "Society & Culture"],
            &["Health & Fitness", "True Crime"],
        ),
        Theme::Learn => (
            &["Education", "Science", "History"],
            &["Technology", "Business", "News"],
        ),
        Theme::BeInspired => (
            &["Education", "Business", "Health & Fitness"],
            &["Religion & Spirituality", "Society & Culture"],
        ),
        Theme::Escape => (
            &["Fiction", "True Crime", "TV & Film"],
            &["Science Fiction", "Arts", "Leisure"],
        ),
        Theme::Chill => (
            &["Health & Fitness", "Religion & Spirituality", "Music"],
            &["Society & Culture", "Nature"],
        ),
        Theme::BeDistracted => (
            &["Comedy", "Leisure", "TV & Film"],
            &["Music", "Sports", "Arts"],
        ),
        Theme::BeShocked => (
            &["True Crime", "News"],
            &["Society & Culture", "Government"],
        ),
        Theme::Reflect => (
            &["Religion & Spirituality", "Society & Culture", "Health & Fitness"],
            &["Philosophy", "Education", "Arts"],
        ),
        Theme::StayUpdated => (
            &["News", "Technology", "Business"],
            &["Science", "Government", "Sports"],
        ),
        Theme::FeelSeen => (
            &["Society & Culture", "Health & Fitness", "Religion & Spirituality"],
            &["Personal Journals", "Relationships", "Arts"],
        ),
        Theme::KillTime => (
            &["Comedy", "Leisure", "TV & Film"],
            &["Sports", "Music", "True Crime"],
        ),
    };
    CategoryMapping { primary, secondary }
}

/// Substring keywords per mood, used only by the keyword fallback factor
pub fn mood_keywords(mood: Mood) -> &'static [&'static str] {
    match mood {
        Mood::Happy => &["uplifting", "joy", "funny", "positive", "feel good"],
        Mood::Sad => &["empathy", "healing", "grief", "storytelling", "emotions"],
        Mood::Anxious => &["calm", "soothing", "mindfulness", "meditation", "relax"],
        Mood::Bored => &["banter", "entertaining", "weird", "viral"],
        Mood::Curious => &["learning", "explainer", "interview", "science", "ideas"],
        Mood::Tired => &["soft voice", "chill", "low energy", "slow paced"],
        Mood::Focused => &["productivity", "deep dive", "motivation", "workflow"],
        Mood::Stressed => &["relaxing", "coping", "unwind", "decompress"],
        Mood::SurpriseMe | Mood::DontKnow => &[],
    }
}

/// Substring keywords per theme, used only by the keyword fallback factor
pub fn theme_keywords(theme: Theme) -> &'static [&'static str] {
    match theme {
        Theme::Laugh => &["comedy", "banter", "funny", "sketch"],
        Theme::Cry => &["moving", "emotional", "true story", "family"],
        Theme::Learn => &["education", "explainer", "deep dive", "how to"],
        Theme::BeInspired => &["motivation", "success", "resilience"],
        Theme::Escape => &["thriller", "fiction", "mystery", "narrative"],
        Theme::Chill => &["calm", "ambient", "meditation", "soft spoken"],
        Theme::BeDistracted => &["random", "light", "banter", "entertaining"],
        Theme::BeShocked => &["true crime", "scandal", "unbelievable", "twist"],
        Theme::Reflect => &["introspective", "life", "meaning", "mental health"],
        Theme::StayUpdated => &["news", "current events", "culture", "politics"],
        Theme::FeelSeen => &["identity", "relationships", "personal stories"],
        Theme::KillTime => &["facts", "trivia", "low effort", "background"],
    }
}

// =============================================================================
// Selection Mapping
// =============================================================================

fn push_unique(tier: &mut Vec<String>, category: &str) {
    if !tier.iter().any(|c| c == category) {
        tier.push(category.to_string());
    }
}

/// Derive the primary/secondary/sub-genre tiers for a selection.
///
/// Total over every input: an empty selection yields an empty set. A
/// category may appear in both primary and secondary when different picks
/// disagree on its tier.
pub fn categories_for(moods: &[Mood], themes: &[Theme]) -> CategorySet {
    let mut set = CategorySet::default();

    let mappings = moods
        .iter()
        .map(|&mood| mood_categories(mood))
        .chain(themes.iter().map(|&theme| theme_categories(theme)));

    for mapping in mappings {
        for category in mapping.primary {
            push_unique(&mut set.primary, category);
        }
        for category in mapping.secondary {
            push_unique(&mut set.secondary, category);
        }
    }

    let mut subcategories = Vec::new();
    for category in set.primary.iter().chain(set.secondary.iter()) {
        for sub in subcategories_of(category) {
            push_unique(&mut subcategories, sub);
        }
    }
    set.subcategories = subcategories;

    set
}

/// Flat, de-duplicated search terms: primary, then secondary, then sub-genres
pub fn search_terms_for(moods: &[Mood], themes: &[Theme]) -> Vec<String> {
    let set = categories_for(moods, themes);
    let mut terms = Vec::with_capacity(
        set.primary.len() + set.secondary.len() + set.subcategories.len(),
    );
    for term in set
        .primary
        .into_iter()
        .chain(set.secondary)
        .chain(set.subcategories)
    {
        if !terms.contains(&term) {
            terms.push(term);
        }
    }
    terms
}

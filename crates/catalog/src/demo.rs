//! Offline demo catalog.
//!
//! Ten hand-picked episodes that let the whole recommendation flow run with
//! no provider credentials. Publication dates are relative to the moment the
//! catalog is built so the recency signals behave like live data.

use crate::normalize::{DEMO_PREFIX, platform_links};
use crate::types::Episode;
use chrono::{DateTime, Duration, Utc};

struct DemoEntry {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    audio_length_sec: u32,
    podcast_name: &'static str,
    publisher: &'static str,
    cover_art: &'static str,
    days_ago: i64,
    popularity: u8,
    categories: &'static [&'static str],
}

const DEMO_ENTRIES: &[DemoEntry] = &[
    DemoEntry {
        id: "1",
        title: "The Science of Happiness: What Makes Us Truly Happy",
        description: "Explore the latest research on happiness and well-being. Learn practical strategies to boost your mood and live a more fulfilling life. This episode covers positive psychology, gratitude practices, and the neuroscience of joy.",
        audio_length_sec: 2700,
        podcast_name: "The Happiness Lab",
        publisher: "Wellbeing Media",
        cover_art: "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?w=300&h=300&fit=crop",
        days_ago: 7,
        popularity: 85,
        categories: &["Health & Fitness", "Science", "Mental Health"],
    },
    DemoEntry {
        id: "2",
        title: "True Crime: The Mystery of the Missing Heiress",
        description: "A gripping investigation into the disappearance of a wealthy socialite. Follow the clues, examine the evidence, and dive deep into this unsolved mystery that has baffled investigators for decades. Unbelievable twists and shocking revelations.",
        audio_length_sec: 3600,
        podcast_name: "Mystery Files",
        publisher: "Mystery Network",
        cover_art: "https://images.unsplash.com/photo-1578662996442-48f60103fc96?w=300&h=300&fit=crop",
        days_ago: 3,
        popularity: 78,
        categories: &["True Crime", "Society & Culture"],
    },
    DemoEntry {
        id: "3",
        title: "Comedy Gold: Stand-Up Stories from the Road",
        description: "Hilarious tales from touring comedians. Laugh along as they share their funniest moments, biggest failures, and the weird encounters that happen on the comedy circuit. Pure comedy and banter!",
        audio_length_sec: 1800,
        podcast_name: "Laugh Track",
        publisher: "Laugh Track Media",
        cover_art: "https://images.unsplash.com/photo-1541532713592-79a0317b6b77?w=300&h=300&fit=crop",
        days_ago: 1,
        popularity: 80,
        categories: &["Comedy", "Stand-Up"],
    },
    DemoEntry {
        id: "4",
        title: "Mindful Meditation: Finding Peace in Chaos",
        description: "A calming guide to meditation and mindfulness. Learn breathing techniques, body scans, and mental exercises to reduce anxiety and find inner peace. Perfect for stress relief and relaxation.",
        audio_length_sec: 1500,
        podcast_name: "Zen Moments",
        publisher: "Calm Collective",
        cover_art: "https://images.unsplash.com/photo-1506905925346-21bda4d32df4?w=300&h=300&fit=crop",
        days_ago: 5,
        popularity: 70,
        categories: &["Health & Fitness", "Religion & Spirituality", "Mental Health"],
    },
    DemoEntry {
        id: "5",
        title: "Success Stories: From Startup to Millions",
        description: "Inspiring interviews with successful entrepreneurs. Learn about their journey, failures, breakthroughs, and the resilience that drove them to build amazing companies. Full of motivation and practical advice.",
        audio_length_sec: 4200,
        podcast_name: "Business Builders",
        publisher: "Founders Audio",
        cover_art: "https://images.unsplash.com/photo-1560472354-b33ff0c44a43?w=300&h=300&fit=crop",
        days_ago: 2,
        popularity: 75,
        categories: &["Business", "Entrepreneurship", "Education"],
    },
    DemoEntry {
        id: "6",
        title: "Quick Tech Tips: Productivity Hacks in 15 Minutes",
        description: "Fast-paced tech tips and productivity hacks. Learn how to optimize your workflow, master keyboard shortcuts, and boost your efficiency in just 15 minutes.",
        audio_length_sec: 900,
        podcast_name: "Tech Quick",
        publisher: "Quick Cast",
        cover_art: "https://images.unsplash.com/photo-1531297484001-80022131f5a1?w=300&h=300&fit=crop",
        days_ago: 4,
        popularity: 60,
        categories: &["Technology", "Education", "How To"],
    },
    DemoEntry {
        id: "7",
        title: "Morning Motivation: 10-Minute Energy Boost",
        description: "Start your day right with this energizing 10-minute motivation session. Positive affirmations, goal-setting tips, and inspiring stories to fuel your morning routine.",
        audio_length_sec: 600,
        podcast_name: "Daily Boost",
        publisher: "Daily Boost Studio",
        cover_art: "https://images.unsplash.com/photo-1506905925346-21bda4d32df4?w=300&h=300&fit=crop",
        days_ago: 1,
        popularity: 55,
        categories: &["Education", "Self-Improvement", "Health & Fitness"],
    },
    DemoEntry {
        id: "8",
        title: "Deep Dive: The History of Space Exploration",
        description: "A comprehensive 90-minute journey through the history of space exploration. From the first satellites to Mars missions, explore humanity's greatest adventure in detail.",
        audio_length_sec: 5400,
        podcast_name: "Space Chronicles",
        publisher: "Orbit Audio",
        cover_art: "https://images.unsplash.com/photo-1446776877081-d282a0f896e2?w=300&h=300&fit=crop",
        days_ago: 6,
        popularity: 82,
        categories: &["Science", "History", "Astronomy"],
    },
    DemoEntry {
        id: "9",
        title: "Lunch Break Learning: Psychology Facts",
        description: "Perfect for your lunch break! Discover fascinating psychology facts and insights in this bite-sized 20-minute episode. Learn about human behavior, cognitive biases, and mental tricks.",
        audio_length_sec: 1200,
        podcast_name: "Mind Bites",
        publisher: "Mind Bites Media",
        cover_art: "https://images.unsplash.com/photo-1559757148-5c350d0d3c56?w=300&h=300&fit=crop",
        days_ago: 3,
        popularity: 65,
        categories: &["Science", "Education", "Social Sciences"],
    },
    DemoEntry {
        id: "10",
        title: "Weekend Stories: 2-Hour True Crime Marathon",
        description: "Settle in for a long-form true crime investigation. This 2-hour deep dive covers multiple cases, interviews with experts, and detailed analysis of criminal psychology.",
        audio_length_sec: 7200,
        podcast_name: "Crime Deep Dive",
        publisher: "Deep Dive Audio",
        cover_art: "https://images.unsplash.com/photo-1578662996442-48f60103fc96?w=300&h=300&fit=crop",
        days_ago: 8,
        popularity: 73,
        categories: &["True Crime", "Documentary"],
    },
];

/// The demo catalog, materialized at a fixed instant
#[derive(Debug, Clone)]
pub struct DemoCatalog {
    episodes: Vec<Episode>,
}

impl DemoCatalog {
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// Build the catalog with publication dates relative to `now`
    pub fn at(now: DateTime<Utc>) -> Self {
        let episodes = DEMO_ENTRIES
            .iter()
            .map(|entry| {
                let mut episode = Episode::new(
                    format!("{DEMO_PREFIX}{}", entry.id),
                    entry.title,
                    entry.podcast_name,
                    entry.audio_length_sec,
                )
                .with_description(entry.description)
                .with_publisher(entry.publisher)
                .with_cover_art(entry.cover_art)
                .with_published_at(now - Duration::days(entry.days_ago))
                .with_popularity(entry.popularity)
                .with_categories(entry.categories.iter().copied());
                episode.external_url = Some(format!("https://example.com/episode{}", entry.id));
                episode.platform_links = platform_links(entry.podcast_name, entry.publisher);
                episode
            })
            .collect();
        Self { episodes }
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    /// Episodes whose text or categories contain any word of `query`.
    ///
    /// Matching is case-insensitive substring matching; tokens without any
    /// alphanumeric character (like "&") are ignored.
    pub fn search(&self, query: &str, limit: usize) -> Vec<Episode> {
        let keywords: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .filter(|token| token.chars().any(char::is_alphanumeric))
            .map(str::to_string)
            .collect();
        if keywords.is_empty() {
            return Vec::new();
        }

        self.episodes
            .iter()
            .filter(|episode| {
                let text = format!(
                    "{} {} {} {}",
                    episode.title,
                    episode.description,
                    episode.podcast_name,
                    episode.categories.join(" ")
                )
                .to_lowercase();
                keywords.iter().any(|keyword| text.contains(keyword.as_str()))
            })
            .take(limit)
            .cloned()
            .collect()
    }

    /// The whole catalog, used as the last-resort fallback
    pub fn best_of(&self) -> Vec<Episode> {
        self.episodes.clone()
    }
}

impl Default for DemoCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_ten_episodes() {
        let catalog = DemoCatalog::new();
        assert_eq!(catalog.len(), 10);
        let best = catalog.best_of();
        assert_eq!(best[0].id, "demo:1");
        assert_eq!(best[9].duration_minutes(), 120.0);
        assert!(best.iter().all(|e| e.popularity.is_some() && !e.categories.is_empty()));
    }

    #[test]
    fn test_published_dates_relative_to_now() {
        let now = Utc::now();
        let catalog = DemoCatalog::at(now);
        let first = &catalog.best_of()[0];
        assert_eq!(first.published_at, Some(now - Duration::days(7)));
    }

    #[test]
    fn test_search_by_category_and_text() {
        let catalog = DemoCatalog::new();

        let crime = catalog.search("True Crime", 20);
        let ids: Vec<_> = crime.iter().map(|e| e.id.as_str()).collect();
        assert!(ids.contains(&"demo:2"));
        assert!(ids.contains(&"demo:10"));

        let comedy = catalog.search("Comedy", 1);
        assert_eq!(comedy.len(), 1);
        assert_eq!(comedy[0].id, "demo:3");
    }

    #[test]
    fn test_search_ignores_symbol_tokens() {
        let catalog = DemoCatalog::new();
        assert!(catalog.search("&", 20).is_empty());
        assert!(catalog.search("   ", 20).is_empty());
        assert!(catalog.search("zzzqqq", 20).is_empty());
    }
}

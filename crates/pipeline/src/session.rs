//! Caller-owned state of one listening session.
//!
//! Every session gets its own `SessionState`; the ranker and the shuffle
//! selector only ever mutate the state they are handed.

use crate::scoring::ScoredEpisode;
use catalog::{Episode, EpisodeId};
use std::collections::{HashSet, VecDeque};

/// Default capacity of the recent-recommendation window
pub const RECENT_WINDOW_SIZE: usize = 20;

/// Bounded FIFO of recently surfaced (episode id, podcast name) pairs.
#[derive(Debug, Clone)]
pub struct RecentWindow {
    entries: VecDeque<(EpisodeId, String)>,
    capacity: usize,
}

impl RecentWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Record an episode, evicting the oldest entry when full
    pub fn push(&mut self, episode: &Episode) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries
            .push_back((episode.id.clone(), episode.podcast_name.clone()));
    }

    pub fn contains_episode(&self, episode_id: &str) -> bool {
        self.entries.iter().any(|(id, _)| id == episode_id)
    }

    pub fn contains_podcast(&self, podcast_name: &str) -> bool {
        self.entries.iter().any(|(_, podcast)| podcast == podcast_name)
    }

    /// Episode ids, oldest first
    pub fn episode_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for RecentWindow {
    fn default() -> Self {
        Self::new(RECENT_WINDOW_SIZE)
    }
}

/// Shuffle bookkeeping for the current search.
#[derive(Debug, Clone, Default)]
pub struct ShuffleState {
    /// Every episode surfaced since the last search
    pub shown: HashSet<EpisodeId>,
    /// Current generated batch of alternatives
    pub options: Vec<ScoredEpisode>,
    /// Next position in `options`
    pub cursor: usize,
}

impl ShuffleState {
    pub fn reset(&mut self) {
        self.shown.clear();
        self.options.clear();
        self.cursor = 0;
    }
}

/// Everything the ranker and shuffle selector remember about one user.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub recent: RecentWindow,
    pub shuffle: ShuffleState,
    /// Searches performed in this session
    pub session_count: u32,
    pub consecutive_skips: u32,
    /// Last ranked list, the pool shuffles draw from
    pub ranked: Vec<ScoredEpisode>,
    pub current: Option<ScoredEpisode>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh search cycle over a newly ranked list.
    ///
    /// The top pick becomes current and counts as shown; the shuffle cycle
    /// and skip streak start over.
    pub fn begin_search(&mut self, ranked: Vec<ScoredEpisode>) {
        self.shuffle.reset();
        self.current = ranked.first().cloned();
        if let Some(current) = &self.current {
            self.shuffle.shown.insert(current.episode.id.clone());
        }
        self.ranked = ranked;
        self.session_count += 1;
        self.consecutive_skips = 0;
    }

    pub fn record_skip(&mut self) {
        self.consecutive_skips += 1;
    }

    pub fn reset_skips(&mut self) {
        self.consecutive_skips = 0;
    }

    pub fn has_shown(&self, episode_id: &str) -> bool {
        self.shuffle.shown.contains(episode_id)
    }
}

//! Filter for the user's target listening time.

use crate::traits::Filter;
use anyhow::Result;
use catalog::{Episode, VibeSelection};

/// Keeps episodes whose length is within `tolerance_minutes` of the target.
///
/// ## Algorithm
/// 1. Window is `[target - tolerance, target + tolerance]`, both ends inclusive
/// 2. Episode length is `Episode::duration_minutes`, so show records count
///    as the default show estimate
pub struct DurationWindowFilter {
    tolerance_minutes: f64,
}

impl DurationWindowFilter {
    pub fn new(tolerance_minutes: f64) -> Self {
        Self { tolerance_minutes }
    }

    pub fn tolerance_minutes(&self) -> f64 {
        self.tolerance_minutes
    }

    /// Whether a single episode falls inside the window around `target_minutes`
    pub fn accepts(&self, episode: &Episode, target_minutes: u32) -> bool {
        let diff = (episode.duration_minutes() - target_minutes as f64).abs();
        diff <= self.tolerance_minutes
    }
}

impl Filter for DurationWindowFilter {
    fn name(&self) -> &str {
        "DurationWindowFilter"
    }

    fn apply(&self, episodes: Vec<Episode>, selection: &VibeSelection) -> Result<Vec<Episode>> {
        let filtered: Vec<Episode> = episodes
            .into_iter()
            .filter(|episode| self.accepts(episode, selection.target_minutes))
            .collect();
        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_window_is_inclusive() {
        let selection = VibeSelection::new(vec![], vec![], 45);
        let episodes = vec![
            Episode::new("short", "Short", "Show", 29 * 60),
            Episode::new("edge_low", "Edge Low", "Show", 30 * 60),
            Episode::new("exact", "Exact", "Show", 45 * 60),
            Episode::new("edge_high", "Edge High", "Show", 60 * 60),
            Episode::new("long", "Long", "Show", 61 * 60),
        ];

        let filter = DurationWindowFilter::new(15.0);
        let filtered = filter.apply(episodes, &selection).unwrap();

        let ids: Vec<_> = filtered.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["edge_low", "exact", "edge_high"]);
    }

    #[test]
    fn test_show_records_use_default_estimate() {
        let show = Episode::new("show", "Show", "Show", 0);
        let filter = DurationWindowFilter::new(15.0);
        assert!(filter.accepts(&show, 40));
        assert!(!filter.accepts(&show, 60));
    }
}

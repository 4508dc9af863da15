//! The FilterPipeline orchestrates multiple filters.
//!
//! This module provides the FilterPipeline struct that chains filters
//! together using the builder pattern.

use crate::traits::Filter;
use anyhow::Result;
use catalog::{Episode, VibeSelection};
use tracing;

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(DurationWindowFilter::new(15.0));
///
/// let filtered = pipeline.apply(episodes, &selection)?;
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply all filters in sequence.
    ///
    /// ## Algorithm
    /// 1. Start with the input episodes
    /// 2. For each filter in order: log the input count, apply, log the output count
    /// 3. Return the final filtered set
    pub fn apply(&self, episodes: Vec<Episode>, selection: &VibeSelection) -> Result<Vec<Episode>> {
        let mut current = episodes;
        for filter in &self.filters {
            tracing::debug!(
                "Applying filter: {} (input count: {})",
                filter.name(),
                current.len()
            );
            current = filter.apply(current, selection)?;
            tracing::debug!(
                "Filter applied: {} (output count: {})",
                filter.name(),
                current.len()
            );
        }
        Ok(current)
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::DurationWindowFilter;

    fn selection(target_minutes: u32) -> VibeSelection {
        VibeSelection::new(vec![], vec![], target_minutes)
    }

    #[test]
    fn test_empty_pipeline() {
        let pipeline = FilterPipeline::new();
        let episodes = vec![
            Episode::new("a", "A", "Show", 600),
            Episode::new("b", "B", "Show", 6000),
        ];

        let filtered = pipeline.apply(episodes, &selection(30)).unwrap();
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_single_filter() {
        let pipeline = FilterPipeline::new().add_filter(DurationWindowFilter::new(15.0));
        let episodes = vec![
            Episode::new("a", "A", "Show", 600),
            Episode::new("b", "B", "Show", 1800),
        ];

        let filtered = pipeline.apply(episodes, &selection(30)).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "b");
    }

    #[test]
    fn test_filters_compose() {
        let pipeline = FilterPipeline::new()
            .add_filter(DurationWindowFilter::new(25.0))
            .add_filter(DurationWindowFilter::new(5.0));
        let episodes = vec![
            Episode::new("a", "A", "Show", 1200),
            Episode::new("b", "B", "Show", 1920),
        ];

        let filtered = pipeline.apply(episodes, &selection(30)).unwrap();
        assert_eq!(pipeline.len(), 2);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "b");
    }
}

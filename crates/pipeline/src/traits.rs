//! Core traits for the filtering pipeline.
//!
//! This module defines the Filter trait that allows composable,
//! extensible filters to be applied to an episode pool before scoring.

use anyhow::Result;
use catalog::{Episode, VibeSelection};

/// Core trait for filtering episodes.
///
/// ## Design Note
/// - `Send + Sync` allows filters to be shared across concurrent sessions
/// - Filters take ownership of the Vec<Episode> and return a filtered Vec,
///   preserving the relative order of the survivors
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a set of episodes.
    ///
    /// # Arguments
    /// * `episodes` - The episodes to filter (takes ownership)
    /// * `selection` - The user's current request
    fn apply(&self, episodes: Vec<Episode>, selection: &VibeSelection) -> Result<Vec<Episode>>;
}

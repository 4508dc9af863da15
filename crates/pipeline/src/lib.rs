//! Ranking pipeline for podcast episodes.
//!
//! This crate provides:
//! - Filter trait and the duration-window filter
//! - FilterPipeline for composing filters
//! - Content factors and the ScoringEngine that combines them with the
//!   listener's stored preferences
//! - Ranker: duration filtering with widening, concurrent scoring, sorting
//! - ShuffleSelector: tiered, non-repeating alternatives to the top pick
//! - SessionState: per-listener state owned by the caller
//!
//! ## Architecture
//! A pool of episodes flows through the pipeline in stages:
//! 1. The duration window removes episodes that don't fit the time budget
//! 2. The ScoringEngine scores every survivor concurrently
//! 3. The Ranker sorts and records the top pick in the session
//! 4. The ShuffleSelector serves alternatives from the ranked list
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{Ranker, ScoringEngine, SessionState, ShuffleSelector};
//!
//! let engine = Arc::new(ScoringEngine::new(store.clone()));
//! let ranker = Ranker::new(engine);
//! let mut session = SessionState::new();
//!
//! let ranked = ranker.rank(&pool, &selection, &mut session).await?;
//! session.begin_search(ranked);
//!
//! let mut shuffler = ShuffleSelector::new(rand::rng());
//! let alternative = shuffler.next(&mut session);
//! ```

pub mod factors;
pub mod filter_pipeline;
pub mod filters;
pub mod ranker;
pub mod scoring;
pub mod session;
pub mod shuffle;
pub mod traits;

// Re-export main types
pub use factors::Factor;
pub use filter_pipeline::FilterPipeline;
pub use ranker::{Ranker, RankerConfig, sort_ranked};
pub use scoring::{
    NEUTRAL_PERSONAL_FIT, ScoreBreakdown, ScoredEpisode, ScoringContext, ScoringEngine,
    ScoringWeights, normalize_bonus, personal_bonus,
};
pub use session::{RECENT_WINDOW_SIZE, RecentWindow, SessionState, ShuffleState};
pub use shuffle::{ShuffleConfig, ShuffleSelector, Tier, TierWeights};
pub use traits::Filter;

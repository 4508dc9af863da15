//! Preference store for ratings, learned weights and playback signals.
//!
//! This crate owns every piece of user feedback:
//! - Raw star ratings (`RatingRecord`), append-only
//! - The learned (mood, theme) weight table (`PreferenceWeight`)
//! - Per-episode implicit engagement (`ImplicitFeedback`)
//!
//! Backends implement `PreferenceStore`. `FallbackStore` pairs a primary
//! backend with a local one so callers never see a failure from a backend
//! that is temporarily unreachable.

use async_trait::async_trait;
use catalog::{ImplicitFeedback, PreferenceWeight, RatingRecord};
use chrono::{DateTime, Utc};

pub mod error;
pub mod fallback;
pub mod feedback;
pub mod file;
pub mod learning;
pub mod memory;

pub use error::{Result, StoreError};
pub use fallback::FallbackStore;
pub use feedback::{PlaybackEvent, record_playback, submit_rating};
pub use file::JsonFileStore;
pub use learning::{
    WINDOW_SIZE, apply_rating, find_weight, learning_rate, normalized_rating, update_weights,
};
pub use memory::{MemoryStore, StoreSnapshot};

/// Persistence capability consumed by the scoring engine and rating flow.
///
/// Weight saves are upserts keyed by (mood, theme): rows not present in the
/// argument are left untouched.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Backend name for logs ("memory", "json_file", ...)
    fn name(&self) -> &str;

    async fn save_rating(&self, record: RatingRecord) -> Result<()>;

    async fn get_all_ratings(&self) -> Result<Vec<RatingRecord>>;

    /// Ratings of a single episode
    async fn ratings_for_episode(&self, episode_id: &str) -> Result<Vec<RatingRecord>> {
        let ratings = self.get_all_ratings().await?;
        Ok(ratings
            .into_iter()
            .filter(|r| r.episode_id == episode_id)
            .collect())
    }

    async fn get_preference_weights(&self) -> Result<Vec<PreferenceWeight>>;

    async fn save_preference_weights(&self, weights: Vec<PreferenceWeight>) -> Result<()>;

    /// Fold `record` into the weight table and return the touched rows.
    ///
    /// Backends holding their data behind a lock override this so the read
    /// and the upsert happen under one guard. The default is a plain read
    /// followed by a save and is only safe with a single writer.
    async fn apply_rating_update(
        &self,
        record: &RatingRecord,
        now: DateTime<Utc>,
    ) -> Result<Vec<PreferenceWeight>> {
        let existing = self.get_preference_weights().await?;
        let updated = learning::update_weights(&existing, record, now);
        if !updated.is_empty() {
            self.save_preference_weights(updated.clone()).await?;
        }
        Ok(updated)
    }

    async fn get_implicit_feedback(&self, episode_id: &str) -> Result<Option<ImplicitFeedback>>;

    async fn save_implicit_feedback(
        &self,
        episode_id: &str,
        feedback: ImplicitFeedback,
    ) -> Result<()>;
}

//! Write paths for explicit and implicit feedback.

use crate::error::Result;
use crate::PreferenceStore;
use catalog::{EpisodeId, ImplicitFeedback, PreferenceWeight, RatingRecord};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One finished (or abandoned) listen of an episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackEvent {
    pub episode_id: EpisodeId,
    pub listened_sec: u32,
    /// Full episode length; 0 when unknown
    pub duration_sec: u32,
    pub skipped: bool,
    pub fast_forwards: u32,
}

impl PlaybackEvent {
    pub fn new(episode_id: impl Into<EpisodeId>, listened_sec: u32, duration_sec: u32) -> Self {
        Self {
            episode_id: episode_id.into(),
            listened_sec,
            duration_sec,
            skipped: false,
            fast_forwards: 0,
        }
    }

    pub fn skipped(mut self) -> Self {
        self.skipped = true;
        self
    }

    pub fn with_fast_forwards(mut self, count: u32) -> Self {
        self.fast_forwards = count;
        self
    }

    /// Listened fraction in [0, 1], or None when the length is unknown
    pub fn completion(&self) -> Option<f64> {
        if self.duration_sec == 0 {
            return None;
        }
        Some((self.listened_sec as f64 / self.duration_sec as f64).clamp(0.0, 1.0))
    }
}

/// Persist a rating, then fold it into the learned weight table.
///
/// Returns the weight rows the rating touched. Records with stars outside
/// 1..=5 are rejected with `StoreError::Invalid` before anything is saved.
pub async fn submit_rating<S>(store: &S, record: RatingRecord) -> Result<Vec<PreferenceWeight>>
where
    S: PreferenceStore + ?Sized,
{
    record.validate()?;
    store.save_rating(record.clone()).await?;
    let updated = store.apply_rating_update(&record, Utc::now()).await?;

    info!(
        episode = %record.episode_id,
        rating = record.rating,
        pairs = updated.len(),
        "Recorded rating"
    );
    Ok(updated)
}

/// Merge a playback event into the episode's implicit feedback
pub async fn record_playback<S>(store: &S, event: PlaybackEvent) -> Result<ImplicitFeedback>
where
    S: PreferenceStore + ?Sized,
{
    let mut feedback = store
        .get_implicit_feedback(&event.episode_id)
        .await?
        .unwrap_or_default();

    if event.skipped {
        feedback.skip_count += 1;
    }
    feedback.fast_forward_count += event.fast_forwards;
    feedback.total_play_time_sec += event.listened_sec as u64;
    if let Some(completion) = event.completion() {
        let plays = feedback.plays as f64;
        feedback.completion_rate = (feedback.completion_rate * plays + completion) / (plays + 1.0);
        feedback.plays += 1;
    }
    feedback.last_updated = Utc::now();

    store
        .save_implicit_feedback(&event.episode_id, feedback.clone())
        .await?;
    debug!(
        episode = %event.episode_id,
        completion = feedback.completion_rate,
        skips = feedback.skip_count,
        "Merged playback event"
    );
    Ok(feedback)
}

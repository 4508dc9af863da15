//! In-memory preference store.
//!
//! `StoreSnapshot` is also the on-disk shape used by `JsonFileStore`.

use crate::error::Result;
use crate::learning::update_weights;
use crate::PreferenceStore;
use async_trait::async_trait;
use catalog::{EpisodeId, ImplicitFeedback, PreferenceWeight, RatingRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Everything a store holds, in one serializable value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub ratings: Vec<RatingRecord>,
    #[serde(default)]
    pub weights: Vec<PreferenceWeight>,
    #[serde(default)]
    pub implicit: HashMap<EpisodeId, ImplicitFeedback>,
}

impl StoreSnapshot {
    /// Replace rows with the same (mood, theme) key, append the rest
    pub fn upsert_weights(&mut self, weights: Vec<PreferenceWeight>) {
        for weight in weights {
            match self.weights.iter_mut().find(|w| w.key() == weight.key()) {
                Some(existing) => *existing = weight,
                None => self.weights.push(weight),
            }
        }
    }
}

/// Process-local store; contents are lost on exit
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<StoreSnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing data (used by tests and the file store)
    pub fn with_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            state: RwLock::new(snapshot),
        }
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        self.state.read().await.clone()
    }
}

#[async_trait]
impl PreferenceStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn save_rating(&self, record: RatingRecord) -> Result<()> {
        self.state.write().await.ratings.push(record);
        Ok(())
    }

    async fn get_all_ratings(&self) -> Result<Vec<RatingRecord>> {
        Ok(self.state.read().await.ratings.clone())
    }

    async fn get_preference_weights(&self) -> Result<Vec<PreferenceWeight>> {
        Ok(self.state.read().await.weights.clone())
    }

    async fn save_preference_weights(&self, weights: Vec<PreferenceWeight>) -> Result<()> {
        self.state.write().await.upsert_weights(weights);
        Ok(())
    }

    async fn apply_rating_update(
        &self,
        record: &RatingRecord,
        now: DateTime<Utc>,
    ) -> Result<Vec<PreferenceWeight>> {
        let mut state = self.state.write().await;
        let updated = update_weights(&state.weights, record, now);
        state.upsert_weights(updated.clone());
        Ok(updated)
    }

    async fn get_implicit_feedback(&self, episode_id: &str) -> Result<Option<ImplicitFeedback>> {
        Ok(self.state.read().await.implicit.get(episode_id).cloned())
    }

    async fn save_implicit_feedback(
        &self,
        episode_id: &str,
        feedback: ImplicitFeedback,
    ) -> Result<()> {
        self.state
            .write()
            .await
            .implicit
            .insert(episode_id.to_string(), feedback);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{Mood, Theme};

    fn rating(episode_id: &str, stars: u8) -> RatingRecord {
        RatingRecord::new(episode_id, stars, vec![Mood::Happy], vec![Theme::Laugh]).unwrap()
    }

    #[tokio::test]
    async fn test_reads_are_repeatable() {
        let store = MemoryStore::new();
        store.save_rating(rating("demo:1", 4)).await.unwrap();

        let first = store.get_all_ratings().await.unwrap();
        let second = store.get_all_ratings().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_saved_rating_appears_exactly_once() {
        let store = MemoryStore::new();
        store.save_rating(rating("demo:1", 4)).await.unwrap();
        let record = rating("demo:2", 5).with_comment("great");
        store.save_rating(record.clone()).await.unwrap();

        let all = store.get_all_ratings().await.unwrap();
        assert_eq!(all.iter().filter(|r| **r == record).count(), 1);
        assert_eq!(all.len(), 2);

        let only_second = store.ratings_for_episode("demo:2").await.unwrap();
        assert_eq!(only_second, vec![record]);
    }

    #[tokio::test]
    async fn test_weights_upsert_by_pair() {
        let store = MemoryStore::new();
        let mut happy_laugh = PreferenceWeight::new(Mood::Happy, Theme::Laugh);
        let sad_cry = PreferenceWeight::new(Mood::Sad, Theme::Cry);
        store
            .save_preference_weights(vec![happy_laugh.clone(), sad_cry])
            .await
            .unwrap();

        happy_laugh.weight = 0.75;
        store
            .save_preference_weights(vec![happy_laugh])
            .await
            .unwrap();

        let weights = store.get_preference_weights().await.unwrap();
        assert_eq!(weights.len(), 2);
        assert_eq!(weights[0].weight, 0.75);
        assert_eq!(weights[1].key(), (Mood::Sad, Theme::Cry));
    }

    #[tokio::test]
    async fn test_implicit_feedback_round_trip() {
        let store = MemoryStore::new();
        assert!(store.get_implicit_feedback("demo:1").await.unwrap().is_none());

        let feedback = ImplicitFeedback {
            skip_count: 2,
            ..Default::default()
        };
        store
            .save_implicit_feedback("demo:1", feedback.clone())
            .await
            .unwrap();
        assert_eq!(
            store.get_implicit_feedback("demo:1").await.unwrap(),
            Some(feedback)
        );
    }
}

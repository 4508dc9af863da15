//! JSON file backed preference store.
//!
//! The whole `StoreSnapshot` lives in memory and is rewritten to disk after
//! every mutation (write to a sibling temp file, then rename). This process
//! is assumed to be the only writer of the file.

use crate::error::{Result, StoreError};
use crate::learning::update_weights;
use crate::memory::StoreSnapshot;
use crate::PreferenceStore;
use async_trait::async_trait;
use catalog::{ImplicitFeedback, PreferenceWeight, RatingRecord};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

pub struct JsonFileStore {
    path: PathBuf,
    state: Mutex<StoreSnapshot>,
}

impl JsonFileStore {
    /// Open (or lazily create) a store at `path`.
    ///
    /// A missing file is an empty store. A file that exists but does not
    /// decode is reported as `StoreError::Corrupt` rather than overwritten.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let snapshot = match tokio::fs::read_to_string(&path).await {
            Ok(contents) if contents.trim().is_empty() => StoreSnapshot::default(),
            Ok(contents) => {
                serde_json::from_str(&contents).map_err(|e| StoreError::Corrupt {
                    path: path.clone(),
                    reason: e.to_string(),
                })?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreSnapshot::default(),
            Err(e) => return Err(e.into()),
        };

        info!(
            "Opened preference file {:?} ({} ratings, {} weights)",
            path,
            snapshot.ratings.len(),
            snapshot.weights.len()
        );

        Ok(Self {
            path,
            state: Mutex::new(snapshot),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, snapshot: &StoreSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_string_pretty(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!("Persisted preference file {:?}", self.path);
        Ok(())
    }

    /// Apply `mutate` and persist; in-memory state only changes if the write succeeds
    async fn update<F, T>(&self, mutate: F) -> Result<T>
    where
        F: FnOnce(&mut StoreSnapshot) -> T + Send,
    {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        let output = mutate(&mut next);
        self.persist(&next).await?;
        *state = next;
        Ok(output)
    }
}

#[async_trait]
impl PreferenceStore for JsonFileStore {
    fn name(&self) -> &str {
        "json_file"
    }

    async fn save_rating(&self, record: RatingRecord) -> Result<()> {
        self.update(move |s| s.ratings.push(record)).await
    }

    async fn get_all_ratings(&self) -> Result<Vec<RatingRecord>> {
        Ok(self.state.lock().await.ratings.clone())
    }

    async fn get_preference_weights(&self) -> Result<Vec<PreferenceWeight>> {
        Ok(self.state.lock().await.weights.clone())
    }

    async fn save_preference_weights(&self, weights: Vec<PreferenceWeight>) -> Result<()> {
        self.update(move |s| s.upsert_weights(weights)).await
    }

    async fn apply_rating_update(
        &self,
        record: &RatingRecord,
        now: DateTime<Utc>,
    ) -> Result<Vec<PreferenceWeight>> {
        self.update(|s| {
            let updated = update_weights(&s.weights, record, now);
            s.upsert_weights(updated.clone());
            updated
        })
        .await
    }

    async fn get_implicit_feedback(&self, episode_id: &str) -> Result<Option<ImplicitFeedback>> {
        Ok(self.state.lock().await.implicit.get(episode_id).cloned())
    }

    async fn save_implicit_feedback(
        &self,
        episode_id: &str,
        feedback: ImplicitFeedback,
    ) -> Result<()> {
        let key = episode_id.to_string();
        self.update(move |s| {
            s.implicit.insert(key, feedback);
        })
        .await
    }
}

//! Primary store with a local fallback.
//!
//! Every write goes to the primary first; on failure it lands in the local
//! store instead. Reads try the primary, then the local store, and finally
//! degrade to an empty answer. No operation on this type returns an error.
//! Conflicts between the two are not reconciled (last writer wins).

use crate::error::Result;
use crate::learning::update_weights;
use crate::PreferenceStore;
use async_trait::async_trait;
use catalog::{ImplicitFeedback, PreferenceWeight, RatingRecord};
use chrono::{DateTime, Utc};
use tracing::warn;

pub struct FallbackStore<P, L> {
    primary: P,
    local: L,
}

impl<P, L> FallbackStore<P, L>
where
    P: PreferenceStore,
    L: PreferenceStore,
{
    pub fn new(primary: P, local: L) -> Self {
        Self { primary, local }
    }

    pub fn primary(&self) -> &P {
        &self.primary
    }

    pub fn local(&self) -> &L {
        &self.local
    }
}

/// Run `$op` on the primary, then the local store, then return `$empty`
macro_rules! read_with_fallback {
    ($self:ident, $op:literal, $call:ident ( $($arg:expr),* ), $empty:expr) => {{
        match $self.primary.$call($($arg),*).await {
            Ok(value) => value,
            Err(e) => {
                warn!(store = $self.primary.name(), error = %e, "{} failed on primary, using local", $op);
                match $self.local.$call($($arg),*).await {
                    Ok(value) => value,
                    Err(e) => {
                        warn!(store = $self.local.name(), error = %e, "{} failed on local, returning empty", $op);
                        $empty
                    }
                }
            }
        }
    }};
}

/// Run `$op` on the primary; on failure retry on the local store
macro_rules! write_with_fallback {
    ($self:ident, $op:literal, $call:ident ( $($arg:expr),* )) => {{
        if let Err(e) = $self.primary.$call($($arg.clone()),*).await {
            warn!(store = $self.primary.name(), error = %e, "{} failed on primary, writing locally", $op);
            if let Err(e) = $self.local.$call($($arg),*).await {
                warn!(store = $self.local.name(), error = %e, "{} failed on local, dropping write", $op);
            }
        }
        Ok(())
    }};
}

#[async_trait]
impl<P, L> PreferenceStore for FallbackStore<P, L>
where
    P: PreferenceStore,
    L: PreferenceStore,
{
    fn name(&self) -> &str {
        "fallback"
    }

    async fn save_rating(&self, record: RatingRecord) -> Result<()> {
        write_with_fallback!(self, "save_rating", save_rating(record))
    }

    async fn get_all_ratings(&self) -> Result<Vec<RatingRecord>> {
        Ok(read_with_fallback!(self, "get_all_ratings", get_all_ratings(), Vec::new()))
    }

    async fn get_preference_weights(&self) -> Result<Vec<PreferenceWeight>> {
        Ok(read_with_fallback!(
            self,
            "get_preference_weights",
            get_preference_weights(),
            Vec::new()
        ))
    }

    async fn save_preference_weights(&self, weights: Vec<PreferenceWeight>) -> Result<()> {
        write_with_fallback!(self, "save_preference_weights", save_preference_weights(weights))
    }

    async fn apply_rating_update(
        &self,
        record: &RatingRecord,
        now: DateTime<Utc>,
    ) -> Result<Vec<PreferenceWeight>> {
        match self.primary.apply_rating_update(record, now).await {
            Ok(updated) => Ok(updated),
            Err(e) => {
                warn!(store = self.primary.name(), error = %e, "apply_rating_update failed on primary, updating locally");
                match self.local.apply_rating_update(record, now).await {
                    Ok(updated) => Ok(updated),
                    Err(e) => {
                        warn!(store = self.local.name(), error = %e, "apply_rating_update failed on local, dropping update");
                        Ok(update_weights(&[], record, now))
                    }
                }
            }
        }
    }

    async fn get_implicit_feedback(&self, episode_id: &str) -> Result<Option<ImplicitFeedback>> {
        Ok(read_with_fallback!(
            self,
            "get_implicit_feedback",
            get_implicit_feedback(episode_id),
            None
        ))
    }

    async fn save_implicit_feedback(
        &self,
        episode_id: &str,
        feedback: ImplicitFeedback,
    ) -> Result<()> {
        write_with_fallback!(
            self,
            "save_implicit_feedback",
            save_implicit_feedback(episode_id, feedback)
        )
    }
}

//! Preference learning from explicit star ratings.
//!
//! ## Algorithm
//! For every (mood, theme) pair a rating touches:
//! 1. `alpha = 1 / max(1, episode_count / WINDOW_SIZE)` using the count
//!    before this rating, so early ratings dominate and the weight settles
//!    once enough samples exist
//! 2. `weight = weight * (1 - alpha) + normalized * alpha`, where
//!    `normalized = (stars - 3) / 2` maps 1..=5 onto [-1, 1]
//! 3. `avg_rating` is an exact running mean; `episode_count` is incremented

use catalog::{Mood, PreferenceWeight, RatingRecord, Theme};
use chrono::{DateTime, Utc};

/// Number of samples the update approximates a moving window over
pub const WINDOW_SIZE: u32 = 5;

/// Map 1..=5 stars onto [-1, 1]
pub fn normalized_rating(stars: u8) -> f64 {
    (stars as f64 - 3.0) / 2.0
}

/// Adaptation rate for a row that already has `episode_count` samples
pub fn learning_rate(episode_count: u32) -> f64 {
    let windows = episode_count as f64 / WINDOW_SIZE as f64;
    1.0 / windows.max(1.0)
}

/// Fold one rating into a weight row
pub fn apply_rating(weight: &mut PreferenceWeight, stars: u8, now: DateTime<Utc>) {
    let alpha = learning_rate(weight.episode_count);
    let updated = weight.weight * (1.0 - alpha) + normalized_rating(stars) * alpha;
    weight.weight = updated.clamp(-1.0, 1.0);

    let count = weight.episode_count as f64;
    weight.avg_rating = (weight.avg_rating * count + stars as f64) / (count + 1.0);
    weight.episode_count += 1;
    weight.last_updated = now;
}

/// Updated rows for every (mood, theme) pair in `record`.
///
/// Rows missing from `existing` are created lazily. Only touched rows are
/// returned; the store upserts them.
pub fn update_weights(
    existing: &[PreferenceWeight],
    record: &RatingRecord,
    now: DateTime<Utc>,
) -> Vec<PreferenceWeight> {
    let mut touched: Vec<PreferenceWeight> = Vec::new();

    for (mood, theme) in record.pairs() {
        if touched.iter().any(|w| w.key() == (mood, theme)) {
            continue;
        }
        let mut row = find_weight(existing, mood, theme)
            .cloned()
            .unwrap_or_else(|| PreferenceWeight::new(mood, theme));
        apply_rating(&mut row, record.rating, now);
        touched.push(row);
    }

    touched
}

pub fn find_weight(weights: &[PreferenceWeight], mood: Mood, theme: Theme) -> Option<&PreferenceWeight> {
    weights.iter().find(|w| w.mood == mood && w.theme == theme)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_rating() {
        assert_eq!(normalized_rating(1), -1.0);
        assert_eq!(normalized_rating(3), 0.0);
        assert_eq!(normalized_rating(5), 1.0);
    }

    #[test]
    fn test_learning_rate_decays_after_window() {
        assert_eq!(learning_rate(0), 1.0);
        assert_eq!(learning_rate(4), 1.0);
        assert_eq!(learning_rate(5), 1.0);
        assert_eq!(learning_rate(10), 0.5);
        assert_eq!(learning_rate(20), 0.25);
    }

    #[test]
    fn test_five_star_ratings_push_weight_up_within_bounds() {
        let mut row = PreferenceWeight::new(Mood::Happy, Theme::Laugh);
        let mut previous = row.weight;
        for _ in 0..5 {
            apply_rating(&mut row, 5, Utc::now());
            assert!(row.weight >= previous);
            assert!(row.weight <= 1.0 && row.weight >= 0.0);
            previous = row.weight;
        }
        assert_eq!(row.weight, 1.0);
        assert_eq!(row.episode_count, 5);
        assert_eq!(row.avg_rating, 5.0);
    }

    #[test]
    fn test_late_ratings_move_weight_partially() {
        let mut row = PreferenceWeight::new(Mood::Sad, Theme::Cry);
        for _ in 0..10 {
            apply_rating(&mut row, 5, Utc::now());
        }
        // count 10 -> alpha 0.5
        apply_rating(&mut row, 1, Utc::now());
        assert!((row.weight - 0.0).abs() < 1e-9);
        assert!((row.avg_rating - 51.0 / 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_update_weights_creates_and_updates_rows() {
        let mut existing = PreferenceWeight::new(Mood::Happy, Theme::Laugh);
        existing.weight = -0.5;
        existing.episode_count = 10;
        existing.avg_rating = 2.0;

        let record = RatingRecord::new(
            "demo:3",
            5,
            vec![Mood::Happy],
            vec![Theme::Laugh, Theme::Chill],
        )
        .unwrap();
        let rows = update_weights(&[existing], &record, Utc::now());

        assert_eq!(rows.len(), 2);
        let laugh = find_weight(&rows, Mood::Happy, Theme::Laugh).unwrap();
        assert!((laugh.weight - 0.25).abs() < 1e-9);
        assert_eq!(laugh.episode_count, 11);

        let chill = find_weight(&rows, Mood::Happy, Theme::Chill).unwrap();
        assert_eq!(chill.weight, 1.0);
        assert_eq!(chill.episode_count, 1);
    }

    #[test]
    fn test_update_weights_ignores_selection_without_pairs() {
        let record = RatingRecord::new("demo:3", 5, vec![Mood::Happy], vec![]).unwrap();
        assert!(update_weights(&[], &record, Utc::now()).is_empty());
    }
}

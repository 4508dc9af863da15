//! Simple test harness for the recommender.
//!
//! This binary runs one search plus a few shuffles against the configured
//! providers (the demo catalog when no credentials are set).

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use catalog::{Mood, Theme, VibeSelection};
use server::{Config, Recommender};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting vibecast server test harness");

    let config = Config::from_env()?;
    let recommender = Recommender::from_config(&config).await?;
    for status in recommender.provider_status() {
        info!(
            "Provider {}: {}",
            status.name,
            if status.available { "available" } else { "not configured" }
        );
    }

    let session = recommender.start_session().await;
    let selection = VibeSelection::new(vec![Mood::Curious], vec![Theme::Learn], 30);

    info!(
        "Requesting a {} minute episode for {:?} / {:?}",
        selection.target_minutes, selection.moods, selection.themes
    );
    let recommendation = recommender.recommend(&session, &selection).await?;

    let Some(pick) = recommendation.pick else {
        info!("No episode matched; try a different duration");
        return Ok(());
    };
    info!(
        "Top pick: {} from {} ({:.0} min) - Score: {:.1}",
        pick.episode.title,
        pick.episode.podcast_name,
        pick.episode.duration_minutes(),
        pick.score
    );
    info!("   {}", pick.match_reason());

    for i in 1..=3 {
        match recommender.shuffle_next(&session).await? {
            Some(next) => info!(
                "Shuffle {}: {} - Score: {:.1}",
                i, next.episode.title, next.score
            ),
            None => {
                info!("No more fresh episodes, start a new search");
                break;
            }
        }
    }

    Ok(())
}

//! Normalization of raw provider records into `Episode`s.
//!
//! Each provider answers in its own JSON shape. The raw structs here mirror
//! those payloads loosely (every field optional) so one bad record never
//! fails deserialization of the whole response; validation happens per
//! record in the `normalize_*` functions instead.
//!
//! Records without an id or a title are dropped by `normalize_batch` with a
//! warning. Batches are normalized in parallel; output order matches input.
//! Providers keep each record as a `serde_json::Value` until `decode_record`
//! so a wrongly typed field only costs that record.

use crate::error::{CatalogError, Result};
use crate::types::Episode;
use chrono::{DateTime, NaiveDate, Utc};
use rayon::prelude::*;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

pub const LISTEN_NOTES_PREFIX: &str = "ln:";
pub const SPOTIFY_PREFIX: &str = "sp:";
pub const DEMO_PREFIX: &str = "demo:";

// =============================================================================
// Raw Listen Notes Records
// =============================================================================

/// Podcast block embedded in a Listen Notes search result
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListenNotesPodcast {
    #[serde(default, alias = "title_original")]
    pub title: Option<String>,
    #[serde(default, alias = "publisher_original")]
    pub publisher: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// 0-100, only present for popular shows
    #[serde(default)]
    pub listen_score: Option<u8>,
    #[serde(default)]
    pub total_episodes: Option<u32>,
}

/// One episode from `GET /search?type=episode`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListenNotesEpisode {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, alias = "title_original")]
    pub title: Option<String>,
    #[serde(default, alias = "description_original")]
    pub description: Option<String>,
    #[serde(default)]
    pub audio_length_sec: Option<u32>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub listennotes_url: Option<String>,
    #[serde(default)]
    pub pub_date_ms: Option<i64>,
    #[serde(default)]
    pub podcast: Option<ListenNotesPodcast>,
}

// =============================================================================
// Raw Spotify Records
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotifyImage {
    pub url: String,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub width: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotifyExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotifyFollowers {
    #[serde(default)]
    pub total: Option<u64>,
}

/// A show from `GET /v1/search?type=show`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotifyShow {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
    #[serde(default)]
    pub total_episodes: Option<u32>,
    #[serde(default)]
    pub external_urls: SpotifyExternalUrls,
    #[serde(default)]
    pub popularity: Option<u8>,
    #[serde(default)]
    pub followers: Option<SpotifyFollowers>,
}

/// An episode from `GET /v1/shows/{id}/episodes`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotifyEpisode {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    /// "2024-03-01", "2024-03" or "2024" depending on precision
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
    #[serde(default)]
    pub external_urls: SpotifyExternalUrls,
}

// =============================================================================
// Helpers
// =============================================================================

fn required(value: Option<&String>, provider: &str, field: &str) -> Result<String> {
    match value.map(|v| v.trim()) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(CatalogError::MalformedRecord {
            provider: provider.to_string(),
            reason: format!("missing {field}"),
        }),
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Parse a Spotify release date at day, month or year precision
fn parse_release_date(raw: &str) -> Option<DateTime<Utc>> {
    let padded = match raw.len() {
        4 => format!("{raw}-01-01"),
        7 => format!("{raw}-01"),
        _ => raw.to_string(),
    };
    NaiveDate::parse_from_str(&padded, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Search links on the major platforms for a podcast.
///
/// These are plain search URLs built from the podcast name and publisher,
/// not app deep links.
pub fn platform_links(podcast_name: &str, publisher: &str) -> BTreeMap<String, String> {
    let name_query = urlencoding::encode(podcast_name).into_owned();
    let full_query = if publisher.is_empty() {
        name_query.clone()
    } else {
        urlencoding::encode(&format!("{podcast_name} {publisher}")).into_owned()
    };

    let mut links = BTreeMap::new();
    links.insert(
        "spotify".to_string(),
        format!("https://open.spotify.com/search/{name_query}/shows"),
    );
    links.insert(
        "apple".to_string(),
        format!("https://podcasts.apple.com/search?term={full_query}"),
    );
    links.insert(
        "google".to_string(),
        format!("https://podcasts.google.com/search/{name_query}"),
    );
    links.insert(
        "web".to_string(),
        format!("https://www.google.com/search?q={full_query}+podcast"),
    );
    links
}

// =============================================================================
// Normalizers
// =============================================================================

/// Decode one raw record of a provider payload
pub fn decode_record<T: DeserializeOwned>(value: &Value, provider: &str) -> Result<T> {
    T::deserialize(value).map_err(|e| CatalogError::MalformedRecord {
        provider: provider.to_string(),
        reason: e.to_string(),
    })
}

/// `normalize_listen_notes` over an undecoded search result
pub fn normalize_listen_notes_value(value: &Value) -> Result<Episode> {
    normalize_listen_notes(&decode_record(value, "listen_notes")?)
}

/// Convert one Listen Notes episode; `listen_score` becomes popularity.
pub fn normalize_listen_notes(raw: &ListenNotesEpisode) -> Result<Episode> {
    let id = required(raw.id.as_ref(), "listen_notes", "id")?;
    let title = required(raw.title.as_ref(), "listen_notes", "title")?;
    let podcast = raw.podcast.clone().unwrap_or_default();
    let podcast_name = non_empty(podcast.title.as_ref()).unwrap_or_else(|| title.clone());
    let publisher = non_empty(podcast.publisher.as_ref()).unwrap_or_default();

    let mut episode = Episode::new(
        format!("{LISTEN_NOTES_PREFIX}{id}"),
        title,
        podcast_name,
        raw.audio_length_sec.unwrap_or(0),
    );
    episode.description = raw.description.clone().unwrap_or_default();
    episode.publisher = publisher;
    episode.cover_art_url = non_empty(raw.image.as_ref()).or(non_empty(podcast.image.as_ref()));
    episode.external_url = non_empty(raw.listennotes_url.as_ref());
    episode.published_at = raw.pub_date_ms.and_then(DateTime::from_timestamp_millis);
    episode.popularity = podcast.listen_score.map(|s| s.min(100));
    episode.episode_count = podcast.total_episodes;
    episode.platform_links = platform_links(&episode.podcast_name, &episode.publisher);
    Ok(episode)
}

/// Convert one Spotify episode, taking podcast-level fields from its show.
pub fn normalize_spotify_episode(raw: &SpotifyEpisode, show: &SpotifyShow) -> Result<Episode> {
    let id = required(raw.id.as_ref(), "spotify", "id")?;
    let title = required(raw.name.as_ref(), "spotify", "name")?;
    let podcast_name = non_empty(show.name.as_ref()).unwrap_or_else(|| title.clone());
    let duration_sec = raw.duration_ms.map(|ms| (ms / 1000) as u32).unwrap_or(0);

    let mut episode = Episode::new(
        format!("{SPOTIFY_PREFIX}{id}"),
        title,
        podcast_name,
        duration_sec,
    );
    episode.description = raw.description.clone().unwrap_or_default();
    episode.publisher = non_empty(show.publisher.as_ref()).unwrap_or_default();
    episode.cover_art_url = raw
        .images
        .first()
        .or(show.images.first())
        .map(|img| img.url.clone());
    episode.external_url = non_empty(raw.external_urls.spotify.as_ref());
    episode.published_at = raw.release_date.as_deref().and_then(parse_release_date);
    episode.is_top_quality = true;
    episode.popularity = show.popularity.map(|p| p.min(100));
    episode.follower_count = show.followers.as_ref().and_then(|f| f.total);
    episode.episode_count = show.total_episodes;
    episode.platform_links = platform_links(&episode.podcast_name, &episode.publisher);
    Ok(episode)
}

/// Convert a Spotify show into a show record (`audio_length_sec == 0`).
pub fn normalize_spotify_show(show: &SpotifyShow) -> Result<Episode> {
    let id = required(show.id.as_ref(), "spotify", "id")?;
    let name = required(show.name.as_ref(), "spotify", "name")?;

    let mut episode = Episode::new(format!("{SPOTIFY_PREFIX}show:{id}"), name.clone(), name, 0);
    episode.description = show.description.clone().unwrap_or_default();
    episode.publisher = non_empty(show.publisher.as_ref()).unwrap_or_default();
    episode.cover_art_url = show.images.first().map(|img| img.url.clone());
    episode.external_url = non_empty(show.external_urls.spotify.as_ref());
    episode.is_top_quality = true;
    episode.popularity = show.popularity.map(|p| p.min(100));
    episode.follower_count = show.followers.as_ref().and_then(|f| f.total);
    episode.episode_count = show.total_episodes;
    episode.platform_links = platform_links(&episode.podcast_name, &episode.publisher);
    Ok(episode)
}

/// Normalize a batch in parallel, dropping (and logging) malformed records.
///
/// Output keeps the input order of the records that survive.
pub fn normalize_batch<T, F>(records: &[T], provider: &str, normalize: F) -> Vec<Episode>
where
    T: Sync,
    F: Fn(&T) -> Result<Episode> + Sync,
{
    records
        .par_iter()
        .filter_map(|record| match normalize(record) {
            Ok(episode) => Some(episode),
            Err(e) => {
                warn!(provider, error = %e, "Dropping malformed record");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ln_record(id: Option<&str>, title: Option<&str>) -> ListenNotesEpisode {
        ListenNotesEpisode {
            id: id.map(str::to_string),
            title: title.map(str::to_string),
            description: Some("An interview about space".to_string()),
            audio_length_sec: Some(2700),
            image: None,
            listennotes_url: Some("https://listennotes.com/e/1".to_string()),
            pub_date_ms: Some(1_700_000_000_000),
            podcast: Some(ListenNotesPodcast {
                title: Some("Star Talk".to_string()),
                publisher: Some("Cosmos Media".to_string()),
                image: Some("https://img/star.png".to_string()),
                listen_score: Some(72),
                total_episodes: Some(300),
            }),
        }
    }

    #[test]
    fn test_normalize_listen_notes() {
        let episode = normalize_listen_notes(&ln_record(Some("abc"), Some("Black Holes"))).unwrap();
        assert_eq!(episode.id, "ln:abc");
        assert_eq!(episode.podcast_name, "Star Talk");
        assert_eq!(episode.publisher, "Cosmos Media");
        assert_eq!(episode.duration_minutes(), 45.0);
        assert_eq!(episode.popularity, Some(72));
        assert_eq!(episode.cover_art_url.as_deref(), Some("https://img/star.png"));
        assert!(episode.published_at.is_some());
        assert!(!episode.is_top_quality);
        assert!(episode.platform_links.contains_key("spotify"));
    }

    #[test]
    fn test_listen_notes_accepts_original_field_names() {
        let json = r#"{
            "id": "x1",
            "title_original": "Deep Dive",
            "description_original": "Long form",
            "audio_length_sec": 600,
            "podcast": { "title_original": "Dives", "publisher_original": "Pub" }
        }"#;
        let raw: ListenNotesEpisode = serde_json::from_str(json).unwrap();
        let episode = normalize_listen_notes(&raw).unwrap();
        assert_eq!(episode.title, "Deep Dive");
        assert_eq!(episode.podcast_name, "Dives");
        assert_eq!(episode.publisher, "Pub");
    }

    #[test]
    fn test_missing_fields_are_malformed() {
        let err = normalize_listen_notes(&ln_record(None, Some("t"))).unwrap_err();
        assert!(matches!(err, CatalogError::MalformedRecord { .. }));
        assert!(normalize_listen_notes(&ln_record(Some("id"), Some("   "))).is_err());
    }

    #[test]
    fn test_normalize_batch_drops_bad_records_in_order() {
        let records = vec![
            ln_record(Some("1"), Some("First")),
            ln_record(None, Some("Broken")),
            ln_record(Some("3"), Some("Third")),
        ];
        let episodes = normalize_batch(&records, "listen_notes", normalize_listen_notes);
        let ids: Vec<_> = episodes.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["ln:1", "ln:3"]);
    }

    #[test]
    fn test_wrongly_typed_field_only_drops_its_record() {
        let records: Vec<Value> = serde_json::from_str(
            r#"[
                {"id": "good", "title": "Fine", "audio_length_sec": 1200,
                 "podcast": {"title": "Show", "listen_score": 80}},
                {"id": "score", "title": "Too Loud", "podcast": {"listen_score": 300}},
                {"id": "length", "title": "Stringly", "audio_length_sec": "1200"}
            ]"#,
        )
        .unwrap();

        let episodes = normalize_batch(&records, "listen_notes", normalize_listen_notes_value);
        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0].id, "ln:good");
        assert_eq!(episodes[0].popularity, Some(80));

        let err = normalize_listen_notes_value(&records[1]).unwrap_err();
        assert!(matches!(err, CatalogError::MalformedRecord { .. }));
    }

    #[test]
    fn test_spotify_episode_and_show() {
        let show = SpotifyShow {
            id: Some("show1".to_string()),
            name: Some("Laugh Lab".to_string()),
            description: Some("Comedy every week".to_string()),
            publisher: Some("Funny Co".to_string()),
            images: vec![SpotifyImage {
                url: "https://img/show.png".to_string(),
                height: None,
                width: None,
            }],
            total_episodes: Some(120),
            popularity: Some(88),
            ..Default::default()
        };
        let raw = SpotifyEpisode {
            id: Some("ep1".to_string()),
            name: Some("Episode One".to_string()),
            duration_ms: Some(1_800_000),
            release_date: Some("2024-03".to_string()),
            ..Default::default()
        };

        let episode = normalize_spotify_episode(&raw, &show).unwrap();
        assert_eq!(episode.id, "sp:ep1");
        assert_eq!(episode.podcast_name, "Laugh Lab");
        assert_eq!(episode.duration_minutes(), 30.0);
        assert!(episode.is_top_quality);
        assert_eq!(episode.popularity, Some(88));
        assert_eq!(episode.cover_art_url.as_deref(), Some("https://img/show.png"));
        assert_eq!(
            episode.published_at.map(|d| d.format("%Y-%m-%d").to_string()),
            Some("2024-03-01".to_string())
        );

        let record = normalize_spotify_show(&show).unwrap();
        assert_eq!(record.id, "sp:show:show1");
        assert!(record.is_show_record());
        assert_eq!(record.episode_count, Some(120));
    }

    #[test]
    fn test_platform_links_encode_query() {
        let links = platform_links("The Daily", "NYT");
        assert_eq!(
            links["spotify"],
            "https://open.spotify.com/search/The%20Daily/shows"
        );
        assert_eq!(
            links["web"],
            "https://www.google.com/search?q=The%20Daily%20NYT+podcast"
        );
        assert_eq!(links.len(), 4);
    }
}

use catalog::{DemoCatalog, Mood, Theme, search_terms_for};
use serde_json::json;
use sources::{
    AggregateError, CatalogAggregator, CatalogProvider, ListenNotesProvider, ProviderError,
    SpotifyProvider,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path, query_param},
};

// ============================================================================
// Listen Notes
// ============================================================================

#[tokio::test]
async fn test_listen_notes_search_normalizes_results() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(header("X-ListenAPI-Key", "test-key"))
        .and(query_param("q", "Comedy"))
        .and(query_param("type", "episode"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {
                    "id": "ep1",
                    "title_original": "Stand-Up Night",
                    "description_original": "Jokes and banter",
                    "audio_length_sec": 1800,
                    "listennotes_url": "https://www.listennotes.com/e/ep1",
                    "pub_date_ms": 1700000000000i64,
                    "podcast": {
                        "title_original": "Laugh Hour",
                        "publisher_original": "Giggle Co",
                        "image": "https://img/laugh.png",
                        "listen_score": 64
                    }
                },
                { "title_original": "No id, dropped" }
            ]
        })))
        .mount(&mock_server)
        .await;

    let provider =
        ListenNotesProvider::new(Some("test-key".to_string())).with_base_url(mock_server.uri());
    let episodes = provider.search_by_category("Comedy", 10).await.unwrap();

    assert_eq!(episodes.len(), 1);
    let episode = &episodes[0];
    assert_eq!(episode.id, "ln:ep1");
    assert_eq!(episode.title, "Stand-Up Night");
    assert_eq!(episode.podcast_name, "Laugh Hour");
    assert_eq!(episode.popularity, Some(64));
    assert_eq!(episode.duration_minutes(), 30.0);
}

#[tokio::test]
async fn test_listen_notes_drops_wrongly_typed_records_only() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "id": "loud", "title": "Too Loud", "podcast": { "listen_score": 300 } },
                { "id": "ok", "title": "Still Here", "audio_length_sec": 600 },
                { "id": "typed", "title": "Stringly", "audio_length_sec": "600" }
            ]
        })))
        .mount(&mock_server)
        .await;

    let provider =
        ListenNotesProvider::new(Some("test-key".to_string())).with_base_url(mock_server.uri());
    let episodes = provider.search_by_category("News", 10).await.unwrap();

    assert_eq!(episodes.len(), 1);
    assert_eq!(episodes[0].id, "ln:ok");
}

#[tokio::test]
async fn test_listen_notes_status_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&mock_server)
        .await;

    let provider =
        ListenNotesProvider::new(Some("test-key".to_string())).with_base_url(mock_server.uri());
    let err = provider.search_by_category("News", 10).await.unwrap_err();
    assert!(matches!(err, ProviderError::Status { status: 429, .. }));
}

#[tokio::test]
async fn test_listen_notes_without_key_is_unauthenticated() {
    let provider = ListenNotesProvider::new(None);
    assert!(!provider.is_available());
    let err = provider.search_by_category("News", 10).await.unwrap_err();
    assert!(matches!(err, ProviderError::Unauthenticated { .. }));
}

// ============================================================================
// Spotify
// ============================================================================

fn show_json(id: &str, name: &str, popularity: u8) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "description": format!("{name} description"),
        "publisher": "Pod Studio",
        "images": [{ "url": format!("https://img/{id}.png"), "height": 640, "width": 640 }],
        "total_episodes": 42,
        "external_urls": { "spotify": format!("https://open.spotify.com/show/{id}") },
        "popularity": popularity
    })
}

#[tokio::test]
async fn test_spotify_expands_shows_into_episodes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(header("authorization", "Bearer token-123"))
        .and(query_param("type", "show"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "shows": {
                "items": [
                    show_json("low", "Quiet Show", 10),
                    null,
                    show_json("high", "Loud Show", 90)
                ]
            }
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/shows/high/episodes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {
                    "id": "e1",
                    "name": "Loud Episode",
                    "description": "Loud things",
                    "duration_ms": 2_700_000,
                    "release_date": "2024-05-01",
                    "images": [],
                    "external_urls": { "spotify": "https://open.spotify.com/episode/e1" }
                }
            ]
        })))
        .mount(&mock_server)
        .await;

    // Episode listing for the quiet show fails: it is kept as a show record
    Mock::given(method("GET"))
        .and(path("/v1/shows/low/episodes"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let provider =
        SpotifyProvider::new(Some("token-123".to_string())).with_api_url(mock_server.uri());
    let episodes = provider.search_by_category("Comedy", 20).await.unwrap();

    let ids: Vec<_> = episodes.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["sp:e1", "sp:show:low"]);

    let loud = &episodes[0];
    assert!(loud.is_top_quality);
    assert_eq!(loud.podcast_name, "Loud Show");
    assert_eq!(loud.popularity, Some(90));
    assert_eq!(loud.duration_minutes(), 45.0);
    assert_eq!(loud.cover_art_url.as_deref(), Some("https://img/high.png"));

    assert!(episodes[1].is_show_record());
}

#[tokio::test]
async fn test_spotify_drops_wrongly_typed_items_only() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "shows": {
                "items": [
                    show_json("good", "Good Show", 50),
                    { "id": "bad", "name": "Bad Show", "popularity": "very" }
                ]
            }
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/shows/good/episodes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "id": "e1", "name": "Kept", "duration_ms": 600_000 },
                { "id": "e2", "name": "Dropped", "duration_ms": "600000" }
            ]
        })))
        .mount(&mock_server)
        .await;

    let provider =
        SpotifyProvider::new(Some("token-123".to_string())).with_api_url(mock_server.uri());
    let episodes = provider.search_by_category("Comedy", 20).await.unwrap();

    let ids: Vec<_> = episodes.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["sp:e1"]);
}

#[tokio::test]
async fn test_spotify_rejected_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let provider =
        SpotifyProvider::new(Some("expired".to_string())).with_api_url(mock_server.uri());
    let err = provider.search_by_category("News", 20).await.unwrap_err();
    assert!(matches!(err, ProviderError::Unauthenticated { .. }));
}

// ============================================================================
// Aggregation across real providers
// ============================================================================

#[tokio::test]
async fn test_aggregator_falls_back_from_broken_providers_to_demo() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let aggregator = CatalogAggregator::new()
        .add_provider(SpotifyProvider::new(Some("t".into())).with_api_url(mock_server.uri()))
        .add_provider(ListenNotesProvider::new(Some("k".into())).with_base_url(mock_server.uri()))
        .with_demo_fallback(DemoCatalog::new());

    let terms = search_terms_for(&[Mood::Bored], &[Theme::Laugh]);
    let pool = aggregator.search(&terms, 30).await.unwrap();
    assert_eq!(pool.len(), 10);
    assert!(pool.iter().all(|e| e.id.starts_with("demo:")));
}

#[tokio::test]
async fn test_aggregator_reports_every_failure_without_fallback() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&mock_server)
        .await;

    let aggregator = CatalogAggregator::new()
        .add_provider(SpotifyProvider::new(Some("t".into())).with_api_url(mock_server.uri()))
        .add_provider(ListenNotesProvider::new(None));

    let err = aggregator
        .search(&["Comedy".to_string()], 30)
        .await
        .unwrap_err();
    let AggregateError::AllProvidersFailed { messages } = err;
    assert!(messages.iter().any(|m| m.starts_with("spotify returned status 503")));
    assert!(messages.iter().any(|m| m.contains("listen_notes is not authenticated")));
}

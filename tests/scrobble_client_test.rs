mod common;

use common::{credentials, FakeHttpClient};
use serde_json::json;
use song_stats::{
    ClientEvent, Credentials, HttpGateway, LastFmScrobbleClient, PlayCount, ScrobbleClient,
    ScrobbleStats,
};

fn client(http: &FakeHttpClient) -> LastFmScrobbleClient {
    LastFmScrobbleClient::new(HttpGateway::new(Box::new(http.clone())))
}

fn track_info(playcount: &str) -> serde_json::Value {
    json!({"track": {"name": "Airbag", "userplaycount": playcount}})
}

#[test_log::test(tokio::test)]
async fn test_missing_credentials_skip_network() {
    let http = FakeHttpClient::new().route(&["track.getInfo"], 200, track_info("5"));
    let client = client(&http);

    let cases = [
        Credentials::default(),
        Credentials::new(Some("key".to_string()), None),
        Credentials::new(None, Some("listener".to_string())),
        Credentials::new(Some(" ".to_string()), Some("listener".to_string())),
    ];

    for creds in cases {
        let stats = client.fetch("Radiohead", "Airbag", &creds).await;
        assert_eq!(stats, ScrobbleStats::unknown());
    }

    assert_eq!(http.request_count(), 0);
}

#[test_log::test(tokio::test)]
async fn test_never_played_track_needs_one_request() {
    let http = FakeHttpClient::new().route(&["track.getInfo"], 200, track_info("0"));
    let stats = client(&http)
        .fetch("Radiohead", "Airbag", &credentials())
        .await;

    assert_eq!(stats, ScrobbleStats::new(0, None));
    assert_eq!(http.request_count(), 1);

    let url = &http.requests()[0];
    assert!(url.starts_with("https://ws.audioscrobbler.com/2.0/?method=track.getInfo"));
    assert!(url.contains("api_key=test-key"));
    assert!(url.contains("username=listener"));
    assert!(url.contains("format=json"));
}

#[test_log::test(tokio::test)]
async fn test_play_count_with_latest_scrobble() {
    let http = FakeHttpClient::new()
        .route(&["track.getInfo"], 200, track_info("3"))
        .route(
            &["user.getTrackScrobbles"],
            200,
            json!({"trackscrobbles": {"track": [
                {"name": "Airbag", "date": {"uts": "1700000900"}},
                {"name": "Airbag", "date": {"uts": "1600000000"}}
            ]}}),
        );

    let stats = client(&http)
        .fetch("Radiohead", "Airbag", &credentials())
        .await;

    assert_eq!(stats, ScrobbleStats::new(3, Some(1700000900)));
    assert_eq!(http.count_matching("library.getTracks"), 0);
}

#[test_log::test(tokio::test)]
async fn test_library_fallback_when_track_scrobbles_fail() {
    let http = FakeHttpClient::new()
        .route(&["track.getInfo"], 200, track_info("2"))
        .route(
            &["user.getTrackScrobbles"],
            200,
            json!({"error": 3, "message": "Invalid Method - No method with that name in this package"}),
        )
        .route(
            &["library.getTracks"],
            200,
            json!({"tracks": {"track": [
                {"name": "Let Down", "date": {"uts": "1500000000"}},
                {"name": "airbag", "date": {"uts": "1650000000"}}
            ]}}),
        );

    let stats = client(&http)
        .fetch("Radiohead", "Airbag", &credentials())
        .await;

    assert_eq!(stats, ScrobbleStats::new(2, Some(1650000000)));
    let library_url = http
        .requests()
        .into_iter()
        .find(|u| u.contains("library.getTracks"))
        .unwrap();
    assert!(library_url.contains("limit=1000"));
    assert!(library_url.contains("user=listener"));
}

#[test_log::test(tokio::test)]
async fn test_undated_plays_when_every_lookup_fails() {
    let http = FakeHttpClient::new()
        .route(&["track.getInfo"], 200, track_info("4"))
        .route(&["user.getTrackScrobbles"], 500, json!({}));

    let stats = client(&http)
        .fetch("Radiohead", "Airbag", &credentials())
        .await;

    assert_eq!(stats, ScrobbleStats::new(4, None));
    assert_eq!(http.count_matching("library.getTracks"), 1);
}

#[test_log::test(tokio::test)]
async fn test_empty_scrobble_history_is_not_a_failure() {
    let http = FakeHttpClient::new()
        .route(&["track.getInfo"], 200, track_info("1"))
        .route(
            &["user.getTrackScrobbles"],
            200,
            json!({"trackscrobbles": {"track": []}}),
        );

    let stats = client(&http)
        .fetch("Radiohead", "Airbag", &credentials())
        .await;

    assert_eq!(stats, ScrobbleStats::new(1, None));
    assert_eq!(http.count_matching("library.getTracks"), 0);
}

#[test_log::test(tokio::test)]
async fn test_service_error_payload_degrades_to_unknown() {
    let http = FakeHttpClient::new().route(
        &["track.getInfo"],
        200,
        json!({"error": 10, "message": "Invalid API key - You must be granted a valid key by last.fm"}),
    );

    let stats = client(&http)
        .fetch("Radiohead", "Airbag", &credentials())
        .await;

    assert_eq!(stats.play_count, PlayCount::Unknown);
    assert_eq!(stats.last_played, None);
    assert_eq!(http.request_count(), 1);
}

#[test_log::test(tokio::test)]
async fn test_http_failures_degrade_to_unknown() {
    let http = FakeHttpClient::new().route(&["track.getInfo"], 503, json!({}));
    let stats = client(&http)
        .fetch("Radiohead", "Airbag", &credentials())
        .await;
    assert_eq!(stats, ScrobbleStats::unknown());

    let unreachable = FakeHttpClient::new();
    let stats = client(&unreachable)
        .fetch("Radiohead", "Airbag", &credentials())
        .await;
    assert_eq!(stats, ScrobbleStats::unknown());
    assert_eq!(unreachable.request_count(), 1);
}

#[test_log::test(tokio::test)]
async fn test_query_parameters_are_encoded() {
    let http = FakeHttpClient::new().route(&["track.getInfo"], 200, track_info("0"));
    client(&http)
        .fetch("Simon & Garfunkel", "Mrs. Robinson", &credentials())
        .await;

    let url = &http.requests()[0];
    assert!(url.contains("artist=Simon%20%26%20Garfunkel"));
    assert!(url.contains("track=Mrs.%20Robinson"));
}

#[test_log::test(tokio::test)]
async fn test_requests_are_broadcast() {
    let http = FakeHttpClient::new().route(&["track.getInfo"], 200, track_info("0"));
    let client = client(&http);
    let mut events = client.gateway().subscribe();

    client.fetch("Radiohead", "Airbag", &credentials()).await;

    match events.recv().await.unwrap() {
        ClientEvent::RequestStarted { request } => {
            assert_eq!(request.query_param("method"), Some("track.getInfo"));
        }
        other => panic!("unexpected event {other:?}"),
    }
    match events.recv().await.unwrap() {
        ClientEvent::RequestCompleted { status_code, .. } => assert_eq!(status_code, 200),
        other => panic!("unexpected event {other:?}"),
    }
    assert!(matches!(
        client.gateway().latest_event(),
        Some(ClientEvent::RequestCompleted { .. })
    ));
}

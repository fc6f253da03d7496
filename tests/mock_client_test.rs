#[cfg(feature = "mock")]
mod mock_tests {
    use chrono::Utc;
    use mockall::predicate::*;
    use song_stats::{
        format_stats_line, Credentials, HostAlbum, HostMetadataSource, MockReleaseDateSource,
        MockScrobbleClient, ReleaseDate, ReleaseDateResolver, ReleaseDateSource, ReleaseQuery,
        ScrobbleClient, ScrobbleStats, StatsPipeline, TrackIdentity,
    };

    fn credentials() -> Credentials {
        Credentials::new(Some("key".to_string()), Some("listener".to_string()))
    }

    #[tokio::test]
    async fn test_mock_scrobble_client() {
        let mut mock_client = MockScrobbleClient::new();

        mock_client
            .expect_fetch()
            .withf(|artist, track, _| artist == "Low" && track == "Words")
            .times(1)
            .returning(|_, _, _| ScrobbleStats::new(12, Some(1_700_000_000)));

        let client: &dyn ScrobbleClient = &mock_client;
        let stats = client.fetch("Low", "Words", &credentials()).await;

        assert_eq!(stats, ScrobbleStats::new(12, Some(1_700_000_000)));
    }

    #[tokio::test]
    async fn test_host_date_skips_external_sources() {
        let mut scrobbles = MockScrobbleClient::new();
        scrobbles
            .expect_fetch()
            .times(1)
            .returning(|_, _, _| ScrobbleStats::new(1, None));

        let mut online = MockReleaseDateSource::new();
        online.expect_lookup().times(0);

        let pipeline = StatsPipeline::new(
            Box::new(scrobbles),
            ReleaseDateResolver::new(Box::new(HostMetadataSource), vec![Box::new(online)]),
        );

        let album: HostAlbum =
            serde_json::from_value(serde_json::json!({"date": {"year": 1994}})).unwrap();
        let track = TrackIdentity::new("Low", "Words", "uri:words");
        let stats = pipeline
            .resolve(&track, Some(&album), &credentials())
            .await;

        assert_eq!(stats.release, ReleaseDate::Year(1994));
        assert_eq!(format_stats_line(&stats, Utc::now()), "1 play. Released 1994.");
    }

    #[tokio::test]
    async fn test_external_sources_are_tried_in_order() {
        let mut first = MockReleaseDateSource::new();
        first.expect_lookup().times(1).returning(|_| None);

        let mut second = MockReleaseDateSource::new();
        second
            .expect_lookup()
            .withf(|query| query.artist == "Low" && query.api_key.as_deref() == Some("key"))
            .times(1)
            .returning(|_| Some(ReleaseDate::Year(1994)));

        let mut third = MockReleaseDateSource::new();
        third.expect_lookup().times(0);

        let resolver = ReleaseDateResolver::new(
            Box::new(HostMetadataSource),
            vec![Box::new(first), Box::new(second), Box::new(third)],
        );

        let query = ReleaseQuery::new("Low", "Words").with_api_key(Some("key"));
        assert_eq!(resolver.resolve(&query).await, ReleaseDate::Year(1994));
    }

    #[tokio::test]
    async fn test_mock_release_source_as_trait_object() {
        let mut source = MockReleaseDateSource::new();
        source
            .expect_lookup()
            .with(eq(ReleaseQuery::new("Low", "Words")))
            .times(1)
            .returning(|_| Some(ReleaseDate::Year(1994)));

        let source: &dyn ReleaseDateSource = &source;
        assert_eq!(
            source.lookup(&ReleaseQuery::new("Low", "Words")).await,
            Some(ReleaseDate::Year(1994))
        );
    }
}

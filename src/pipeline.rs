use crate::host::HostAlbum;
use crate::http::HttpGateway;
use crate::release::{ReleaseDateResolver, ReleaseQuery};
use crate::scrobble::{LastFmScrobbleClient, ScrobbleClient};
use crate::types::{Credentials, ReleaseDate, TrackIdentity, TrackStats};

/// Turns a track identity into display-ready statistics.
///
/// The scrobble lookup and the host metadata read run jointly. The external
/// release date services are consulted afterwards, one at a time, and only
/// when the host metadata had no date. Resolution cannot fail: every
/// unavailable piece of data shows up as a degraded value in [`TrackStats`].
///
/// # Examples
///
/// ```rust,no_run
/// use song_stats::{Credentials, HttpGateway, StatsPipeline, TrackIdentity};
///
/// # tokio_test::block_on(async {
/// let gateway = HttpGateway::new(Box::new(http_client::native::NativeClient::new()));
/// let pipeline = StatsPipeline::standard(gateway);
///
/// let track = TrackIdentity::new("Massive Attack", "Teardrop", "spotify:track:67Hna13dNDkZvBpTXRIaOJ");
/// let stats = pipeline.resolve(&track, None, &Credentials::default()).await;
/// println!("{stats:?}");
/// # });
/// ```
pub struct StatsPipeline {
    scrobbles: Box<dyn ScrobbleClient>,
    releases: ReleaseDateResolver,
}

impl StatsPipeline {
    pub fn new(scrobbles: Box<dyn ScrobbleClient>, releases: ReleaseDateResolver) -> Self {
        Self {
            scrobbles,
            releases,
        }
    }

    /// Last.fm for scrobbles; host metadata, Last.fm and MusicBrainz for release dates.
    pub fn standard(gateway: HttpGateway) -> Self {
        Self::new(
            Box::new(LastFmScrobbleClient::new(gateway.clone())),
            ReleaseDateResolver::standard(gateway),
        )
    }

    pub async fn resolve(
        &self,
        identity: &TrackIdentity,
        album: Option<&HostAlbum>,
        credentials: &Credentials,
    ) -> TrackStats {
        log::debug!(
            "Resolving stats for '{}' by '{}' ({})",
            identity.title,
            identity.artist,
            identity.uri
        );

        let query = ReleaseQuery::new(&identity.artist, &identity.title)
            .with_album(album.cloned())
            .with_api_key(credentials.api_key());

        let (scrobble, host_release) = futures::join!(
            self.scrobbles
                .fetch(&identity.artist, &identity.title, credentials),
            self.releases.resolve_host(&query),
        );

        let release = match host_release {
            ReleaseDate::Unknown => {
                log::debug!("No release date from host metadata, trying online sources");
                self.releases.resolve_external(&query).await
            }
            date => date,
        };

        TrackStats { scrobble, release }
    }
}

use crate::http::HttpGateway;
use crate::types::{Credentials, ScrobbleStats};
use crate::{Result, SongStatsError};
use async_trait::async_trait;
use serde::Deserialize;

/// Base URL of the Last.fm web service.
pub const LASTFM_API_URL: &str = "https://ws.audioscrobbler.com/2.0/";

// =============================================================================
// ScrobbleClient trait and implementation
// =============================================================================

/// Source of personal listening statistics for a track.
///
/// Implementations never fail: missing credentials and unreachable services
/// are reported through [`ScrobbleStats::unknown`] and absent timestamps.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait(?Send)]
pub trait ScrobbleClient {
    async fn fetch(&self, artist: &str, track: &str, credentials: &Credentials) -> ScrobbleStats;
}

/// [`ScrobbleClient`] backed by the Last.fm web service.
///
/// The play count comes from `track.getInfo`. When the track has been played,
/// the most recent scrobble is looked up with `user.getTrackScrobbles`; if
/// that method fails the user's per-artist library (`library.getTracks`) is
/// searched for the track instead.
///
/// # Examples
///
/// ```rust,no_run
/// use song_stats::{Credentials, HttpGateway, LastFmScrobbleClient, ScrobbleClient};
///
/// # tokio_test::block_on(async {
/// let gateway = HttpGateway::new(Box::new(http_client::native::NativeClient::new()));
/// let client = LastFmScrobbleClient::new(gateway);
/// let credentials = Credentials::new(Some("api-key".to_string()), Some("listener".to_string()));
///
/// let stats = client.fetch("Radiohead", "Airbag", &credentials).await;
/// println!("{:?}", stats.play_count);
/// # });
/// ```
#[derive(Clone)]
pub struct LastFmScrobbleClient {
    gateway: HttpGateway,
    base_url: String,
}

impl LastFmScrobbleClient {
    pub fn new(gateway: HttpGateway) -> Self {
        Self::with_base_url(gateway, LASTFM_API_URL.to_string())
    }

    /// Create a client talking to a custom Last.fm compatible endpoint.
    pub fn with_base_url(gateway: HttpGateway, base_url: String) -> Self {
        Self { gateway, base_url }
    }

    pub fn gateway(&self) -> &HttpGateway {
        &self.gateway
    }

    async fn track_play_count(
        &self,
        artist: &str,
        track: &str,
        api_key: &str,
        username: &str,
    ) -> Result<u64> {
        let url = format!(
            "{}?method=track.getInfo&api_key={}&artist={}&track={}&username={}&format=json",
            self.base_url,
            urlencoding::encode(api_key),
            urlencoding::encode(artist),
            urlencoding::encode(track),
            urlencoding::encode(username),
        );

        let body = lastfm_get(&self.gateway, &url).await?;
        parse_track_info_play_count(body)
    }

    async fn latest_track_scrobble(
        &self,
        artist: &str,
        track: &str,
        api_key: &str,
        username: &str,
    ) -> Result<Option<i64>> {
        let url = format!(
            "{}?method=user.getTrackScrobbles&api_key={}&user={}&artist={}&track={}&format=json",
            self.base_url,
            urlencoding::encode(api_key),
            urlencoding::encode(username),
            urlencoding::encode(artist),
            urlencoding::encode(track),
        );

        let body = lastfm_get(&self.gateway, &url).await?;
        parse_track_scrobbles(body)
    }

    async fn library_last_played(
        &self,
        artist: &str,
        track: &str,
        api_key: &str,
        username: &str,
    ) -> Result<Option<i64>> {
        let url = format!(
            "{}?method=library.getTracks&api_key={}&user={}&artist={}&limit=1000&format=json",
            self.base_url,
            urlencoding::encode(api_key),
            urlencoding::encode(username),
            urlencoding::encode(artist),
        );

        let body = lastfm_get(&self.gateway, &url).await?;
        parse_library_last_played(body, track)
    }

    async fn last_played(
        &self,
        artist: &str,
        track: &str,
        api_key: &str,
        username: &str,
    ) -> Option<i64> {
        match self
            .latest_track_scrobble(artist, track, api_key, username)
            .await
        {
            Ok(timestamp) => return timestamp,
            Err(e) => {
                log::debug!("Track scrobbles unavailable ({e}), searching the artist library");
            }
        }

        match self
            .library_last_played(artist, track, api_key, username)
            .await
        {
            Ok(timestamp) => timestamp,
            Err(e) => {
                log::warn!("Could not date the last play of '{track}' by '{artist}': {e}");
                None
            }
        }
    }
}

#[async_trait(?Send)]
impl ScrobbleClient for LastFmScrobbleClient {
    async fn fetch(&self, artist: &str, track: &str, credentials: &Credentials) -> ScrobbleStats {
        let Some((api_key, username)) = credentials.pair() else {
            log::debug!(
                "Missing Last.fm credentials - API key: {}, username: {}",
                credentials.api_key().is_some(),
                credentials.username().is_some()
            );
            return ScrobbleStats::unknown();
        };

        let play_count = match self
            .track_play_count(artist, track, api_key, username)
            .await
        {
            Ok(count) => count,
            Err(e) => {
                log::warn!("Error fetching Last.fm play count for '{track}' by '{artist}': {e}");
                return ScrobbleStats::unknown();
            }
        };

        let last_played = if play_count > 0 {
            self.last_played(artist, track, api_key, username).await
        } else {
            None
        };

        log::debug!("'{track}' by '{artist}': {play_count} plays, last played {last_played:?}");
        ScrobbleStats::new(play_count, last_played)
    }
}

/// GET a Last.fm method and reject service-reported error payloads.
pub(crate) async fn lastfm_get(gateway: &HttpGateway, url: &str) -> Result<serde_json::Value> {
    let body = gateway.get_json(url).await?;

    if let Some(code) = body.get("error") {
        let message = body
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("unknown error")
            .to_string();
        return Err(SongStatsError::Api {
            code: code.as_i64().unwrap_or_default(),
            message,
        });
    }

    Ok(body)
}

// =============================================================================
// Response models
// =============================================================================

/// Last.fm encodes most numbers as strings, but not consistently.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum ApiNumber {
    Number(i64),
    Text(String),
}

impl ApiNumber {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ApiNumber::Number(n) => Some(*n),
            ApiNumber::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Last.fm returns a bare object instead of a one-element array.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> From<OneOrMany<T>> for Vec<T> {
    fn from(val: OneOrMany<T>) -> Self {
        match val {
            OneOrMany::Many(vec) => vec,
            OneOrMany::One(single) => vec![single],
        }
    }
}

#[derive(Deserialize)]
pub struct ApiTrackInfoResponse {
    pub track: Option<ApiTrackInfo>,
}

#[derive(Deserialize)]
pub struct ApiTrackInfo {
    pub userplaycount: Option<ApiNumber>,
    pub album: Option<ApiTrackInfoAlbum>,
}

#[derive(Deserialize)]
pub struct ApiTrackInfoAlbum {
    #[serde(rename = "@attr")]
    pub attr: Option<ApiAlbumAttr>,
}

#[derive(Deserialize)]
pub struct ApiAlbumAttr {
    pub releasedate: Option<String>,
}

#[derive(Deserialize)]
pub struct ApiDate {
    pub uts: ApiNumber,
}

#[derive(Deserialize)]
pub struct ApiTrackScrobblesResponse {
    pub trackscrobbles: Option<ApiTrackScrobbles>,
}

#[derive(Deserialize)]
pub struct ApiTrackScrobbles {
    #[serde(alias = "track")]
    pub scrobble: Option<OneOrMany<ApiScrobble>>,
}

#[derive(Deserialize)]
pub struct ApiScrobble {
    pub date: Option<ApiDate>,
}

#[derive(Deserialize)]
pub struct ApiLibraryResponse {
    pub tracks: Option<ApiLibraryTracks>,
}

#[derive(Deserialize)]
pub struct ApiLibraryTracks {
    pub track: Option<OneOrMany<ApiLibraryTrack>>,
}

#[derive(Deserialize)]
pub struct ApiLibraryTrack {
    pub name: String,
    pub date: Option<ApiDate>,
}

fn decode<T: serde::de::DeserializeOwned>(body: serde_json::Value) -> Result<T> {
    serde_json::from_value(body).map_err(|e| SongStatsError::Parse(e.to_string()))
}

/// Read `track.userplaycount`; an absent field means the track was never played.
pub fn parse_track_info_play_count(body: serde_json::Value) -> Result<u64> {
    let response: ApiTrackInfoResponse = decode(body)?;

    let count = response
        .track
        .and_then(|t| t.userplaycount)
        .and_then(|c| c.as_i64())
        .unwrap_or(0);

    Ok(u64::try_from(count).unwrap_or(0))
}

/// Timestamp of the most recent dated scrobble, newest first as Last.fm orders them.
pub fn parse_track_scrobbles(body: serde_json::Value) -> Result<Option<i64>> {
    let response: ApiTrackScrobblesResponse = decode(body)?;

    let scrobbles: Vec<ApiScrobble> = response
        .trackscrobbles
        .and_then(|t| t.scrobble)
        .map(Vec::from)
        .unwrap_or_default();

    Ok(scrobbles
        .iter()
        .find_map(|s| s.date.as_ref().and_then(|d| d.uts.as_i64())))
}

/// Timestamp of `track` in a library listing, matched case-insensitively by name.
pub fn parse_library_last_played(body: serde_json::Value, track: &str) -> Result<Option<i64>> {
    let response: ApiLibraryResponse = decode(body)?;

    let tracks: Vec<ApiLibraryTrack> = response
        .tracks
        .and_then(|t| t.track)
        .map(Vec::from)
        .unwrap_or_default();

    let wanted = track.to_lowercase();
    Ok(tracks
        .iter()
        .find(|t| t.name.to_lowercase() == wanted)
        .and_then(|t| t.date.as_ref())
        .and_then(|d| d.uts.as_i64()))
}

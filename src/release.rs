//! # Release date resolution
//!
//! A release date is looked up from an ordered list of [`ReleaseDateSource`]
//! strategies. The host player's own album metadata is consulted first; the
//! external services (Last.fm track info, then MusicBrainz) are only asked if
//! the host had nothing usable. The first source that produces a date wins,
//! and every source swallows its own failures.

use crate::host::{HostAlbum, HostAlbumDate, HostYear};
use crate::http::HttpGateway;
use crate::scrobble::{lastfm_get, ApiTrackInfoResponse, LASTFM_API_URL};
use crate::types::ReleaseDate;
use crate::{Result, SongStatsError};
use async_trait::async_trait;
use serde::Deserialize;

/// Base URL of the MusicBrainz web service.
pub const MUSICBRAINZ_API_URL: &str = "https://musicbrainz.org/ws/2";

/// Everything a release date source may use to find a date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReleaseQuery {
    pub artist: String,
    pub title: String,
    /// Album metadata embedded in the host's track object
    pub album: Option<HostAlbum>,
    /// Last.fm API key, if the user configured one
    pub api_key: Option<String>,
}

impl ReleaseQuery {
    pub fn new(artist: &str, title: &str) -> Self {
        Self {
            artist: artist.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn with_album(mut self, album: Option<HostAlbum>) -> Self {
        self.album = album;
        self
    }

    pub fn with_api_key(mut self, api_key: Option<&str>) -> Self {
        self.api_key = api_key.map(str::to_string);
        self
    }
}

/// One strategy for finding a track's release date.
///
/// Returns `None` when the source has no usable answer, including when it
/// failed; errors never cross this boundary.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait(?Send)]
pub trait ReleaseDateSource {
    async fn lookup(&self, query: &ReleaseQuery) -> Option<ReleaseDate>;
}

fn known(date: ReleaseDate) -> Option<ReleaseDate> {
    date.is_known().then_some(date)
}

// =============================================================================
// Host metadata
// =============================================================================

/// Reads the release date from the album object the host player embeds in its
/// track data. No I/O is involved.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostMetadataSource;

impl HostMetadataSource {
    /// Check, in order: a full `release_date`, the `date` field (text or
    /// structured with a year), a bare `year`, and finally `release_date`
    /// read according to `release_date_precision`.
    pub fn read(album: &HostAlbum) -> Option<ReleaseDate> {
        if let Some(date) = album.release_date.as_deref().map(ReleaseDate::parse) {
            if matches!(date, ReleaseDate::FullDate(_)) {
                return Some(date);
            }
        }

        match &album.date {
            Some(HostAlbumDate::Text(text)) => {
                if let Some(date) = known(ReleaseDate::parse(text)) {
                    return Some(date);
                }
            }
            Some(HostAlbumDate::Structured { year: Some(year) }) => {
                if let Some(date) = known(ReleaseDate::from_year(*year)) {
                    return Some(date);
                }
            }
            _ => {}
        }

        match &album.year {
            Some(HostYear::Number(year)) => {
                if let Some(date) = known(ReleaseDate::from_year(*year)) {
                    return Some(date);
                }
            }
            Some(HostYear::Text(text)) => {
                if let Some(date) = known(ReleaseDate::parse(text)) {
                    return Some(date);
                }
            }
            None => {}
        }

        let release_date = album.release_date.as_deref()?.trim();
        let date = match album.release_date_precision.as_deref() {
            Some("year") => ReleaseDate::parse(release_date.get(..4)?),
            Some("month") => ReleaseDate::parse(release_date.get(..7)?),
            _ => ReleaseDate::parse(release_date),
        };
        known(date)
    }
}

#[async_trait(?Send)]
impl ReleaseDateSource for HostMetadataSource {
    async fn lookup(&self, query: &ReleaseQuery) -> Option<ReleaseDate> {
        let date = query.album.as_ref().and_then(Self::read);
        log::debug!("Host metadata release date: {date:?}");
        date
    }
}

// =============================================================================
// Last.fm track info
// =============================================================================

/// Reads `track.album.@attr.releasedate` from Last.fm's `track.getInfo`.
///
/// Best effort: skipped when no API key is configured.
#[derive(Clone)]
pub struct LastFmTrackInfoSource {
    gateway: HttpGateway,
    base_url: String,
}

impl LastFmTrackInfoSource {
    pub fn new(gateway: HttpGateway) -> Self {
        Self::with_base_url(gateway, LASTFM_API_URL.to_string())
    }

    pub fn with_base_url(gateway: HttpGateway, base_url: String) -> Self {
        Self { gateway, base_url }
    }

    async fn release_date(&self, query: &ReleaseQuery, api_key: &str) -> Result<ReleaseDate> {
        let url = format!(
            "{}?method=track.getInfo&api_key={}&artist={}&track={}&format=json",
            self.base_url,
            urlencoding::encode(api_key),
            urlencoding::encode(&query.artist),
            urlencoding::encode(&query.title),
        );

        let body = lastfm_get(&self.gateway, &url).await?;
        let response: ApiTrackInfoResponse =
            serde_json::from_value(body).map_err(|e| SongStatsError::Parse(e.to_string()))?;

        Ok(response
            .track
            .and_then(|t| t.album)
            .and_then(|a| a.attr)
            .and_then(|a| a.releasedate)
            .map(|d| ReleaseDate::parse(&d))
            .unwrap_or(ReleaseDate::Unknown))
    }
}

#[async_trait(?Send)]
impl ReleaseDateSource for LastFmTrackInfoSource {
    async fn lookup(&self, query: &ReleaseQuery) -> Option<ReleaseDate> {
        let Some(api_key) = query.api_key.as_deref().filter(|k| !k.trim().is_empty()) else {
            log::debug!("No Last.fm API key, skipping Last.fm release date lookup");
            return None;
        };

        match self.release_date(query, api_key).await {
            Ok(date) => {
                log::debug!("Last.fm release date: {date:?}");
                known(date)
            }
            Err(e) => {
                log::debug!("Last.fm release date lookup failed: {e}");
                None
            }
        }
    }
}

// =============================================================================
// MusicBrainz
// =============================================================================

#[derive(Deserialize)]
pub struct MbRecordingSearch {
    #[serde(default)]
    pub recordings: Vec<MbRecording>,
}

#[derive(Deserialize)]
pub struct MbRecording {
    #[serde(default)]
    pub releases: Vec<MbRelease>,
}

#[derive(Deserialize)]
pub struct MbRelease {
    pub date: Option<String>,
}

fn lucene_phrase(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Searches MusicBrainz for the recording and reads the date of its first release.
#[derive(Clone)]
pub struct MusicBrainzSource {
    gateway: HttpGateway,
    base_url: String,
}

impl MusicBrainzSource {
    pub fn new(gateway: HttpGateway) -> Self {
        Self::with_base_url(gateway, MUSICBRAINZ_API_URL.to_string())
    }

    pub fn with_base_url(gateway: HttpGateway, base_url: String) -> Self {
        Self { gateway, base_url }
    }

    async fn release_date(&self, query: &ReleaseQuery) -> Result<ReleaseDate> {
        let search = format!(
            "artist:\"{}\" AND recording:\"{}\"",
            lucene_phrase(&query.artist),
            lucene_phrase(&query.title)
        );
        let url = format!(
            "{}/recording/?query={}&fmt=json&limit=1",
            self.base_url,
            urlencoding::encode(&search)
        );

        let body = self.gateway.get_json(&url).await?;
        let response: MbRecordingSearch =
            serde_json::from_value(body).map_err(|e| SongStatsError::Parse(e.to_string()))?;

        Ok(response
            .recordings
            .into_iter()
            .next()
            .and_then(|r| r.releases.into_iter().next())
            .and_then(|r| r.date)
            .map(|d| ReleaseDate::parse(&d))
            .unwrap_or(ReleaseDate::Unknown))
    }
}

#[async_trait(?Send)]
impl ReleaseDateSource for MusicBrainzSource {
    async fn lookup(&self, query: &ReleaseQuery) -> Option<ReleaseDate> {
        match self.release_date(query).await {
            Ok(date) => {
                log::debug!("MusicBrainz release date: {date:?}");
                known(date)
            }
            Err(e) => {
                log::debug!("MusicBrainz release date lookup failed: {e}");
                None
            }
        }
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Tries the host source, then each external source in order.
///
/// # Examples
///
/// ```rust,no_run
/// use song_stats::{HttpGateway, ReleaseDateResolver, ReleaseQuery};
///
/// # tokio_test::block_on(async {
/// let gateway = HttpGateway::new(Box::new(http_client::native::NativeClient::new()));
/// let resolver = ReleaseDateResolver::standard(gateway);
///
/// let date = resolver.resolve(&ReleaseQuery::new("Portishead", "Roads")).await;
/// println!("{date:?}");
/// # });
/// ```
pub struct ReleaseDateResolver {
    host: Box<dyn ReleaseDateSource>,
    external: Vec<Box<dyn ReleaseDateSource>>,
}

impl ReleaseDateResolver {
    pub fn new(host: Box<dyn ReleaseDateSource>, external: Vec<Box<dyn ReleaseDateSource>>) -> Self {
        Self { host, external }
    }

    /// Host metadata, then Last.fm track info, then MusicBrainz.
    pub fn standard(gateway: HttpGateway) -> Self {
        Self::new(
            Box::new(HostMetadataSource),
            vec![
                Box::new(LastFmTrackInfoSource::new(gateway.clone())),
                Box::new(MusicBrainzSource::new(gateway)),
            ],
        )
    }

    /// Consult only the host source.
    pub async fn resolve_host(&self, query: &ReleaseQuery) -> ReleaseDate {
        self.host
            .lookup(query)
            .await
            .unwrap_or(ReleaseDate::Unknown)
    }

    /// Consult the external sources in order, stopping at the first answer.
    pub async fn resolve_external(&self, query: &ReleaseQuery) -> ReleaseDate {
        for source in &self.external {
            if let Some(date) = source.lookup(query).await {
                return date;
            }
        }
        ReleaseDate::Unknown
    }

    pub async fn resolve(&self, query: &ReleaseQuery) -> ReleaseDate {
        match self.resolve_host(query).await {
            ReleaseDate::Unknown => self.resolve_external(query).await,
            date => date,
        }
    }
}

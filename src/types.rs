//! Data types for personal listening statistics.
//!
//! This module contains the core data structures used throughout the crate:
//! track identity, scrobble statistics, release dates, the fully resolved
//! per-track result, credentials, and the request event broadcasting types.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tokio::sync::{broadcast, watch};

// ================================================================================================
// TRACK IDENTITY AND RESOLVED STATISTICS
// ================================================================================================

/// Identity of a playback event reported by the host player.
///
/// The `uri` is the key used to detect that the host reported the same track
/// again, in which case no new resolution is started.
///
/// # Examples
///
/// ```rust
/// use song_stats::TrackIdentity;
///
/// let track = TrackIdentity::new("Radiohead", "Paranoid Android", "spotify:track:6LgJvl0Xdtc73RJ1mmpotq");
/// assert_eq!(track.uri, "spotify:track:6LgJvl0Xdtc73RJ1mmpotq");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackIdentity {
    /// The artist name as reported by the host
    pub artist: String,
    /// The track title as reported by the host
    pub title: String,
    /// Opaque host identifier of the track
    pub uri: String,
}

impl TrackIdentity {
    pub fn new(artist: &str, title: &str, uri: &str) -> Self {
        Self {
            artist: artist.to_string(),
            title: title.to_string(),
            uri: uri.to_string(),
        }
    }
}

/// Number of scrobbles the user has for a track.
///
/// `Known(0)` is a confirmed "never played"; `Unknown` means the scrobble
/// service could not be asked, either because credentials are missing or
/// because the request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayCount {
    Unknown,
    Known(u64),
}

impl PlayCount {
    /// The confirmed count, if the service answered.
    pub fn known(&self) -> Option<u64> {
        match self {
            PlayCount::Known(n) => Some(*n),
            PlayCount::Unknown => None,
        }
    }
}

/// Listening statistics for one track as reported by the scrobble service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrobbleStats {
    /// How many times the user scrobbled the track
    pub play_count: PlayCount,
    /// Unix timestamp of the most recent scrobble.
    ///
    /// Absent while `play_count` is positive means plays exist but none of
    /// them could be dated.
    pub last_played: Option<i64>,
}

impl ScrobbleStats {
    /// Statistics for a service that could not be queried.
    pub fn unknown() -> Self {
        Self {
            play_count: PlayCount::Unknown,
            last_played: None,
        }
    }

    pub fn new(play_count: u64, last_played: Option<i64>) -> Self {
        Self {
            play_count: PlayCount::Known(play_count),
            last_played,
        }
    }
}

/// Release date of a track, as precise as the answering source could provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReleaseDate {
    /// Only the release year is known
    Year(i32),
    /// The exact calendar date is known
    FullDate(NaiveDate),
    /// No source produced a usable value
    Unknown,
}

fn year_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{4}$").expect("valid year pattern"))
}

fn year_month_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{4}-\d{2}$").expect("valid year-month pattern"))
}

impl ReleaseDate {
    /// Parse a release date string as returned by the host or a metadata service.
    ///
    /// A four digit string is a [`ReleaseDate::Year`]. ISO dates (`1994-05-17`),
    /// RFC 3339 timestamps, year-month strings (`1994-05`, read as the first of
    /// the month) and Last.fm style dates (`6 Apr 1999, 00:00`) are
    /// [`ReleaseDate::FullDate`]. Anything else is [`ReleaseDate::Unknown`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use song_stats::ReleaseDate;
    /// use chrono::NaiveDate;
    ///
    /// assert_eq!(ReleaseDate::parse("1994"), ReleaseDate::Year(1994));
    /// assert_eq!(
    ///     ReleaseDate::parse("1997-05-21"),
    ///     ReleaseDate::FullDate(NaiveDate::from_ymd_opt(1997, 5, 21).unwrap())
    /// );
    /// assert_eq!(ReleaseDate::parse("someday"), ReleaseDate::Unknown);
    /// ```
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if input.is_empty() {
            return ReleaseDate::Unknown;
        }

        if year_pattern().is_match(input) {
            return input
                .parse()
                .map(ReleaseDate::Year)
                .unwrap_or(ReleaseDate::Unknown);
        }

        if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
            return ReleaseDate::FullDate(date);
        }

        if let Ok(datetime) = DateTime::parse_from_rfc3339(input) {
            return ReleaseDate::FullDate(datetime.date_naive());
        }

        if year_month_pattern().is_match(input) {
            if let Ok(date) = NaiveDate::parse_from_str(&format!("{input}-01"), "%Y-%m-%d") {
                return ReleaseDate::FullDate(date);
            }
        }

        if let Ok(datetime) = NaiveDateTime::parse_from_str(input, "%d %b %Y, %H:%M") {
            return ReleaseDate::FullDate(datetime.date());
        }

        if let Ok(date) = NaiveDate::parse_from_str(input, "%d %b %Y") {
            return ReleaseDate::FullDate(date);
        }

        ReleaseDate::Unknown
    }

    /// Interpret a bare numeric year.
    pub fn from_year(year: i64) -> Self {
        Self::parse(&year.to_string())
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ReleaseDate::Unknown)
    }
}

/// Fully resolved statistics for one track, ready for rendering.
///
/// A value is built fresh for every track change and never mutated; the next
/// track's result simply replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackStats {
    pub scrobble: ScrobbleStats,
    pub release: ReleaseDate,
}

// ================================================================================================
// CREDENTIALS
// ================================================================================================

/// Last.fm credentials used to look up personal listening statistics.
///
/// Both fields may be absent; that is a valid state which degrades the play
/// count to [`PlayCount::Unknown`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(rename = "lastfm-api-key", default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(rename = "lastfm-username", default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl Credentials {
    pub fn new(api_key: Option<String>, username: Option<String>) -> Self {
        Self { api_key, username }
    }

    /// The API key, if one is set and not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    /// The username, if one is set and not blank.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref().filter(|u| !u.trim().is_empty())
    }

    /// Both the API key and the username, when both are present.
    pub fn pair(&self) -> Option<(&str, &str)> {
        Some((self.api_key()?, self.username()?))
    }
}

// ================================================================================================
// EVENT SYSTEM
// ================================================================================================

/// Query parameters whose values never appear in [`RequestInfo`].
pub const REDACTED_PARAMS: &[&str] = &["api_key"];

const REDACTED: &str = "REDACTED";

/// Request information for client events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestInfo {
    /// The HTTP method (GET, POST, etc.)
    pub method: String,
    /// The full URI being requested
    pub uri: String,
    /// Query parameters as key-value pairs
    pub query_params: Vec<(String, String)>,
    /// Path without query parameters
    pub path: String,
}

impl RequestInfo {
    /// Create RequestInfo from a URL string and method
    ///
    /// Values of [`REDACTED_PARAMS`] are replaced in both `uri` and
    /// `query_params`, so events never carry the user's API key.
    pub fn from_url_and_method(url: &str, method: &str) -> Self {
        let (path, query_string) = match url.split_once('?') {
            Some((path, query)) => (path, query),
            None => (url, ""),
        };

        let query_params: Vec<(String, String)> = query_string
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((key, _)) if REDACTED_PARAMS.contains(&key) => {
                    (key.to_string(), REDACTED.to_string())
                }
                Some((key, value)) => (key.to_string(), value.to_string()),
                None => (pair.to_string(), String::new()),
            })
            .collect();

        let uri = if query_params.is_empty() {
            url.to_string()
        } else {
            let query = query_params
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("&");
            format!("{path}?{query}")
        };

        let path = match path
            .strip_prefix("https://")
            .or_else(|| path.strip_prefix("http://"))
        {
            Some(rest) => rest.find('/').map_or("/", |i| &rest[i..]).to_string(),
            None => path.to_string(),
        };

        Self {
            method: method.to_string(),
            uri,
            query_params,
            path,
        }
    }

    /// The value of a query parameter, if present.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query_params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Get a short description of the request for logging.
    ///
    /// The `api_key` parameter is never included.
    pub fn short_description(&self) -> String {
        let mut desc = format!("{} {}", self.method, self.path);
        if let Some(method) = self.query_param("method") {
            desc.push_str(&format!("?method={method}"));
        }
        desc
    }
}

/// Event emitted by the HTTP gateway around every request it issues
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientEvent {
    /// Request started
    RequestStarted {
        /// Request details
        request: RequestInfo,
    },
    /// Request completed with a response
    RequestCompleted {
        /// Request details
        request: RequestInfo,
        /// HTTP status code
        status_code: u16,
        /// Duration of the request in milliseconds
        duration_ms: u64,
    },
    /// Request failed before any response arrived
    RequestFailed {
        /// Request details
        request: RequestInfo,
        /// Transport error description
        error: String,
    },
}

/// Type alias for the broadcast receiver
pub type ClientEventReceiver = broadcast::Receiver<ClientEvent>;

/// Shared event broadcasting state that persists across client clones
#[derive(Debug)]
pub struct SharedEventBroadcaster {
    event_tx: broadcast::Sender<ClientEvent>,
    last_event_tx: watch::Sender<Option<ClientEvent>>,
}

impl SharedEventBroadcaster {
    /// Create a new shared event broadcaster
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(100);
        let (last_event_tx, _) = watch::channel(None);

        Self {
            event_tx,
            last_event_tx,
        }
    }

    /// Broadcast an event to all subscribers
    pub fn broadcast_event(&self, event: ClientEvent) {
        let _ = self.event_tx.send(event.clone());
        self.last_event_tx.send_replace(Some(event));
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> ClientEventReceiver {
        self.event_tx.subscribe()
    }

    /// Get the latest event
    pub fn latest_event(&self) -> Option<ClientEvent> {
        self.last_event_tx.borrow().clone()
    }
}

impl Default for SharedEventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

//! # Host collaborators
//!
//! The widget augments a music player it does not control. This module holds
//! the serde model of the track object the player exposes and the traits a
//! concrete host implements: [`HostPlayer`] for track change notifications,
//! [`HostUi`] for locating the place where statistics are shown, and
//! [`StatsView`] for the mounted statistics node itself.

use crate::types::TrackIdentity;
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The currently playing track as reported by the host player.
///
/// # Examples
///
/// ```rust
/// use song_stats::HostTrack;
///
/// let track: HostTrack = serde_json::from_str(r#"{
///     "uri": "spotify:track:1",
///     "metadata": {"artist_name": "Björk", "title": "Jóga"},
///     "album": {"release_date": "1997-09-22", "release_date_precision": "day"}
/// }"#).unwrap();
///
/// let identity = track.identity().unwrap();
/// assert_eq!(identity.artist, "Björk");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostTrack {
    pub uri: String,
    #[serde(default)]
    pub metadata: HostTrackMetadata,
    #[serde(default)]
    pub album: Option<HostAlbum>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostTrackMetadata {
    #[serde(default)]
    pub artist_name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl HostTrack {
    /// The track identity, if the host supplied a URI, an artist and a title.
    pub fn identity(&self) -> Option<TrackIdentity> {
        if self.uri.is_empty() {
            return None;
        }
        let artist = self.metadata.artist_name.as_deref()?;
        let title = self.metadata.title.as_deref()?;
        Some(TrackIdentity::new(artist, title, &self.uri))
    }
}

/// Album metadata embedded in the host's track object.
///
/// Hosts are inconsistent about which of these fields they fill in; the
/// release date reader checks them in a fixed order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostAlbum {
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub date: Option<HostAlbumDate>,
    #[serde(default)]
    pub year: Option<HostYear>,
    /// `year`, `month` or `day`
    #[serde(default)]
    pub release_date_precision: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HostAlbumDate {
    Text(String),
    Structured {
        #[serde(default)]
        year: Option<i64>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HostYear {
    Number(i64),
    Text(String),
}

/// Source of track change notifications.
#[async_trait(?Send)]
pub trait HostPlayer {
    /// Resolves once the host can report tracks. Called a single time before
    /// any notification is awaited.
    async fn ready(&mut self) -> Result<()>;

    /// The track playing when the host became ready, if any.
    fn current_track(&self) -> Option<HostTrack> {
        None
    }

    /// Wait for the next track change. `None` once the host has shut down.
    async fn next_track_change(&mut self) -> Option<HostTrack>;
}

/// The region of the host UI where the statistics node lives.
pub trait HostUi {
    type View: StatsView;

    /// Create and insert a fresh statistics node, or `None` if the container
    /// it belongs in is not present right now.
    fn mount_stats_view(&self) -> Option<Self::View>;
}

/// A mounted statistics node.
pub trait StatsView {
    fn show_loading(&mut self);

    fn render(&mut self, line: &str);

    /// Detach the node from the host UI.
    fn remove(&mut self);
}

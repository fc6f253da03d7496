pub mod controller;
pub mod credentials;
pub mod error;
pub mod format;
pub mod host;
pub mod http;
pub mod pipeline;
pub mod release;
pub mod scrobble;
pub mod settings;
pub mod types;
pub mod widget;

pub use controller::{run, RenderOutcome, StatsController};
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use error::SongStatsError;
pub use format::{
    format_elapsed, format_play_count, format_release_date, format_stats_line, time_since_last_play,
    LOADING_MESSAGE,
};
pub use host::{HostAlbum, HostPlayer, HostTrack, HostUi, StatsView};
pub use http::HttpGateway;
pub use pipeline::StatsPipeline;
pub use release::{
    HostMetadataSource, LastFmTrackInfoSource, MusicBrainzSource, ReleaseDateResolver,
    ReleaseDateSource, ReleaseQuery,
};
pub use scrobble::{LastFmScrobbleClient, ScrobbleClient};
pub use settings::{register_settings_entry, MenuRegistrar, SettingsEntry, SettingsForm};
pub use types::{
    ClientEvent, ClientEventReceiver, Credentials, PlayCount, ReleaseDate, RequestInfo,
    ScrobbleStats, SharedEventBroadcaster, TrackIdentity, TrackStats,
};
pub use widget::{RenderTicket, StatsWidget, TrackKey};

#[cfg(feature = "mock")]
pub use release::MockReleaseDateSource;
#[cfg(feature = "mock")]
pub use scrobble::MockScrobbleClient;

pub type Result<T> = std::result::Result<T, SongStatsError>;

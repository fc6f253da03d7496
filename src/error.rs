use thiserror::Error;

/// Error types for song-stats operations.
///
/// These errors never escape the stats resolution pipeline: every client
/// converts them into a degraded value (`PlayCount::Unknown`,
/// `ReleaseDate::Unknown`, or an absent timestamp) at its boundary. They are
/// surfaced to callers only by the credential store and the command line tool.
///
/// # Error Handling Examples
///
/// ```rust,no_run
/// use song_stats::{CredentialStore, FileCredentialStore, SongStatsError};
///
/// match FileCredentialStore::default_location() {
///     Ok(store) => println!("Credentials stored at {}", store.path().display()),
///     Err(SongStatsError::Config(msg)) => eprintln!("No config directory: {}", msg),
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum SongStatsError {
    /// HTTP/network related errors.
    ///
    /// This includes connection failures, DNS errors, malformed URLs and
    /// failures while reading a response body.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The remote service answered with a non-success status code.
    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    /// The remote service answered successfully but reported an error in its payload.
    ///
    /// Last.fm reports failures such as an invalid API key or an unknown track
    /// as `{"error": 6, "message": "Track not found"}` with a 200 status.
    #[error("Service error {code}: {message}")]
    Api {
        /// Service specific error code
        code: i64,
        /// Human readable message supplied by the service
        message: String,
    },

    /// Failed to parse a response or a persisted file.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Configuration could not be located or stored.
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system I/O errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

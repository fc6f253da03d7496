pub mod config;
pub mod show;
pub mod utils;
pub mod watch;

use clap::Subcommand;
use utils::EnvCredentialStore;

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve and print the statistics line for one track
    ///
    /// Usage examples:
    /// # Play count, last play and release date for a track
    /// song-stats show --artist "Radiohead" --title "Airbag"
    ///
    /// # Supply the release date the player knows about
    /// song-stats show --artist "Radiohead" --title "Airbag" --release-date 1997-05-21
    ///
    /// # Print the resolved statistics as JSON
    /// song-stats show --artist "Radiohead" --title "Airbag" --json
    Show {
        /// Artist name
        #[arg(long)]
        artist: String,

        /// Track title
        #[arg(long)]
        title: String,

        /// Release date reported by the player (YYYY, YYYY-MM or YYYY-MM-DD)
        #[arg(long)]
        release_date: Option<String>,

        /// Print the resolved statistics as JSON instead of the display line
        #[arg(long)]
        json: bool,
    },

    /// Show or change the stored Last.fm settings
    ///
    /// Blank values are ignored, so either setting can be changed on its own.
    ///
    /// Usage examples:
    /// # Store both settings
    /// song-stats config --api-key 0123456789abcdef --username listener
    ///
    /// # Show what is stored
    /// song-stats config
    Config {
        /// Last.fm API key (get one at https://www.last.fm/api/account/create)
        #[arg(long)]
        api_key: Option<String>,

        /// Last.fm username
        #[arg(long)]
        username: Option<String>,
    },

    /// Follow track changes and print statistics for each new track
    ///
    /// Track changes are read from standard input, one JSON object per line,
    /// in the player's track format:
    /// {"uri": "spotify:track:...", "metadata": {"artist_name": "...", "title": "..."}, "album": {...}}
    Watch,
}

pub async fn execute_command(
    command: Commands,
    store: EnvCredentialStore,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Show {
            artist,
            title,
            release_date,
            json,
        } => show::handle_show_command(&store, &artist, &title, release_date.as_deref(), json).await,

        Commands::Config { api_key, username } => {
            config::handle_config_command(&store, api_key.as_deref(), username.as_deref())
        }

        Commands::Watch => watch::handle_watch_command(store).await,
    }
}

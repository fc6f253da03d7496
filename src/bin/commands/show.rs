use super::utils::standard_pipeline;
use chrono::Utc;
use song_stats::{format_stats_line, CredentialStore, HostAlbum, TrackIdentity};

/// Resolve the statistics for one track and print them
pub async fn handle_show_command(
    store: &dyn CredentialStore,
    artist: &str,
    title: &str,
    release_date: Option<&str>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let credentials = store.get();
    if credentials.pair().is_none() {
        eprintln!("⚠️  Last.fm credentials missing, play count will be unavailable");
        eprintln!("   Run: song-stats config --api-key <KEY> --username <USER>");
    }

    let album = release_date.map(|date| HostAlbum {
        release_date: Some(date.to_string()),
        ..Default::default()
    });

    let identity = TrackIdentity::new(artist, title, &format!("cli:{artist}:{title}"));
    let stats = standard_pipeline()
        .resolve(&identity, album.as_ref(), &credentials)
        .await;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("{}", format_stats_line(&stats, Utc::now()));
    }

    Ok(())
}

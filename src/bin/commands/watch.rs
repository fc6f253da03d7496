use super::utils::{standard_pipeline, EnvCredentialStore};
use async_trait::async_trait;
use song_stats::{HostPlayer, HostTrack, HostUi, StatsController, StatsView};
use std::rc::Rc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Track changes read from standard input, one JSON track object per line.
pub struct StdinHost {
    lines: Lines<BufReader<Stdin>>,
}

impl StdinHost {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

#[async_trait(?Send)]
impl HostPlayer for StdinHost {
    async fn ready(&mut self) -> song_stats::Result<()> {
        Ok(())
    }

    async fn next_track_change(&mut self) -> Option<HostTrack> {
        loop {
            match self.lines.next_line().await {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => match serde_json::from_str(&line) {
                    Ok(track) => return Some(track),
                    Err(e) => log::warn!("Ignoring malformed track change: {e}"),
                },
                Ok(None) => return None,
                Err(e) => {
                    log::warn!("Failed to read track changes: {e}");
                    return None;
                }
            }
        }
    }
}

/// Statistics printed to standard output, one line per rendered track.
pub struct TerminalUi;

pub struct TerminalView;

impl HostUi for TerminalUi {
    type View = TerminalView;

    fn mount_stats_view(&self) -> Option<TerminalView> {
        Some(TerminalView)
    }
}

impl StatsView for TerminalView {
    fn show_loading(&mut self) {
        log::debug!("{}", song_stats::LOADING_MESSAGE);
    }

    fn render(&mut self, line: &str) {
        println!("{line}");
    }

    fn remove(&mut self) {}
}

/// Follow track changes until standard input closes
pub async fn handle_watch_command(
    store: EnvCredentialStore,
) -> Result<(), Box<dyn std::error::Error>> {
    let controller = Rc::new(StatsController::new(
        TerminalUi,
        standard_pipeline(),
        Box::new(store),
    ));

    if controller.credentials().pair().is_none() {
        eprintln!("⚠️  Last.fm credentials missing, play count will be unavailable");
    }

    let local = tokio::task::LocalSet::new();
    local
        .run_until(song_stats::run(StdinHost::new(), controller))
        .await?;

    Ok(())
}

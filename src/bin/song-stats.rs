mod commands;

use clap::Parser;
use commands::{execute_command, Commands};
use std::path::PathBuf;

/// Personal listening statistics for the track you are playing
#[derive(Parser)]
#[command(
    name = "song-stats",
    about = "Personal listening statistics for the track you are playing",
    long_about = None
)]
struct Cli {
    /// Show detailed debug information
    #[arg(long, global = true)]
    verbose: bool,

    /// Read and write credentials at this path instead of the XDG config directory
    #[arg(long, global = true)]
    credentials: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let store = match commands::utils::credential_store(args.credentials) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("❌ Error: {e}");
            eprintln!();
            eprintln!("Pass --credentials <PATH> to choose where settings are stored.");
            std::process::exit(1);
        }
    };

    if let Err(e) = execute_command(args.command, store).await {
        eprintln!("❌ Command failed: {e}");
        std::process::exit(1);
    }

    Ok(())
}

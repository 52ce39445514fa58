//! Wall of Love CLI - post and browse gratitude notes from the terminal

mod cli;
mod commands;
mod error;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use wall_core::realtime::RealtimeFeed;
use wall_core::store::{ChangeFeed, InMemoryNoteStore, NoteStore, SupabaseNoteStore};
use wall_core::BoardConfig;

use crate::cli::{Cli, Commands};
use crate::commands::delete::run_delete;
use crate::commands::list::run_list;
use crate::commands::post::run_post;
use crate::commands::share::{run_share, SystemClipboard};
use crate::commands::watch::run_watch;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.memory {
        let store = InMemoryNoteStore::new();
        return dispatch(cli.command, &store, &store).await;
    }

    let config = BoardConfig::from_env()?;
    tracing::debug!("Using {:?}", config);
    let store = SupabaseNoteStore::new(&config)?;
    let feed = RealtimeFeed::new(&config);
    dispatch(cli.command, &store, &feed).await
}

async fn dispatch<S: NoteStore, F: ChangeFeed>(
    command: Commands,
    store: &S,
    feed: &F,
) -> Result<(), CliError> {
    match command {
        Commands::List { json } => run_list(store, json).await,
        Commands::Post { message } => run_post(store, &message).await,
        Commands::Delete { id } => run_delete(store, &id).await,
        Commands::Share { id } => run_share(store, &id, &SystemClipboard).await,
        Commands::Watch => run_watch(store, feed).await,
    }
}

use chrono::Utc;
use wall_core::store::{ChangeEvent, ChangeFeed, NoteStore};

use crate::commands::common::format_note_line;
use crate::commands::list::run_list;
use crate::error::CliError;

pub async fn run_watch<S: NoteStore, F: ChangeFeed>(store: &S, feed: &F) -> Result<(), CliError> {
    // Subscribe before listing so nothing slips between the two.
    let mut subscription = feed.subscribe();
    run_list(store, false).await?;
    eprintln!("Watching for changes (Ctrl-C to stop)...");

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                break;
            }
            event = subscription.recv() => {
                let Some(event) = event else {
                    tracing::warn!("Change feed closed");
                    break;
                };
                println!("{}", format_change(&event, Utc::now().timestamp_millis()));
            }
        }
    }

    Ok(())
}

pub fn format_change(event: &ChangeEvent, now_ms: i64) -> String {
    match event {
        ChangeEvent::Inserted(note) => format!("+ {}", format_note_line(note, now_ms)),
        ChangeEvent::Deleted(id) => format!("- {id}"),
    }
}

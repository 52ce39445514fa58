use wall_core::models::NewNote;
use wall_core::store::NoteStore;
use wall_core::{Note, NoteColor};

use crate::commands::common::resolve_message;
use crate::error::CliError;

pub async fn run_post<S: NoteStore>(store: &S, message_parts: &[String]) -> Result<(), CliError> {
    let message = resolve_message(message_parts)?;
    let note = post_message(store, &message, NoteColor::random()).await?;

    println!("{}", note.id);
    Ok(())
}

pub async fn post_message<S: NoteStore>(
    store: &S,
    message: &str,
    color: NoteColor,
) -> Result<Note, CliError> {
    let new_note = NewNote::from_input(message, color).ok_or(CliError::EmptyMessage)?;
    let mut created = store.insert(&new_note).await?;
    if created.color.is_none() {
        created.color = Some(new_note.color);
    }
    tracing::debug!("Posted note {} ({})", created.id, new_note.color);
    Ok(created)
}

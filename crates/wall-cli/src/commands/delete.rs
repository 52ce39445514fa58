use wall_core::store::NoteStore;
use wall_core::Note;

use crate::commands::common::{find_note, normalize_note_identifier};
use crate::error::CliError;

pub async fn run_delete<S: NoteStore>(store: &S, id: &str) -> Result<(), CliError> {
    let note = delete_note(store, id).await?;
    println!("{}", note.id);
    Ok(())
}

/// Delete a note that is currently on the board.
pub async fn delete_note<S: NoteStore>(store: &S, id: &str) -> Result<Note, CliError> {
    let id = normalize_note_identifier(id)?;
    let note = find_note(store, &id).await?;
    store.delete(&note.id).await?;
    Ok(note)
}

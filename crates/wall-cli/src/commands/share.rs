use wall_core::board::Clipboard;
use wall_core::store::NoteStore;

use crate::commands::common::{find_note, normalize_note_identifier};
use crate::error::CliError;

/// System clipboard through `arboard`.
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn copy_text(&self, text: &str) -> wall_core::Result<()> {
        let mut clipboard = arboard::Clipboard::new()
            .map_err(|error| wall_core::Error::Clipboard(error.to_string()))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|error| wall_core::Error::Clipboard(error.to_string()))
    }
}

pub async fn run_share<S: NoteStore>(
    store: &S,
    id: &str,
    clipboard: &dyn Clipboard,
) -> Result<(), CliError> {
    let message = share_note(store, id, clipboard).await?;
    println!("Copied! {message}");
    Ok(())
}

/// Copy a note's message; returns the copied text.
pub async fn share_note<S: NoteStore>(
    store: &S,
    id: &str,
    clipboard: &dyn Clipboard,
) -> Result<String, CliError> {
    let id = normalize_note_identifier(id)?;
    let note = find_note(store, &id).await?;
    clipboard
        .copy_text(&note.message)
        .map_err(CliError::CopyFailed)?;
    Ok(note.message)
}

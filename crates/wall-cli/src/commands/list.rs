use wall_core::board::EMPTY_BOARD_MESSAGE;
use wall_core::store::NoteStore;

use crate::commands::common::{format_note_lines, note_to_list_item, NoteListItem};
use crate::error::CliError;

pub async fn run_list<S: NoteStore>(store: &S, as_json: bool) -> Result<(), CliError> {
    let notes = store.list().await?;

    if as_json {
        let json_items = notes
            .iter()
            .map(note_to_list_item)
            .collect::<Vec<NoteListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else if notes.is_empty() {
        println!("{EMPTY_BOARD_MESSAGE}");
    } else {
        for line in format_note_lines(&notes) {
            println!("{line}");
        }
    }

    Ok(())
}

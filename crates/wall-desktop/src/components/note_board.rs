//! Grid of sticky notes

use chrono::Utc;
use dioxus::prelude::*;

use super::StickyNote;
use crate::state::AppState;

#[component]
pub fn NoteBoard() -> Element {
    let state = use_context::<AppState>();
    let snapshot = (state.snapshot)();
    let now_ms = Utc::now().timestamp_millis();

    rsx! {
        if let Some(message) = snapshot.empty_message() {
            div {
                style: "
                    padding: 40px;
                    text-align: center;
                    color: #9ca3af;
                ",
                "{message}"
            }
        } else {
            div {
                class: "note-board",
                style: "
                    display: grid;
                    grid-template-columns: repeat(auto-fill, minmax(200px, 1fr));
                    gap: 20px;
                ",

                for note in snapshot.notes.iter() {
                    StickyNote {
                        key: "{note.id}",
                        note: note.clone(),
                        copied: snapshot.is_copied(&note.id),
                        just_added: snapshot.is_just_added(&note.id),
                        now_ms,
                    }
                }
            }
        }
    }
}

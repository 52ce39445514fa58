//! A single sticky note

use dioxus::prelude::*;
use wall_core::util::format_relative_time;
use wall_core::Note;

use crate::services::{DialogAlerts, SystemClipboard};
use crate::state::AppState;

const ACTION_STYLE: &str = "
    padding: 2px 8px;
    border: 1px solid rgba(0, 0, 0, 0.15);
    border-radius: 4px;
    background: rgba(255, 255, 255, 0.6);
    font-size: 12px;
    cursor: pointer;
";

#[component]
pub fn StickyNote(note: Note, copied: bool, just_added: bool, now_ms: i64) -> Element {
    let state = use_context::<AppState>();
    let background = note.display_color().hex();
    let age = format_relative_time(note.created_at.timestamp_millis(), now_ms);
    let highlight = if just_added {
        "box-shadow: 0 0 0 3px #f472b6; transform: scale(1.03);"
    } else {
        "box-shadow: 0 2px 6px rgba(0, 0, 0, 0.15);"
    };

    let on_share = {
        let mut state = state.clone();
        let id = note.id.clone();
        move |_| {
            state.board.share(&id, &SystemClipboard, &DialogAlerts);
            state.refresh();
        }
    };

    let on_delete = {
        let board = state.board.clone();
        let id = note.id.clone();
        move |_| {
            let board = board.clone();
            let id = id.clone();
            spawn(async move {
                board.delete(&id).await;
            });
        }
    };

    rsx! {
        div {
            class: if just_added { "sticky-note just-added" } else { "sticky-note" },
            style: "
                position: relative;
                min-height: 140px;
                padding: 16px;
                border-radius: 4px;
                background: {background};
                display: flex;
                flex-direction: column;
                justify-content: space-between;
                transition: transform 0.2s, box-shadow 0.2s;
                {highlight}
            ",

            if copied {
                span {
                    style: "
                        position: absolute;
                        top: 8px;
                        right: 8px;
                        padding: 2px 6px;
                        border-radius: 4px;
                        background: #10b981;
                        color: white;
                        font-size: 11px;
                    ",
                    "Copied!"
                }
            }

            p {
                style: "margin: 0; white-space: pre-wrap; word-break: break-word; font-size: 15px;",
                "{note.message}"
            }

            div {
                style: "
                    display: flex;
                    justify-content: space-between;
                    align-items: center;
                    margin-top: 12px;
                ",

                span { style: "font-size: 11px; color: #6b7280;", "{age}" }

                div {
                    style: "display: flex; gap: 6px;",
                    button { style: ACTION_STYLE, onclick: on_share, "Share" }
                    button { style: ACTION_STYLE, onclick: on_delete, "Delete" }
                }
            }
        }
    }
}

//! Main application component

use dioxus::prelude::*;
use wall_core::BoardSnapshot;

use crate::components::{Composer, NoteBoard};
use crate::services::BoardService;
use crate::state::AppState;

/// Root application component
#[component]
pub fn App() -> Element {
    let board = use_hook(BoardService::from_environment);
    let mut snapshot = use_signal(BoardSnapshot::default);

    // Load once, go live, then mirror every published snapshot into the signal.
    // The live session lives in this task and is dropped with the window.
    use_future({
        let board = board.clone();
        move || {
            let board = board.clone();
            async move {
                let mut updates = board.watch();
                board.load().await;
                let _live = board.go_live();
                loop {
                    let current = updates.borrow_and_update().clone();
                    snapshot.set(current);
                    if updates.changed().await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    let is_local = board.is_local();
    use_context_provider(|| AppState { board, snapshot });

    rsx! {
        div {
            class: "app-container",
            style: "
                min-height: 100vh;
                padding: 32px;
                box-sizing: border-box;
                font-family: system-ui, -apple-system, sans-serif;
                background: #fdf2f8;
                color: #1f2937;
            ",

            h1 {
                style: "margin: 0 0 4px 0; font-size: 28px; text-align: center;",
                "Wall of Love"
            }

            if is_local {
                p {
                    style: "
                        margin: 0 0 16px 0;
                        font-size: 12px;
                        text-align: center;
                        color: #6b7280;
                    ",
                    "Not connected to Supabase: notes stay in this window."
                }
            }

            Composer {}
            NoteBoard {}
        }
    }
}

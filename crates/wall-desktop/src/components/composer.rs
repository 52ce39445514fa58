//! Note composer: textarea, character counter, and Post button

use dioxus::prelude::*;
use wall_core::board::PostOutcome;
use wall_core::models::MAX_MESSAGE_CHARS;

use crate::services::BoardService;
use crate::state::AppState;

fn submit(board: BoardService, mut posting: Signal<bool>) {
    if posting() {
        return;
    }
    posting.set(true);
    spawn(async move {
        if let PostOutcome::Posted(note) = board.post().await {
            tracing::debug!("Composer posted {}", note.id);
        }
        posting.set(false);
    });
}

#[component]
pub fn Composer() -> Element {
    let state = use_context::<AppState>();
    let posting = use_signal(|| false);

    let snapshot = (state.snapshot)();
    let draft = snapshot.draft.clone();
    let used = draft.chars().count();
    let disabled = !snapshot.can_post() || posting();

    let on_input = {
        let mut state = state.clone();
        move |evt: FormEvent| {
            state.board.set_draft(&evt.value());
            state.refresh();
        }
    };

    let on_keydown = {
        let board = state.board.clone();
        move |evt: Event<KeyboardData>| {
            // Ctrl/Cmd+Enter posts
            if evt.key() == Key::Enter && (evt.modifiers().meta() || evt.modifiers().ctrl()) {
                submit(board.clone(), posting);
            }
        }
    };

    let on_post = {
        let board = state.board.clone();
        move |_| submit(board.clone(), posting)
    };

    rsx! {
        div {
            class: "composer",
            style: "
                max-width: 560px;
                margin: 0 auto 32px auto;
                display: flex;
                flex-direction: column;
                gap: 8px;
            ",

            textarea {
                style: "
                    width: 100%;
                    min-height: 90px;
                    border: 1px solid #f9a8d4;
                    border-radius: 8px;
                    padding: 12px;
                    font-size: 14px;
                    font-family: inherit;
                    resize: vertical;
                    box-sizing: border-box;
                ",
                value: "{draft}",
                maxlength: "{MAX_MESSAGE_CHARS}",
                placeholder: "Share some love... (Ctrl+Enter to post)",
                oninput: on_input,
                onkeydown: on_keydown,
            }

            div {
                style: "display: flex; justify-content: space-between; align-items: center;",

                span {
                    style: "font-size: 12px; color: #6b7280;",
                    "{used}/{MAX_MESSAGE_CHARS}"
                }

                button {
                    style: "
                        padding: 6px 18px;
                        border: none;
                        border-radius: 6px;
                        background: #ec4899;
                        color: white;
                        font-size: 14px;
                        cursor: pointer;
                    ",
                    disabled,
                    onclick: on_post,
                    "Post"
                }
            }
        }
    }
}

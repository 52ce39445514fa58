//! Application state shared through the Dioxus context.

use dioxus::prelude::*;
use wall_core::BoardSnapshot;

use crate::services::BoardService;

#[derive(Clone)]
pub struct AppState {
    pub board: BoardService,
    /// Latest published board snapshot.
    pub snapshot: Signal<BoardSnapshot>,
}

impl AppState {
    /// Pick up a synchronous board change without waiting for the watch loop.
    pub fn refresh(&mut self) {
        self.snapshot.set(self.board.snapshot());
    }
}

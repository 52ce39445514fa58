//! Board handle shared by the desktop components.

use tokio::sync::watch;
use wall_core::board::{Alerts, Clipboard, PostOutcome, ShareOutcome};
use wall_core::realtime::RealtimeFeed;
use wall_core::store::{InMemoryNoteStore, SupabaseNoteStore};
use wall_core::{Board, BoardConfig, BoardSnapshot, LiveSession, NoteId};

use crate::bootstrap_config::resolve_board_config;

/// The board over whichever store the app could configure.
#[derive(Clone)]
pub enum BoardService {
    Remote {
        board: Board<SupabaseNoteStore>,
        config: BoardConfig,
    },
    /// No Supabase project configured; notes live only in this window.
    Local(Board<InMemoryNoteStore>),
}

impl BoardService {
    pub fn from_environment() -> Self {
        match connect() {
            Ok((store, config)) => {
                tracing::info!("Using Supabase table {}", config.table);
                Self::Remote {
                    board: Board::new(store),
                    config,
                }
            }
            Err(error) => {
                tracing::warn!("{}; using an in-memory board", error);
                Self::local()
            }
        }
    }

    fn local() -> Self {
        Self::Local(Board::new(InMemoryNoteStore::new()))
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        match self {
            Self::Remote { board, .. } => board.snapshot(),
            Self::Local(board) => board.snapshot(),
        }
    }

    pub fn watch(&self) -> watch::Receiver<BoardSnapshot> {
        match self {
            Self::Remote { board, .. } => board.watch(),
            Self::Local(board) => board.watch(),
        }
    }

    pub async fn load(&self) -> bool {
        match self {
            Self::Remote { board, .. } => board.load().await,
            Self::Local(board) => board.load().await,
        }
    }

    /// Subscribe to row changes, unless live updates are switched off.
    pub fn go_live(&self) -> Option<LiveSession> {
        match self {
            Self::Remote { board, config } => config
                .live_updates
                .then(|| board.go_live(&RealtimeFeed::new(config))),
            Self::Local(board) => Some(board.go_live(board.store())),
        }
    }

    pub fn set_draft(&self, text: &str) {
        match self {
            Self::Remote { board, .. } => board.set_draft(text),
            Self::Local(board) => board.set_draft(text),
        }
    }

    pub async fn post(&self) -> PostOutcome {
        match self {
            Self::Remote { board, .. } => board.post().await,
            Self::Local(board) => board.post().await,
        }
    }

    pub async fn delete(&self, id: &NoteId) -> bool {
        match self {
            Self::Remote { board, .. } => board.delete(id).await,
            Self::Local(board) => board.delete(id).await,
        }
    }

    pub fn share(
        &self,
        id: &NoteId,
        clipboard: &dyn Clipboard,
        alerts: &dyn Alerts,
    ) -> ShareOutcome {
        match self {
            Self::Remote { board, .. } => board.share(id, clipboard, alerts),
            Self::Local(board) => board.share(id, clipboard, alerts),
        }
    }
}

fn connect() -> wall_core::Result<(SupabaseNoteStore, BoardConfig)> {
    let config = resolve_board_config()?;
    let store = SupabaseNoteStore::new(&config)?;
    Ok((store, config))
}

//! wall-core - Core library for Wall of Love
//!
//! This crate contains the note model, the Supabase-backed note store, the
//! realtime change feed, and the board controller that reconciles local
//! state with remote changes. The desktop and CLI shells are thin layers on
//! top of [`Board`].

pub mod board;
pub mod config;
pub mod error;
pub mod highlight;
pub mod mirror;
pub mod models;
pub mod realtime;
pub mod store;
pub mod util;

pub use board::{Board, BoardSnapshot, LiveSession};
pub use config::BoardConfig;
pub use error::{Error, Result};
pub use models::{Note, NoteColor, NoteId};

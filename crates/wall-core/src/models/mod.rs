//! Data models for Wall of Love

mod color;
mod note;

pub use color::{NoteColor, PALETTE};
pub use note::{normalize_message, NewNote, Note, NoteId, MAX_MESSAGE_CHARS};

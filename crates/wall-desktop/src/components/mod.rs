//! UI Components

mod composer;
mod note_board;
mod sticky_note;

pub use composer::Composer;
pub use note_board::NoteBoard;
pub use sticky_note::StickyNote;

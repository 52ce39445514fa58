//! Application services
//!
//! Board access and platform integrations.

mod board;
mod clipboard;

pub use board::BoardService;
pub use clipboard::{DialogAlerts, SystemClipboard};

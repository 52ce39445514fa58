pub mod common;
pub mod delete;
pub mod list;
pub mod post;
pub mod share;
pub mod watch;

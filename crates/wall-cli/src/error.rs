use std::io;

use thiserror::Error;
use wall_core::board::COPY_FAILED_MESSAGE;
use wall_core::config::ConfigError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] wall_core::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No message provided")]
    EmptyMessage,
    #[error("Note ID cannot be empty")]
    EmptyNoteId,
    #[error("Note not found: {0}")]
    NoteNotFound(String),
    #[error("{}", COPY_FAILED_MESSAGE)]
    CopyFailed(#[source] wall_core::Error),
}

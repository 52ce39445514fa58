use std::io::{self, IsTerminal, Read};

use chrono::Utc;
use serde::Serialize;
use wall_core::models::normalize_message;
use wall_core::store::NoteStore;
use wall_core::util::format_relative_time;
use wall_core::{Note, NoteId};

use crate::error::CliError;

const PREVIEW_CHARS: usize = 48;

#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub id: String,
    pub message: String,
    pub color: &'static str,
    pub hex: &'static str,
    pub created_at: String,
    pub relative_time: String,
}

pub fn format_note_line(note: &Note, now_ms: i64) -> String {
    let relative_time = format_relative_time(note.created_at.timestamp_millis(), now_ms);
    format!(
        "{:<8}  {:<6}  {:<width$}  {relative_time}",
        note.id.as_str(),
        note.display_color().as_str(),
        note.preview(PREVIEW_CHARS),
        width = PREVIEW_CHARS
    )
}

pub fn format_note_lines(notes: &[Note]) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    notes
        .iter()
        .map(|note| format_note_line(note, now_ms))
        .collect()
}

pub fn note_to_list_item(note: &Note) -> NoteListItem {
    let now_ms = Utc::now().timestamp_millis();
    let color = note.display_color();

    NoteListItem {
        id: note.id.to_string(),
        message: note.message.clone(),
        color: color.as_str(),
        hex: color.hex(),
        created_at: note.created_at.to_rfc3339(),
        relative_time: format_relative_time(note.created_at.timestamp_millis(), now_ms),
    }
}

/// Message from the arguments, falling back to piped stdin.
pub fn resolve_message(message_parts: &[String]) -> Result<String, CliError> {
    if let Some(message) = normalize_message(&message_parts.join(" ")) {
        return Ok(message);
    }

    if let Some(message) = read_piped_stdin()? {
        return Ok(message);
    }

    Err(CliError::EmptyMessage)
}

pub fn normalize_note_identifier(id: &str) -> Result<NoteId, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyNoteId)
    } else {
        Ok(NoteId::new(trimmed))
    }
}

/// Look `id` up in a fresh listing.
pub async fn find_note<S: NoteStore>(store: &S, id: &NoteId) -> Result<Note, CliError> {
    store
        .list()
        .await?
        .into_iter()
        .find(|note| &note.id == id)
        .ok_or_else(|| CliError::NoteNotFound(id.to_string()))
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_message(&buffer))
}

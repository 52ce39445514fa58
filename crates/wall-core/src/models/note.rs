//! Note model

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::color::{deserialize_lenient, NoteColor};
use crate::util::truncate_chars;

/// Longest message a note may carry, in characters.
pub const MAX_MESSAGE_CHARS: usize = 240;

/// Opaque identifier assigned by the remote store.
///
/// The hosted table may key rows by integer or UUID, so the id is kept as
/// text and accepted from either JSON shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for NoteId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Integer(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => Self(text),
            RawId::Integer(number) => Self(number.to_string()),
        })
    }
}

/// A note as stored in the remote table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Store-assigned identifier
    pub id: NoteId,
    /// Trimmed message text
    pub message: String,
    /// Server-assigned creation timestamp
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    /// Palette color; `None` when the row has no (recognized) color
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub color: Option<NoteColor>,
}

impl Note {
    /// Color to render with, if one has been assigned.
    #[must_use]
    pub fn display_color(&self) -> NoteColor {
        self.color.unwrap_or(NoteColor::Yellow)
    }

    /// Single-line preview truncated to `max_chars` characters
    #[must_use]
    pub fn preview(&self, max_chars: usize) -> String {
        let collapsed = self.message.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.chars().count() <= max_chars {
            collapsed
        } else {
            let mut truncated = truncate_chars(&collapsed, max_chars.saturating_sub(3));
            truncated.push_str("...");
            truncated
        }
    }
}

/// Accept RFC 3339 or a `timestamp without time zone` column, read as UTC.
fn deserialize_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&raw, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'")))
}

/// Insert payload for a new note; the store fills `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewNote {
    pub message: String,
    pub color: NoteColor,
}

impl NewNote {
    /// Build an insert payload from raw user input.
    ///
    /// Returns `None` for blank input.
    #[must_use]
    pub fn from_input(input: &str, color: NoteColor) -> Option<Self> {
        normalize_message(input).map(|message| Self { message, color })
    }
}

/// Trim a message and cap it at [`MAX_MESSAGE_CHARS`].
///
/// Whitespace-only input yields `None`.
///
/// # Examples
///
/// ```
/// use wall_core::models::normalize_message;
///
/// assert_eq!(normalize_message("  grateful!  ").as_deref(), Some("grateful!"));
/// assert_eq!(normalize_message(" \n\t "), None);
/// ```
#[must_use]
pub fn normalize_message(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    let capped = truncate_chars(trimmed, MAX_MESSAGE_CHARS);
    Some(capped.trim_end().to_string())
}

//! Sticky-note palette

use std::fmt;
use std::str::FromStr;

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Error;

/// One of the six fixed sticky-note colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteColor {
    Yellow,
    Pink,
    Blue,
    Green,
    Purple,
    Orange,
}

/// Every palette entry, in display order.
pub const PALETTE: [NoteColor; 6] = [
    NoteColor::Yellow,
    NoteColor::Pink,
    NoteColor::Blue,
    NoteColor::Green,
    NoteColor::Purple,
    NoteColor::Orange,
];

impl NoteColor {
    /// Name stored in the `color` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yellow => "yellow",
            Self::Pink => "pink",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Purple => "purple",
            Self::Orange => "orange",
        }
    }

    /// Background color used when rendering the note.
    #[must_use]
    pub const fn hex(self) -> &'static str {
        match self {
            Self::Yellow => "#fef08a",
            Self::Pink => "#fbcfe8",
            Self::Blue => "#bfdbfe",
            Self::Green => "#bbf7d0",
            Self::Purple => "#e9d5ff",
            Self::Orange => "#fed7aa",
        }
    }

    /// Pick a palette entry uniformly at random.
    pub fn random() -> Self {
        Self::random_with(&mut rand::rng())
    }

    /// Pick a palette entry uniformly at random from the given generator.
    pub fn random_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        PALETTE.choose(rng).copied().unwrap_or(Self::Yellow)
    }
}

impl fmt::Display for NoteColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteColor {
    type Err = Error;

    /// Accepts the palette name (any case) or its hex value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_ascii_lowercase();
        PALETTE
            .iter()
            .copied()
            .find(|color| color.as_str() == value || color.hex() == value)
            .ok_or_else(|| Error::InvalidInput(format!("unknown note color '{s}'")))
    }
}

impl Serialize for NoteColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NoteColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Deserialize a nullable color column, treating unknown values as absent.
pub(crate) fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Option<NoteColor>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.parse().ok()))
}

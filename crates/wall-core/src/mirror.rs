//! Client-held ordered copy of the notes table.

use rand::Rng;

use crate::models::{Note, NoteColor, NoteId};

/// Ordered, id-unique list of notes.
///
/// A full load orders by `created_at` descending. Later arrivals are
/// prepended in the order they are observed, whatever their timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalMirror {
    notes: Vec<Note>,
}

impl LocalMirror {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with a full listing.
    ///
    /// Notes without a color get a random palette entry (kept locally only).
    /// Duplicate ids keep their first occurrence.
    pub fn replace_all<R: Rng + ?Sized>(&mut self, mut notes: Vec<Note>, rng: &mut R) {
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut unique: Vec<Note> = Vec::with_capacity(notes.len());
        for mut note in notes {
            if unique.iter().any(|existing| existing.id == note.id) {
                continue;
            }
            if note.color.is_none() {
                note.color = Some(NoteColor::random_with(rng));
            }
            unique.push(note);
        }
        self.notes = unique;
    }

    /// Put `note` first, dropping any existing copy with the same id.
    ///
    /// A note arriving without a color inherits the existing copy's color,
    /// or gets a random one. Returns `true` if a copy was replaced.
    pub fn prepend<R: Rng + ?Sized>(&mut self, mut note: Note, rng: &mut R) -> bool {
        let existing = self
            .notes
            .iter()
            .position(|candidate| candidate.id == note.id)
            .map(|index| self.notes.remove(index));

        if note.color.is_none() {
            note.color = existing
                .as_ref()
                .and_then(|copy| copy.color)
                .or_else(|| Some(NoteColor::random_with(rng)));
        }
        self.notes.insert(0, note);
        existing.is_some()
    }

    /// Remove the note with `id`. Returns `true` if it was present.
    pub fn remove(&mut self, id: &NoteId) -> bool {
        let before = self.notes.len();
        self.notes.retain(|note| &note.id != id);
        self.notes.len() != before
    }

    #[must_use]
    pub fn get(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| &note.id == id)
    }

    #[must_use]
    pub fn first(&self) -> Option<&Note> {
        self.notes.first()
    }

    #[must_use]
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

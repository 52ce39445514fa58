//! Exclusive, self-expiring per-note flags ("copied", "just added").
//!
//! Each flagged note owns an entry holding its expiry timer. Flagging a note
//! cancels every other entry outright, so at most one note is flagged at any
//! instant. Entries carry a generation: a timer that fires after its entry was
//! replaced finds a different generation and does nothing.

use std::collections::HashMap;

use tokio::task::AbortHandle;

use crate::models::NoteId;

#[derive(Debug)]
struct FlashEntry {
    generation: u64,
    timer: Option<AbortHandle>,
}

impl FlashEntry {
    fn cancel(&self) {
        if let Some(timer) = &self.timer {
            timer.abort();
        }
    }
}

/// Map of flagged notes to their scheduled cancellation.
#[derive(Debug, Default)]
pub struct FlashMarker {
    entries: HashMap<NoteId, FlashEntry>,
    next_generation: u64,
}

impl FlashMarker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag `id`, cancelling any other flagged note. Returns the entry's
    /// generation, to be passed back to [`FlashMarker::expire`].
    pub fn begin(&mut self, id: NoteId) -> u64 {
        self.clear();
        self.next_generation += 1;
        let generation = self.next_generation;
        self.entries.insert(
            id,
            FlashEntry {
                generation,
                timer: None,
            },
        );
        generation
    }

    /// Attach the expiry timer for the entry created by [`FlashMarker::begin`].
    ///
    /// If the entry is already gone the timer is aborted immediately.
    pub fn attach_timer(&mut self, id: &NoteId, generation: u64, timer: AbortHandle) {
        match self.entries.get_mut(id) {
            Some(entry) if entry.generation == generation => {
                if let Some(previous) = entry.timer.replace(timer) {
                    previous.abort();
                }
            }
            _ => timer.abort(),
        }
    }

    /// Timer callback: unflag `id` if it still holds `generation`.
    pub fn expire(&mut self, id: &NoteId, generation: u64) -> bool {
        let current = self
            .entries
            .get(id)
            .is_some_and(|entry| entry.generation == generation);
        if current {
            self.entries.remove(id);
        }
        current
    }

    /// Unflag `id` and cancel its timer.
    pub fn cancel(&mut self, id: &NoteId) -> bool {
        self.entries.remove(id).inspect(FlashEntry::cancel).is_some()
    }

    /// Unflag everything and cancel every pending timer.
    pub fn clear(&mut self) {
        for (_, entry) in self.entries.drain() {
            entry.cancel();
        }
    }

    /// The flagged note, if any.
    #[must_use]
    pub fn current(&self) -> Option<&NoteId> {
        self.entries.keys().next()
    }

    #[must_use]
    pub fn is_flagged(&self, id: &NoteId) -> bool {
        self.entries.contains_key(id)
    }
}

impl Drop for FlashMarker {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn id(value: &str) -> NoteId {
        NoteId::new(value)
    }

    #[test]
    fn begin_is_exclusive() {
        let mut marker = FlashMarker::new();
        marker.begin(id("a"));
        marker.begin(id("b"));

        assert!(!marker.is_flagged(&id("a")));
        assert!(marker.is_flagged(&id("b")));
        assert_eq!(marker.current(), Some(&id("b")));
    }

    #[test]
    fn stale_generation_does_not_expire_newer_flag() {
        let mut marker = FlashMarker::new();
        let first = marker.begin(id("a"));
        let second = marker.begin(id("a"));

        assert!(!marker.expire(&id("a"), first));
        assert!(marker.is_flagged(&id("a")));
        assert!(marker.expire(&id("a"), second));
        assert_eq!(marker.current(), None);
    }

    #[tokio::test]
    async fn begin_aborts_previous_timer() {
        let mut marker = FlashMarker::new();
        let generation = marker.begin(id("a"));
        let timer = tokio::spawn(tokio::time::sleep(Duration::from_secs(60)));
        marker.attach_timer(&id("a"), generation, timer.abort_handle());

        marker.begin(id("b"));

        let result = timer.await;
        assert!(result.unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn attach_to_missing_entry_aborts_timer() {
        let mut marker = FlashMarker::new();
        let generation = marker.begin(id("a"));
        marker.cancel(&id("a"));

        let timer = tokio::spawn(tokio::time::sleep(Duration::from_secs(60)));
        marker.attach_timer(&id("a"), generation, timer.abort_handle());

        assert!(timer.await.unwrap_err().is_cancelled());
    }
}

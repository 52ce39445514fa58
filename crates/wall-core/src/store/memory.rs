//! Process-local note store.
//!
//! Behaves like the hosted table (store-assigned ids and timestamps, newest
//! first listing, change broadcast to every subscriber) and lets tests inject
//! failures and inspect the requests it received.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};

use super::{ChangeEvent, ChangeFeed, NoteStore, Subscription, SubscriptionSink};
use crate::models::{NewNote, Note, NoteColor, NoteId};
use crate::{Error, Result};

/// Store operation selector for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    List,
    Insert,
    Delete,
}

/// A request received by the store, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreRequest {
    List,
    Insert(NewNote),
    Delete(NoteId),
}

#[derive(Default)]
struct MemoryState {
    notes: Vec<Note>,
    next_id: u64,
    last_created_at: Option<DateTime<Utc>>,
    subscribers: Vec<SubscriptionSink>,
    failing: Vec<StoreOp>,
    /// `None` unless the store was built with [`InMemoryNoteStore::recording`].
    requests: Option<Vec<StoreRequest>>,
}

impl MemoryState {
    fn check(&mut self, op: StoreOp, request: StoreRequest) -> Result<()> {
        if let Some(requests) = &mut self.requests {
            requests.push(request);
        }
        if self.failing.contains(&op) {
            return Err(Error::Api(format!("injected {op:?} failure (503)")));
        }
        Ok(())
    }

    fn next_row(&mut self, message: String, color: Option<NoteColor>) -> Note {
        self.next_id += 1;
        // Keep timestamps strictly increasing even within one clock tick.
        let now = Utc::now();
        let created_at = match self.last_created_at {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_created_at = Some(created_at);

        Note {
            id: NoteId::new(self.next_id.to_string()),
            message,
            created_at,
            color,
        }
    }

    fn broadcast(&mut self, event: &ChangeEvent) {
        self.subscribers.retain(|sink| sink.send(event.clone()));
    }
}

/// In-memory implementation of [`NoteStore`] and [`ChangeFeed`].
#[derive(Clone, Default)]
pub struct InMemoryNoteStore {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryNoteStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that keeps a log of every request for [`Self::requests`].
    #[must_use]
    pub fn recording() -> Self {
        let store = Self::default();
        store.lock().requests = Some(Vec::new());
        store
    }

    /// Place an existing row in the table without notifying subscribers.
    pub fn seed(&self, note: Note) {
        self.lock().notes.push(note);
    }

    /// Simulate another client inserting a row.
    pub fn insert_remote(&self, message: &str, color: Option<NoteColor>) -> Note {
        let mut state = self.lock();
        let note = state.next_row(message.to_string(), color);
        state.notes.push(note.clone());
        state.broadcast(&ChangeEvent::Inserted(note.clone()));
        note
    }

    /// Simulate another client deleting a row.
    pub fn delete_remote(&self, id: &NoteId) {
        let mut state = self.lock();
        let before = state.notes.len();
        state.notes.retain(|note| &note.id != id);
        if state.notes.len() != before {
            state.broadcast(&ChangeEvent::Deleted(id.clone()));
        }
    }

    /// Make every subsequent `op` fail (or succeed again).
    pub fn set_failing(&self, op: StoreOp, failing: bool) {
        let mut state = self.lock();
        state.failing.retain(|existing| *existing != op);
        if failing {
            state.failing.push(op);
        }
    }

    /// Requests received so far, oldest first.
    ///
    /// Always empty for a store not built with [`Self::recording`].
    pub fn requests(&self) -> Vec<StoreRequest> {
        self.lock().requests.clone().unwrap_or_default()
    }

    /// Current table contents, newest first.
    pub fn rows(&self) -> Vec<Note> {
        let mut notes = self.lock().notes.clone();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        notes
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        let mut state = self.lock();
        state.subscribers.retain(|sink| !sink.is_closed());
        state.subscribers.len()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl NoteStore for InMemoryNoteStore {
    async fn list(&self) -> Result<Vec<Note>> {
        self.lock().check(StoreOp::List, StoreRequest::List)?;
        Ok(self.rows())
    }

    async fn insert(&self, note: &NewNote) -> Result<Note> {
        let mut state = self.lock();
        state.check(StoreOp::Insert, StoreRequest::Insert(note.clone()))?;
        let row = state.next_row(note.message.clone(), Some(note.color));
        state.notes.push(row.clone());
        state.broadcast(&ChangeEvent::Inserted(row.clone()));
        Ok(row)
    }

    async fn delete(&self, id: &NoteId) -> Result<()> {
        let mut state = self.lock();
        state.check(StoreOp::Delete, StoreRequest::Delete(id.clone()))?;
        let before = state.notes.len();
        state.notes.retain(|note| &note.id != id);
        if state.notes.len() != before {
            state.broadcast(&ChangeEvent::Deleted(id.clone()));
        }
        Ok(())
    }
}

impl ChangeFeed for InMemoryNoteStore {
    fn subscribe(&self) -> Subscription {
        let (sink, subscription) = Subscription::channel();
        self.lock().subscribers.push(sink);
        subscription
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn new_note(message: &str) -> NewNote {
        NewNote {
            message: message.to_string(),
            color: NoteColor::Pink,
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_lists_newest_first() {
        let store = InMemoryNoteStore::new();
        let first = store.insert(&new_note("first")).await.unwrap();
        let second = store.insert(&new_note("second")).await.unwrap();

        assert_ne!(first.id, second.id);
        assert!(second.created_at > first.created_at);

        let listed = store.list().await.unwrap();
        assert_eq!(listed, vec![second, first]);
    }

    #[tokio::test]
    async fn injected_failures_are_recorded_and_reported() {
        let store = InMemoryNoteStore::recording();
        store.set_failing(StoreOp::Insert, true);

        assert!(store.insert(&new_note("nope")).await.is_err());
        assert!(store.rows().is_empty());
        assert_eq!(store.requests(), vec![StoreRequest::Insert(new_note("nope"))]);

        store.set_failing(StoreOp::Insert, false);
        assert!(store.insert(&new_note("yes")).await.is_ok());
    }

    #[tokio::test]
    async fn plain_store_keeps_no_request_log() {
        let store = InMemoryNoteStore::new();
        for _ in 0..3 {
            store.list().await.unwrap();
        }
        store.insert(&new_note("hi")).await.unwrap();

        assert!(store.requests().is_empty());
        assert_eq!(store.rows().len(), 1);
    }

    #[tokio::test]
    async fn subscribers_see_inserts_and_deletes() {
        let store = InMemoryNoteStore::new();
        let mut subscription = store.subscribe();

        let row = store.insert(&new_note("hello")).await.unwrap();
        store.delete(&row.id).await.unwrap();
        // absent id: no event
        store.delete(&row.id).await.unwrap();

        assert_eq!(
            subscription.recv().await,
            Some(ChangeEvent::Inserted(row.clone()))
        );
        assert_eq!(subscription.recv().await, Some(ChangeEvent::Deleted(row.id)));
        assert_eq!(store.subscriber_count(), 1);

        drop(subscription);
        assert_eq!(store.subscriber_count(), 0);
    }
}

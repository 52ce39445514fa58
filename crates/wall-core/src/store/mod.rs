//! Remote store contract and its implementations.
//!
//! The board depends only on [`NoteStore`] (list/insert/delete) and, in the
//! live variant, on [`ChangeFeed`] for pushed row changes.

mod memory;
mod supabase;

use std::future::Future;

use tokio::sync::mpsc;

use crate::models::{NewNote, Note, NoteId};
use crate::Result;

pub use memory::{InMemoryNoteStore, StoreOp, StoreRequest};
pub use supabase::SupabaseNoteStore;

/// Create/read/delete over the notes table.
pub trait NoteStore: Send + Sync + 'static {
    /// All notes, newest first.
    fn list(&self) -> impl Future<Output = Result<Vec<Note>>> + Send;

    /// Insert a note and return the canonical stored row.
    fn insert(&self, note: &NewNote) -> impl Future<Output = Result<Note>> + Send;

    /// Delete by id. Deleting an absent id is not an error.
    fn delete(&self, id: &NoteId) -> impl Future<Output = Result<()>> + Send;
}

/// A row-level change pushed by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    Inserted(Note),
    Deleted(NoteId),
}

/// Source of pushed row changes for the notes table.
pub trait ChangeFeed: Send + Sync + 'static {
    /// Start delivering changes. Must be called inside a Tokio runtime.
    fn subscribe(&self) -> Subscription;
}

/// Receiving end of a change feed.
///
/// Dropping the subscription unsubscribes: the producer observes the closed
/// channel and releases its connection.
#[derive(Debug)]
pub struct Subscription {
    events: mpsc::UnboundedReceiver<ChangeEvent>,
}

/// Producing end of a [`Subscription`].
#[derive(Debug, Clone)]
pub struct SubscriptionSink {
    events: mpsc::UnboundedSender<ChangeEvent>,
}

impl Subscription {
    pub fn channel() -> (SubscriptionSink, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (SubscriptionSink { events: tx }, Self { events: rx })
    }

    /// Next change, or `None` once the producer has stopped.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        self.events.recv().await
    }
}

impl SubscriptionSink {
    /// Deliver an event; returns `false` when the subscriber is gone.
    pub fn send(&self, event: ChangeEvent) -> bool {
        self.events.send(event).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.events.is_closed()
    }

    /// Resolves once the subscriber has dropped its [`Subscription`].
    pub async fn closed(&self) {
        self.events.closed().await;
    }
}

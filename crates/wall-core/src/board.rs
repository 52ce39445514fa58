//! Board controller: the note list, composer draft, and transient flags.
//!
//! Every user action goes to the store first; the local mirror changes only
//! from a successful response or a pushed change event. Store failures leave
//! the board untouched and are only logged. State sits behind one mutex that
//! is never held across an `.await`; each change publishes a fresh
//! [`BoardSnapshot`] for the view to render.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::highlight::FlashMarker;
use crate::mirror::LocalMirror;
use crate::models::{NewNote, Note, NoteColor, NoteId, MAX_MESSAGE_CHARS};
use crate::store::{ChangeEvent, ChangeFeed, NoteStore};
use crate::util::truncate_chars;
use crate::Result;

/// How long the "copied" and "just added" flags stay up.
pub const FLASH_DURATION: Duration = Duration::from_millis(1200);

pub const EMPTY_BOARD_MESSAGE: &str = "No posts yet. Be the first to share some love!";
pub const COPY_FAILED_MESSAGE: &str = "Failed to copy!";

/// System clipboard access.
pub trait Clipboard {
    fn copy_text(&self, text: &str) -> Result<()>;
}

/// Blocking, user-visible alert.
pub trait Alerts {
    fn alert(&self, message: &str);
}

/// Immutable view of the board handed to renderers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardSnapshot {
    pub notes: Vec<Note>,
    pub draft: String,
    pub copied: Option<NoteId>,
    pub just_added: Option<NoteId>,
}

impl BoardSnapshot {
    /// Placeholder text to show instead of an empty list.
    #[must_use]
    pub fn empty_message(&self) -> Option<&'static str> {
        self.notes.is_empty().then_some(EMPTY_BOARD_MESSAGE)
    }

    #[must_use]
    pub fn is_copied(&self, id: &NoteId) -> bool {
        self.copied.as_ref() == Some(id)
    }

    #[must_use]
    pub fn is_just_added(&self, id: &NoteId) -> bool {
        self.just_added.as_ref() == Some(id)
    }

    /// Characters the composer still accepts.
    #[must_use]
    pub fn draft_chars_left(&self) -> usize {
        MAX_MESSAGE_CHARS.saturating_sub(self.draft.chars().count())
    }

    /// Whether the Post action would send anything.
    #[must_use]
    pub fn can_post(&self) -> bool {
        !self.draft.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostOutcome {
    /// Blank draft; no request was made.
    Skipped,
    Posted(Note),
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    Copied,
    Failed,
    /// The id is not on the board.
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flash {
    Copied,
    JustAdded,
}

struct BoardState {
    mirror: LocalMirror,
    draft: String,
    copied: FlashMarker,
    just_added: FlashMarker,
    rng: StdRng,
}

impl BoardState {
    fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            notes: self.mirror.notes().to_vec(),
            draft: self.draft.clone(),
            copied: self.copied.current().cloned(),
            just_added: self.just_added.current().cloned(),
        }
    }

    fn marker(&mut self, flash: Flash) -> &mut FlashMarker {
        match flash {
            Flash::Copied => &mut self.copied,
            Flash::JustAdded => &mut self.just_added,
        }
    }

    fn remove_note(&mut self, id: &NoteId) -> bool {
        self.copied.cancel(id);
        self.just_added.cancel(id);
        self.mirror.remove(id)
    }
}

struct Shared<S> {
    store: S,
    state: Mutex<BoardState>,
    snapshots: watch::Sender<BoardSnapshot>,
}

impl<S: NoteStore> Shared<S> {
    fn lock(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &BoardState) {
        self.snapshots.send_replace(state.snapshot());
    }

    fn flash(self: &Arc<Self>, state: &mut BoardState, flash: Flash, id: NoteId) {
        let generation = state.marker(flash).begin(id.clone());
        let weak = Arc::downgrade(self);
        let expiring = id.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(FLASH_DURATION).await;
            if let Some(shared) = weak.upgrade() {
                shared.expire(flash, &expiring, generation);
            }
        });
        state
            .marker(flash)
            .attach_timer(&id, generation, timer.abort_handle());
    }

    fn expire(&self, flash: Flash, id: &NoteId, generation: u64) {
        let mut state = self.lock();
        if state.marker(flash).expire(id, generation) {
            self.publish(&state);
        }
    }

    fn apply_change(self: &Arc<Self>, event: ChangeEvent) {
        let mut state = self.lock();
        match event {
            ChangeEvent::Inserted(note) => {
                let id = note.id.clone();
                let state = &mut *state;
                if state.mirror.prepend(note, &mut state.rng) {
                    tracing::debug!("Pushed insert {} replaced a local copy", id);
                }
                self.flash(state, Flash::JustAdded, id);
            }
            ChangeEvent::Deleted(id) => {
                if !state.remove_note(&id) {
                    return;
                }
            }
        }
        self.publish(&state);
    }

    fn clear_just_added(&self) {
        let mut state = self.lock();
        state.just_added.clear();
        self.publish(&state);
    }
}

/// The notes board over a [`NoteStore`].
///
/// Cheap to clone; clones share the same state.
pub struct Board<S> {
    shared: Arc<Shared<S>>,
}

impl<S> Clone for Board<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: NoteStore> Board<S> {
    pub fn new(store: S) -> Self {
        Self::with_rng(store, StdRng::from_os_rng())
    }

    /// Board whose color choices come from `rng` (reproducible in tests).
    pub fn with_rng(store: S, rng: StdRng) -> Self {
        let state = BoardState {
            mirror: LocalMirror::new(),
            draft: String::new(),
            copied: FlashMarker::new(),
            just_added: FlashMarker::new(),
            rng,
        };
        let (snapshots, _) = watch::channel(state.snapshot());
        Self {
            shared: Arc::new(Shared {
                store,
                state: Mutex::new(state),
                snapshots,
            }),
        }
    }

    pub fn store(&self) -> &S {
        &self.shared.store
    }

    #[must_use]
    pub fn snapshot(&self) -> BoardSnapshot {
        self.shared.lock().snapshot()
    }

    /// Receiver that sees every published snapshot.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<BoardSnapshot> {
        self.shared.snapshots.subscribe()
    }

    /// Fetch every note, newest first, replacing the board contents.
    ///
    /// On failure the board keeps what it had.
    pub async fn load(&self) -> bool {
        match self.shared.store.list().await {
            Ok(notes) => {
                let mut state = self.shared.lock();
                let state = &mut *state;
                state.mirror.replace_all(notes, &mut state.rng);
                tracing::info!("Loaded {} notes", state.mirror.len());
                self.shared.publish(state);
                true
            }
            Err(error) => {
                tracing::warn!("Failed to load notes: {}", error);
                false
            }
        }
    }

    /// Update the composer text, capped at the message length limit.
    pub fn set_draft(&self, text: &str) {
        let mut state = self.shared.lock();
        state.draft = truncate_chars(text, MAX_MESSAGE_CHARS);
        self.shared.publish(&state);
    }

    /// Post the current draft with a fresh random color.
    pub async fn post(&self) -> PostOutcome {
        let new_note = {
            let mut state = self.shared.lock();
            let color = NoteColor::random_with(&mut state.rng);
            NewNote::from_input(&state.draft, color)
        };
        let Some(new_note) = new_note else {
            return PostOutcome::Skipped;
        };

        match self.shared.store.insert(&new_note).await {
            Ok(mut created) => {
                if created.color.is_none() {
                    created.color = Some(new_note.color);
                }
                let mut state = self.shared.lock();
                let state = &mut *state;
                state.mirror.prepend(created.clone(), &mut state.rng);
                state.draft.clear();
                self.shared.publish(state);
                tracing::info!("Posted note {}", created.id);
                PostOutcome::Posted(created)
            }
            Err(error) => {
                tracing::warn!("Failed to post note: {}", error);
                PostOutcome::Failed
            }
        }
    }

    /// Delete a note; it leaves the board only once the store confirms.
    pub async fn delete(&self, id: &NoteId) -> bool {
        match self.shared.store.delete(id).await {
            Ok(()) => {
                let mut state = self.shared.lock();
                if state.remove_note(id) {
                    self.shared.publish(&state);
                }
                tracing::info!("Deleted note {}", id);
                true
            }
            Err(error) => {
                tracing::warn!("Failed to delete note {}: {}", id, error);
                false
            }
        }
    }

    /// Copy a note's message to the clipboard and flag it as copied.
    ///
    /// A clipboard failure raises [`COPY_FAILED_MESSAGE`] through `alerts`
    /// and leaves the flags alone.
    pub fn share(
        &self,
        id: &NoteId,
        clipboard: &dyn Clipboard,
        alerts: &dyn Alerts,
    ) -> ShareOutcome {
        let message = {
            let state = self.shared.lock();
            state.mirror.get(id).map(|note| note.message.clone())
        };
        let Some(message) = message else {
            return ShareOutcome::Missing;
        };

        if let Err(error) = clipboard.copy_text(&message) {
            tracing::warn!("Failed to copy note {}: {}", id, error);
            alerts.alert(COPY_FAILED_MESSAGE);
            return ShareOutcome::Failed;
        }

        let mut state = self.shared.lock();
        self.shared.flash(&mut state, Flash::Copied, id.clone());
        self.shared.publish(&state);
        ShareOutcome::Copied
    }

    /// Apply a pushed row change.
    pub fn apply_change(&self, event: ChangeEvent) {
        self.shared.apply_change(event);
    }

    /// Start consuming `feed`. Changes apply until the session is dropped.
    pub fn go_live<F: ChangeFeed>(&self, feed: &F) -> LiveSession {
        let mut subscription = feed.subscribe();
        let weak: Weak<Shared<S>> = Arc::downgrade(&self.shared);
        let task = tokio::spawn(async move {
            while let Some(event) = subscription.recv().await {
                let Some(shared) = weak.upgrade() else {
                    break;
                };
                shared.apply_change(event);
            }
            tracing::debug!("Change feed ended");
        });

        let weak = Arc::downgrade(&self.shared);
        tracing::info!("Live updates enabled");
        LiveSession {
            task,
            on_close: Some(Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.clear_just_added();
                }
            })),
        }
    }
}

/// Active change-feed subscription of a [`Board`].
///
/// Dropping it unsubscribes and cancels the pending "just added" timer.
pub struct LiveSession {
    task: JoinHandle<()>,
    on_close: Option<Box<dyn FnOnce() + Send>>,
}

impl LiveSession {
    /// Tear the session down now.
    pub fn close(self) {
        drop(self);
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for LiveSession {
    fn drop(&mut self) {
        self.task.abort();
        if let Some(on_close) = self.on_close.take() {
            on_close();
        }
        tracing::info!("Live updates stopped");
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::store::{InMemoryNoteStore, StoreOp, StoreRequest};
    use crate::Error;

    struct FakeClipboard {
        fail: bool,
        copied: RefCell<Vec<String>>,
    }

    impl FakeClipboard {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                copied: RefCell::new(Vec::new()),
            }
        }
    }

    impl Clipboard for FakeClipboard {
        fn copy_text(&self, text: &str) -> Result<()> {
            if self.fail {
                return Err(Error::Clipboard("no display".to_string()));
            }
            self.copied.borrow_mut().push(text.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingAlerts(RefCell<Vec<String>>);

    impl Alerts for RecordingAlerts {
        fn alert(&self, message: &str) {
            self.0.borrow_mut().push(message.to_string());
        }
    }

    fn board() -> Board<InMemoryNoteStore> {
        Board::with_rng(InMemoryNoteStore::recording(), StdRng::seed_from_u64(42))
    }

    fn inserts(store: &InMemoryNoteStore) -> usize {
        store
            .requests()
            .iter()
            .filter(|request| matches!(request, StoreRequest::Insert(_)))
            .count()
    }

    #[tokio::test]
    async fn empty_store_shows_empty_message() {
        let board = board();
        assert!(board.load().await);
        assert_eq!(
            board.snapshot().empty_message(),
            Some("No posts yet. Be the first to share some love!")
        );
    }

    #[tokio::test]
    async fn blank_draft_is_not_posted() {
        let board = board();
        board.set_draft("  ");

        assert_eq!(board.post().await, PostOutcome::Skipped);
        assert_eq!(inserts(board.store()), 0);
        assert_eq!(board.snapshot().draft, "  ");
    }

    #[tokio::test]
    async fn post_trims_clears_draft_and_prepends_returned_row() {
        let board = board();
        board.store().insert_remote("older", Some(NoteColor::Blue));
        board.load().await;
        board.set_draft("  grateful!  ");

        let PostOutcome::Posted(created) = board.post().await else {
            panic!("post should succeed");
        };

        match &board.store().requests()[1] {
            StoreRequest::Insert(sent) => assert_eq!(sent.message, "grateful!"),
            other => panic!("unexpected request {other:?}"),
        }
        let snapshot = board.snapshot();
        assert_eq!(snapshot.draft, "");
        assert_eq!(snapshot.notes.first(), Some(&created));
        assert_eq!(snapshot.notes.len(), 2);
    }

    #[tokio::test]
    async fn failed_post_keeps_draft() {
        let board = board();
        board.store().set_failing(StoreOp::Insert, true);
        board.set_draft("thank you");

        assert_eq!(board.post().await, PostOutcome::Failed);
        let snapshot = board.snapshot();
        assert_eq!(snapshot.draft, "thank you");
        assert!(snapshot.notes.is_empty());
    }

    #[tokio::test]
    async fn draft_is_capped() {
        let board = board();
        board.set_draft(&"x".repeat(MAX_MESSAGE_CHARS + 5));
        let snapshot = board.snapshot();
        assert_eq!(snapshot.draft.chars().count(), MAX_MESSAGE_CHARS);
        assert_eq!(snapshot.draft_chars_left(), 0);
    }

    #[tokio::test]
    async fn load_failure_keeps_existing_notes() {
        let board = board();
        board.store().insert_remote("kept", None);
        assert!(board.load().await);

        board.store().set_failing(StoreOp::List, true);
        assert!(!board.load().await);
        assert_eq!(board.snapshot().notes.len(), 1);
    }

    #[tokio::test]
    async fn load_colors_uncolored_notes() {
        let board = board();
        board.store().insert_remote("a", None);
        board.store().insert_remote("b", Some(NoteColor::Orange));
        board.load().await;

        let snapshot = board.snapshot();
        assert_eq!(snapshot.notes[0].color, Some(NoteColor::Orange));
        assert!(snapshot.notes[1].color.is_some());
    }

    #[tokio::test]
    async fn delete_removes_only_on_success() {
        let board = board();
        let kept = board.store().insert_remote("kept", None);
        let gone = board.store().insert_remote("gone", None);
        board.load().await;

        board.store().set_failing(StoreOp::Delete, true);
        assert!(!board.delete(&kept.id).await);
        assert!(board.snapshot().notes.iter().any(|note| note.id == kept.id));

        board.store().set_failing(StoreOp::Delete, false);
        assert!(board.delete(&gone.id).await);
        assert!(board.snapshot().notes.iter().all(|note| note.id != gone.id));
    }

    #[tokio::test]
    async fn deleting_absent_id_is_a_no_op() {
        let board = board();
        board.store().insert_remote("stay", None);
        board.load().await;
        let before = board.snapshot();

        board.delete(&NoteId::new("missing")).await;
        board.store().set_failing(StoreOp::Delete, true);
        board.delete(&NoteId::new("missing")).await;

        assert_eq!(board.snapshot(), before);
    }

    #[tokio::test]
    async fn share_copies_message_and_flags_note() {
        let board = board();
        let note = board.store().insert_remote("you are great", None);
        board.load().await;
        let clipboard = FakeClipboard::new(false);
        let alerts = RecordingAlerts::default();

        assert_eq!(board.share(&note.id, &clipboard, &alerts), ShareOutcome::Copied);
        assert_eq!(clipboard.copied.borrow().as_slice(), ["you are great"]);
        assert!(board.snapshot().is_copied(&note.id));
        assert!(alerts.0.borrow().is_empty());
    }

    #[tokio::test]
    async fn share_failure_alerts_without_flag_change() {
        let board = board();
        let note = board.store().insert_remote("hi", None);
        board.load().await;
        let alerts = RecordingAlerts::default();

        let outcome = board.share(&note.id, &FakeClipboard::new(true), &alerts);

        assert_eq!(outcome, ShareOutcome::Failed);
        assert_eq!(alerts.0.borrow().as_slice(), ["Failed to copy!"]);
        assert_eq!(board.snapshot().copied, None);
    }

    #[tokio::test]
    async fn share_unknown_id_is_missing() {
        let board = board();
        let alerts = RecordingAlerts::default();
        let outcome = board.share(&NoteId::new("nope"), &FakeClipboard::new(false), &alerts);
        assert_eq!(outcome, ShareOutcome::Missing);
    }

    #[tokio::test(start_paused = true)]
    async fn copied_flag_expires_and_moves_between_notes() {
        let board = board();
        let first = board.store().insert_remote("one", None);
        let second = board.store().insert_remote("two", None);
        board.load().await;
        let clipboard = FakeClipboard::new(false);
        let alerts = RecordingAlerts::default();

        board.share(&first.id, &clipboard, &alerts);
        tokio::time::sleep(Duration::from_millis(600)).await;
        board.share(&second.id, &clipboard, &alerts);
        assert_eq!(board.snapshot().copied, Some(second.id.clone()));

        // first timer was cancelled; the second flag outlives it
        tokio::time::sleep(Duration::from_millis(700)).await;
        assert_eq!(board.snapshot().copied, Some(second.id.clone()));

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(board.snapshot().copied, None);
    }

    #[tokio::test(start_paused = true)]
    async fn pushed_insert_highlights_and_expires() {
        let board = board();
        let remote = board.store().insert_remote("hello from afar", None);

        board.apply_change(ChangeEvent::Inserted(remote.clone()));
        let snapshot = board.snapshot();
        assert_eq!(snapshot.just_added, Some(remote.id.clone()));
        assert_eq!(snapshot.notes.first().map(|note| &note.id), Some(&remote.id));

        tokio::time::sleep(FLASH_DURATION + Duration::from_millis(50)).await;
        assert_eq!(board.snapshot().just_added, None);
    }

    #[tokio::test(start_paused = true)]
    async fn second_insert_takes_over_highlight() {
        let board = board();
        let first = board.store().insert_remote("first", None);
        let second = board.store().insert_remote("second", None);

        board.apply_change(ChangeEvent::Inserted(first.clone()));
        tokio::time::sleep(Duration::from_millis(300)).await;
        board.apply_change(ChangeEvent::Inserted(second.clone()));

        let snapshot = board.snapshot();
        assert_eq!(snapshot.just_added, Some(second.id.clone()));
        assert!(!snapshot.is_just_added(&first.id));
    }

    #[tokio::test]
    async fn pushed_insert_for_present_id_does_not_duplicate() {
        let board = board();
        board.set_draft("thanks team");
        let PostOutcome::Posted(created) = board.post().await else {
            panic!("post should succeed");
        };

        board.apply_change(ChangeEvent::Inserted(created.clone()));

        let snapshot = board.snapshot();
        assert_eq!(snapshot.notes.len(), 1);
        assert_eq!(snapshot.notes[0], created);
    }

    #[tokio::test]
    async fn pushed_delete_removes_note() {
        let board = board();
        let note = board.store().insert_remote("bye", None);
        board.load().await;

        board.apply_change(ChangeEvent::Deleted(note.id.clone()));
        assert!(board.snapshot().notes.is_empty());

        // repeated delete is harmless
        board.apply_change(ChangeEvent::Deleted(note.id));
        assert!(board.snapshot().notes.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn removing_a_note_clears_its_flags() {
        let board = board();
        let own = board.store().insert_remote("mine", None);
        board.load().await;
        let pushed = board.store().insert_remote("theirs", None);
        board.apply_change(ChangeEvent::Inserted(pushed.clone()));
        let clipboard = FakeClipboard::new(false);
        let alerts = RecordingAlerts::default();

        board.share(&own.id, &clipboard, &alerts);
        assert!(board.delete(&own.id).await);
        let snapshot = board.snapshot();
        assert_eq!(snapshot.copied, None);
        assert_eq!(snapshot.just_added, Some(pushed.id.clone()));

        board.share(&pushed.id, &clipboard, &alerts);
        board.apply_change(ChangeEvent::Deleted(pushed.id.clone()));
        let snapshot = board.snapshot();
        assert!(snapshot.notes.is_empty());
        assert_eq!(snapshot.copied, None);
        assert_eq!(snapshot.just_added, None);

        tokio::time::sleep(FLASH_DURATION * 2).await;
        assert_eq!(board.snapshot(), snapshot);
    }

    #[tokio::test]
    async fn live_session_applies_changes_until_dropped() {
        let board = board();
        let mut rx = board.watch();
        let session = board.go_live(board.store());
        assert!(session.is_active());
        assert_eq!(board.store().subscriber_count(), 1);

        let remote = board.store().insert_remote("live!", None);
        rx.changed().await.unwrap();
        assert_eq!(board.snapshot().just_added, Some(remote.id.clone()));

        drop(session);
        assert_eq!(board.snapshot().just_added, None);
        for _ in 0..10 {
            if board.store().subscriber_count() == 0 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(board.store().subscriber_count(), 0);

        board.store().insert_remote("missed", None);
        tokio::task::yield_now().await;
        assert_eq!(board.snapshot().notes.len(), 1);
    }

    #[tokio::test]
    async fn live_session_applies_remote_delete() {
        let board = board();
        let note = board.store().insert_remote("going", None);
        board.load().await;
        let mut rx = board.watch();
        let _session = board.go_live(board.store());

        board.store().delete_remote(&note.id);
        rx.changed().await.unwrap();
        assert!(board.snapshot().notes.is_empty());
    }

    #[tokio::test]
    async fn load_orders_rows_newest_first() {
        let board = board();
        for (id, minute) in [("a", 5), ("b", 30), ("c", 10)] {
            board.store().seed(Note {
                id: NoteId::new(id),
                message: format!("note {id}"),
                created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap(),
                color: None,
            });
        }

        board.load().await;
        let ids: Vec<String> = board
            .snapshot()
            .notes
            .iter()
            .map(|note| note.id.to_string())
            .collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[tokio::test]
    async fn watch_receives_published_snapshots() {
        let board = board();
        let mut rx = board.watch();
        board.set_draft("hi");
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().draft, "hi");
    }
}

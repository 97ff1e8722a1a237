//! The note list: loading, optimistic saves and deletes with rollback.

use crate::{
    note::{Note, text_len},
    option::Limits,
    session::SharedSession,
    storage::{KEY_DRAFT, KEY_NOTES, NotesStorage, StorageError, StorageRecord},
    util::{
        clock::{Clock, LocalClock},
        id::{IdSource, UuidSource},
    },
};
use serde_json::{Map, Value};
use std::rc::Rc;
use tracing::{debug, error, warn};

/// Why a note was not saved. The [`Display`](std::fmt::Display) output is the message shown to
/// the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SaveError {
    /// The trimmed input was empty. Not reported to the user.
    #[error("Note is empty.")]
    Empty,
    #[error("Note is too long. Maximum length is {max} characters.")]
    TooLong { max: usize },
    #[error("Maximum number of notes reached. Delete some notes to save more.")]
    TooMany,
    /// The freshly built note failed validation, e.g. an empty id or an oversized date.
    #[error("Failed to create note. Please try again.")]
    Invalid,
    #[error("{}", storage_failure_message(.0))]
    Storage(StorageError),
}

impl SaveError {
    /// Whether the user should be told about this failure.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, SaveError::Empty)
    }
}

fn storage_failure_message(err: &StorageError) -> &'static str {
    if err.is_quota() {
        "Storage full. Delete some notes to save more."
    } else {
        "Failed to save note. Please try again."
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeleteError {
    #[error("Failed to delete note. Please try again.")]
    Storage(StorageError),
}

/// Outcome of a delete that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deletion {
    /// The note was removed and the removal persisted.
    Removed(Note),
    /// The id was empty or unknown; nothing changed and nothing was written.
    Skipped,
}

/// What [`NoteStore::load`] found in storage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Notes now in the session.
    pub loaded: usize,
    /// Stored entries that failed validation.
    pub dropped: usize,
    /// Valid entries beyond the note limit.
    pub truncated: usize,
    /// Whether a stored draft was unusable and reset to empty.
    pub draft_reset: bool,
}

/// Owns the note list in the shared session and mirrors changes to storage.
///
/// Changes are applied to the session first and then written; a failed write reverts them.
pub struct NoteStore<S> {
    session: SharedSession,
    storage: Rc<S>,
    limits: Limits,
    ids: Box<dyn IdSource>,
    clock: Box<dyn Clock>,
}

impl<S> std::fmt::Debug for NoteStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteStore")
            .field("notes", &self.session.borrow().notes.len())
            .field("limits", &self.limits)
            .finish()
    }
}

impl<S: NotesStorage> NoteStore<S> {
    /// Creates a store using random UUIDs and the local clock for new notes.
    pub fn new(session: SharedSession, storage: Rc<S>, limits: Limits) -> Self {
        Self {
            session,
            storage,
            limits,
            ids: Box::new(UuidSource),
            clock: Box::new(LocalClock),
        }
    }

    /// Replaces the identifier generator.
    pub fn with_id_source(mut self, ids: impl IdSource + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Replaces the timestamp source.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    pub(crate) fn storage(&self) -> &Rc<S> {
        &self.storage
    }

    /// A copy of the current note list.
    pub fn notes(&self) -> Vec<Note> {
        self.session.borrow().notes.clone()
    }

    /// Fills the session from storage, discarding anything malformed.
    ///
    /// Never fails: unreadable storage is logged and treated as empty.
    pub async fn load(&self) -> LoadSummary {
        let items = match self.storage.get(&[KEY_NOTES, KEY_DRAFT]).await {
            Ok(items) => items,
            Err(e) => {
                error!("Failed to load notes: {e}");
                Map::new()
            }
        };

        let entries: &[Value] = match items.get(KEY_NOTES) {
            Some(Value::Array(entries)) => entries.as_slice(),
            _ => &[],
        };
        let valid: Vec<Note> = entries
            .iter()
            .filter_map(|entry| Note::from_candidate(entry, &self.limits))
            .collect();
        let dropped = entries.len() - valid.len();
        let truncated = valid.len().saturating_sub(self.limits.max_total_notes);
        let notes: Vec<Note> = valid.into_iter().take(self.limits.max_total_notes).collect();

        let (draft, draft_reset) = match items.get(KEY_DRAFT) {
            Some(Value::String(draft)) if text_len(draft) <= self.limits.max_draft_length => {
                (draft.clone(), false)
            }
            Some(_) => (String::new(), true),
            None => (String::new(), false),
        };

        let summary = LoadSummary {
            loaded: notes.len(),
            dropped,
            truncated,
            draft_reset,
        };
        debug!(?summary, "Loaded notes");

        let mut session = self.session.borrow_mut();
        session.notes = notes;
        session.draft = draft;
        summary
    }

    /// Validates `input`, inserts the new note at the head of the list and clears the draft.
    ///
    /// Nothing is written until [`PendingSave::commit`] is awaited.
    pub fn begin_save(&self, input: &str) -> Result<PendingSave<'_, S>, SaveError> {
        let content = input.trim();
        if content.is_empty() {
            return Err(SaveError::Empty);
        }
        if text_len(content) > self.limits.max_note_length {
            return Err(SaveError::TooLong {
                max: self.limits.max_note_length,
            });
        }

        let mut session = self.session.borrow_mut();
        if session.notes.len() >= self.limits.max_total_notes {
            return Err(SaveError::TooMany);
        }

        let note = Note {
            id: self.ids.next_id(),
            content: content.to_owned(),
            date: self.clock.now(),
        };
        if !note.is_valid(&self.limits) {
            warn!(id = %note.id, date = %note.date, "Rejected malformed new note");
            return Err(SaveError::Invalid);
        }

        session.notes.insert(0, note.clone());
        session.draft.clear();
        let record = StorageRecord::notes_and_draft(session.notes.clone(), String::new());

        Ok(PendingSave {
            store: self,
            note,
            record,
        })
    }

    /// [`begin_save`](Self::begin_save) followed by [`PendingSave::commit`].
    pub async fn save(&self, input: &str) -> Result<Note, SaveError> {
        self.begin_save(input)?.commit().await
    }

    /// Removes the note with `id` and persists the shorter list, restoring the previous list if
    /// the write fails.
    pub async fn delete(&self, id: &str) -> Result<Deletion, DeleteError> {
        if id.is_empty() {
            warn!("Invalid note ID for deletion: {id:?}");
            return Ok(Deletion::Skipped);
        }

        let (snapshot, removed, record) = {
            let mut session = self.session.borrow_mut();
            let Some(removed) = session.notes.iter().find(|note| note.id == id).cloned() else {
                warn!("Note not found for deletion: {id}");
                return Ok(Deletion::Skipped);
            };
            let snapshot = session.notes.clone();
            session.notes.retain(|note| note.id != id);
            (snapshot, removed, StorageRecord::notes(session.notes.clone()))
        };

        match self.storage.set(&record).await {
            Ok(()) => Ok(Deletion::Removed(removed)),
            Err(e) => {
                error!("Failed to delete note: {e}");
                self.session.borrow_mut().notes = snapshot;
                Err(DeleteError::Storage(e))
            }
        }
    }
}

/// A note inserted into the session but not yet written to storage.
#[must_use = "the note stays unsaved until the pending save is committed"]
pub struct PendingSave<'a, S> {
    store: &'a NoteStore<S>,
    note: Note,
    record: StorageRecord,
}

impl<S: NotesStorage> PendingSave<'_, S> {
    pub fn note(&self) -> &Note {
        &self.note
    }

    /// Writes the list and the cleared draft. On failure the note is taken out of the session
    /// again.
    pub async fn commit(self) -> Result<Note, SaveError> {
        match self.store.storage.set(&self.record).await {
            Ok(()) => Ok(self.note),
            Err(e) => {
                error!("Failed to save note: {e}");
                let mut session = self.store.session.borrow_mut();
                if let Some(index) = session.notes.iter().position(|note| note.id == self.note.id) {
                    session.notes.remove(index);
                }
                Err(SaveError::Storage(e))
            }
        }
    }
}

#[cfg(all(test, not(target_family = "wasm")))]
mod tests {
    use super::*;
    use crate::{session::Session, storage::testing::ScriptedStorage};
    use serde_json::json;
    use std::cell::Cell;

    fn note_json(id: &str) -> Value {
        json!({"id": id, "content": format!("content {id}"), "date": "1/1/2024, 9:00:00 AM"})
    }

    fn note(id: &str) -> Note {
        Note {
            id: id.to_string(),
            content: format!("content {id}"),
            date: "1/1/2024, 9:00:00 AM".to_string(),
        }
    }

    fn store(storage: &Rc<ScriptedStorage>) -> NoteStore<ScriptedStorage> {
        store_with_limits(storage, Limits::default())
    }

    fn store_with_limits(
        storage: &Rc<ScriptedStorage>,
        limits: Limits,
    ) -> NoteStore<ScriptedStorage> {
        let counter = Cell::new(0);
        NoteStore::new(Session::shared(), storage.clone(), limits)
            .with_id_source(move || {
                counter.set(counter.get() + 1);
                format!("new-{}", counter.get())
            })
            .with_clock(|| "2/3/2024, 4:05:06 PM".to_string())
    }

    async fn loaded_store(notes: Vec<Value>) -> (Rc<ScriptedStorage>, NoteStore<ScriptedStorage>) {
        let storage = Rc::new(ScriptedStorage::with_items(json!({ "notes": notes })));
        let store = store(&storage);
        store.load().await;
        (storage, store)
    }

    fn ids(store: &NoteStore<ScriptedStorage>) -> Vec<String> {
        store.notes().into_iter().map(|note| note.id).collect()
    }

    #[tokio::test]
    async fn test_load_filters_invalid_entries_in_order() {
        let storage = Rc::new(ScriptedStorage::with_items(json!({
            "notes": [
                note_json("a"),
                {"id": "", "content": "x", "date": "d"},
                note_json("b"),
                "not a note",
                note_json("c"),
            ],
            "draftNote": "half typed",
        })));
        let store = store(&storage);

        let summary = store.load().await;
        assert_eq!(
            summary,
            LoadSummary {
                loaded: 3,
                dropped: 2,
                truncated: 0,
                draft_reset: false,
            }
        );
        assert_eq!(ids(&store), vec!["a", "b", "c"]);
        assert_eq!(store.session().borrow().draft, "half typed");
        assert!(storage.writes().is_empty());
    }

    #[tokio::test]
    async fn test_load_caps_note_count() {
        let notes = (0..1005).map(|i| note_json(&format!("n{i}"))).collect();
        let (_storage, store) = loaded_store(notes).await;

        let notes = store.notes();
        assert_eq!(notes.len(), 1000);
        assert_eq!(notes[0].id, "n0");
        assert_eq!(notes[999].id, "n999");
    }

    #[tokio::test]
    async fn test_load_handles_missing_and_malformed_values() {
        for items in [
            json!({}),
            json!({"notes": "nope", "draftNote": 7}),
            json!({"notes": {"id": "a"}, "draftNote": null}),
        ] {
            let storage = Rc::new(ScriptedStorage::with_items(items));
            let store = store(&storage);
            store.load().await;
            assert!(store.notes().is_empty());
            assert_eq!(store.session().borrow().draft, "");
        }
    }

    #[tokio::test]
    async fn test_load_resets_oversized_draft() {
        let items = json!({"draftNote": "x".repeat(100_001)});
        let storage = Rc::new(ScriptedStorage::with_items(items));
        let store = store(&storage);
        let summary = store.load().await;
        assert!(summary.draft_reset);
        assert_eq!(store.session().borrow().draft, "");
    }

    #[tokio::test]
    async fn test_load_survives_read_failure() {
        let storage = Rc::new(ScriptedStorage::with_items(json!({"notes": [note_json("a")]})));
        storage.fail_reads(StorageError::Reported("unavailable".to_string()));
        let store = store(&storage);
        let summary = store.load().await;
        assert_eq!(summary, LoadSummary::default());
        assert!(store.notes().is_empty());
    }

    #[tokio::test]
    async fn test_save_inserts_at_head_and_writes_once() {
        let (storage, store) = loaded_store(vec![note_json("old")]).await;
        store.session().borrow_mut().draft = "  fresh note \n".to_string();

        let saved = store.save("  fresh note \n").await.unwrap();
        assert_eq!(
            saved,
            Note {
                id: "new-1".to_string(),
                content: "fresh note".to_string(),
                date: "2/3/2024, 4:05:06 PM".to_string(),
            }
        );
        assert_eq!(ids(&store), vec!["new-1", "old"]);
        assert_eq!(store.session().borrow().draft, "");

        let writes = storage.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].notes.as_deref(), Some(store.notes().as_slice()));
        assert_eq!(writes[0].draft_note.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_begin_save_applies_before_write() {
        let (storage, store) = loaded_store(Vec::new()).await;
        let pending = store.begin_save("draft").unwrap();
        assert_eq!(pending.note().id, "new-1");
        assert_eq!(ids(&store), vec!["new-1"]);
        assert!(storage.writes().is_empty());

        pending.commit().await.unwrap();
        assert_eq!(storage.writes().len(), 1);
    }

    #[tokio::test]
    async fn test_save_rejects_empty_input_silently() {
        let (storage, store) = loaded_store(Vec::new()).await;
        let err = store.save("   \n\t").await.unwrap_err();
        assert_eq!(err, SaveError::Empty);
        assert!(!err.is_user_visible());
        assert!(store.notes().is_empty());
        assert!(storage.writes().is_empty());
    }

    #[tokio::test]
    async fn test_save_rejects_oversized_note() {
        let (storage, store) = loaded_store(vec![note_json("a")]).await;
        let err = store.save(&"x".repeat(100_001)).await.unwrap_err();
        assert_eq!(err, SaveError::TooLong { max: 100_000 });
        assert_eq!(
            err.to_string(),
            "Note is too long. Maximum length is 100000 characters."
        );
        assert_eq!(ids(&store), vec!["a"]);
        assert!(storage.writes().is_empty());

        store.save(&"x".repeat(100_000)).await.unwrap();
        assert_eq!(store.notes().len(), 2);
    }

    #[tokio::test]
    async fn test_save_measures_emoji_in_utf16_units() {
        let (storage, store) = loaded_store(Vec::new()).await;
        let err = store.save(&"😀".repeat(50_001)).await.unwrap_err();
        assert_eq!(err, SaveError::TooLong { max: 100_000 });
        assert!(storage.writes().is_empty());

        let note = store.save(&"😀".repeat(50_000)).await.unwrap();
        assert_eq!(note.content.encode_utf16().count(), 100_000);
    }

    #[tokio::test]
    async fn test_save_rejects_when_full() {
        let notes = (0..1000).map(|i| note_json(&format!("n{i}"))).collect();
        let (storage, store) = loaded_store(notes).await;

        let err = store.save("one more").await.unwrap_err();
        assert_eq!(err, SaveError::TooMany);
        assert!(err.to_string().contains("Maximum number of notes"));
        assert_eq!(store.notes().len(), 1000);
        assert_eq!(store.notes()[0].id, "n0");
        assert!(storage.writes().is_empty());
    }

    #[tokio::test]
    async fn test_save_rejects_invalid_generated_note() {
        let storage = Rc::new(ScriptedStorage::new());
        let store = NoteStore::new(Session::shared(), storage.clone(), Limits::default())
            .with_id_source(String::new)
            .with_clock(|| "d".to_string());
        store.session().borrow_mut().draft = "keep".to_string();

        assert_eq!(store.save("text").await.unwrap_err(), SaveError::Invalid);
        assert!(store.notes().is_empty());
        assert_eq!(store.session().borrow().draft, "keep");
        assert!(storage.writes().is_empty());
    }

    #[tokio::test]
    async fn test_failed_save_rolls_back() {
        let (storage, store) = loaded_store(vec![note_json("a"), note_json("b")]).await;
        storage.fail_next_write(StorageError::Reported("IO error".to_string()));

        let err = store.save("lost").await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to save note. Please try again.");
        assert_eq!(ids(&store), vec!["a", "b"]);
        assert_eq!(storage.writes().len(), 1);
    }

    #[tokio::test]
    async fn test_thrown_failure_uses_generic_message() {
        let (storage, store) = loaded_store(vec![note_json("a")]).await;
        storage.fail_next_write(StorageError::Thrown(
            "Extension context invalidated.".to_string(),
        ));

        let err = store.save("lost").await.unwrap_err();
        assert!(matches!(err, SaveError::Storage(StorageError::Thrown(_))));
        assert_eq!(err.to_string(), "Failed to save note. Please try again.");
        assert_eq!(ids(&store), vec!["a"]);
    }

    #[tokio::test]
    async fn test_quota_failure_message() {
        let (storage, store) = loaded_store(Vec::new()).await;
        storage.fail_next_write(StorageError::Thrown(
            "Resource::kQuotaBytes quota exceeded".to_string(),
        ));

        let err = store.save("big").await.unwrap_err();
        assert_eq!(err.to_string(), "Storage full. Delete some notes to save more.");
        assert!(store.notes().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_matching_note() {
        let (storage, store) =
            loaded_store(vec![note_json("a"), note_json("b"), note_json("c")]).await;

        let deletion = store.delete("b").await.unwrap();
        assert_eq!(deletion, Deletion::Removed(note("b")));
        assert_eq!(ids(&store), vec!["a", "c"]);

        let writes = storage.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0], StorageRecord::notes(vec![note("a"), note("c")]));
    }

    #[tokio::test]
    async fn test_delete_unknown_or_empty_id_is_noop() {
        let (storage, store) = loaded_store(vec![note_json("a")]).await;

        assert_eq!(store.delete("zzz").await.unwrap(), Deletion::Skipped);
        assert_eq!(store.delete("").await.unwrap(), Deletion::Skipped);
        assert_eq!(ids(&store), vec!["a"]);
        assert!(storage.writes().is_empty());
    }

    #[tokio::test]
    async fn test_failed_delete_restores_list() {
        let (storage, store) =
            loaded_store(vec![note_json("a"), note_json("b"), note_json("c")]).await;
        let before = store.notes();
        storage.fail_next_write(StorageError::Reported("IO error".to_string()));

        let err = store.delete("b").await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to delete note. Please try again.");
        assert_eq!(store.notes(), before);
    }

    #[tokio::test]
    async fn test_save_then_delete_round_trip() {
        let (storage, store) = loaded_store(Vec::new()).await;
        let saved = store.save("short lived").await.unwrap();
        store.delete(&saved.id).await.unwrap();
        assert!(store.notes().is_empty());

        let reloaded = store_with_limits(&storage, Limits::default());
        reloaded.load().await;
        assert!(reloaded.notes().is_empty());
    }
}

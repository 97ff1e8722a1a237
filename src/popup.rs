//! The popup controller: routes UI events to the note store and draft manager and turns their
//! results into view updates.

use crate::{
    draft::DraftManager,
    note::{Note, text_len},
    option::PopupOptions,
    session::Session,
    storage::NotesStorage,
    store::{DeleteError, Deletion, LoadSummary, NoteStore, SaveError},
    view::{Notification, NoteListView, Tab, TabError, render_notes},
};
use std::rc::Rc;
use tracing::{debug, warn};

/// The UI the popup drives. Implemented over the DOM in the browser.
pub trait Surface {
    /// Current contents of the note input.
    fn input_text(&self) -> String;
    fn set_input_text(&self, text: &str);
    /// Updates the visible character counter.
    fn set_char_count(&self, count: usize);
    /// Replaces the saved-notes list.
    fn render_notes(&self, view: &NoteListView);
    /// Shows a transient error message.
    fn notify(&self, notification: Notification);
    /// Activates `tab` and its panel. Fails if the panel does not exist.
    fn switch_tab(&self, tab: Tab) -> Result<(), TabError>;
}

/// Returns `true` for the Ctrl+Enter / Cmd+Enter save shortcut.
pub fn is_save_shortcut(key: &str, ctrl: bool, meta: bool) -> bool {
    (ctrl || meta) && key == "Enter"
}

pub struct Popup<S, U> {
    store: NoteStore<S>,
    draft: DraftManager<S>,
    surface: U,
    options: PopupOptions,
}

impl<S, U> std::fmt::Debug for Popup<S, U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Popup")
            .field("store", &self.store)
            .field("draft", &self.draft)
            .field("options", &self.options)
            .finish()
    }
}

impl<S: NotesStorage + 'static, U: Surface> Popup<S, U> {
    /// Creates a popup over `storage` and `surface`. Call [`start`](Self::start) before use.
    pub fn new(storage: S, surface: U, options: PopupOptions) -> Self {
        let session = Session::shared();
        let store = NoteStore::new(session, Rc::new(storage), options.limits());
        Self::with_store(store, surface, options)
    }

    /// Creates a popup around an existing store, sharing its session and storage.
    pub fn with_store(store: NoteStore<S>, surface: U, options: PopupOptions) -> Self {
        let draft = DraftManager::new(
            store.session().clone(),
            store.storage().clone(),
            options.limits(),
            options.draft_debounce(),
        );
        Self {
            store,
            draft,
            surface,
            options,
        }
    }

    pub fn store(&self) -> &NoteStore<S> {
        &self.store
    }

    pub fn surface(&self) -> &U {
        &self.surface
    }

    /// Loads notes and the draft, restores the draft into the input and renders the list.
    pub async fn start(&self) -> LoadSummary {
        let summary = self.store.load().await;
        let draft = self.store.session().borrow().draft.clone();
        self.surface.set_input_text(&draft);
        self.surface.set_char_count(text_len(&draft));
        self.render();
        summary
    }

    /// Handles an input event on the note input.
    pub fn handle_input(&self) {
        let update = self.draft.on_input(&self.surface.input_text());
        if update.truncated {
            self.surface.set_input_text(&update.text);
        }
        self.surface.set_char_count(update.length);
    }

    /// Saves the input as a new note.
    ///
    /// The input is cleared as soon as the note is accepted, before storage confirms it.
    pub async fn save(&self) -> Result<Note, SaveError> {
        let pending = match self.store.begin_save(&self.surface.input_text()) {
            Ok(pending) => pending,
            Err(e) => {
                if e.is_user_visible() {
                    self.notify(e.to_string());
                }
                return Err(e);
            }
        };
        self.surface.set_input_text("");
        self.surface.set_char_count(0);

        match pending.commit().await {
            Ok(note) => {
                debug!(id = %note.id, "Saved note");
                self.render();
                // Best effort: a missing panel leaves the current view in place.
                if let Err(e) = self.surface.switch_tab(Tab::SavedNotes) {
                    debug!("Could not show saved notes: {e}");
                }
                Ok(note)
            }
            Err(e) => {
                self.notify(e.to_string());
                Err(e)
            }
        }
    }

    /// Deletes the note with `id` and re-renders, also after a failed delete was rolled back.
    pub async fn delete(&self, id: &str) -> Result<Deletion, DeleteError> {
        match self.store.delete(id).await {
            Ok(Deletion::Removed(note)) => {
                debug!(id = %note.id, "Deleted note");
                self.render();
                Ok(Deletion::Removed(note))
            }
            Ok(Deletion::Skipped) => Ok(Deletion::Skipped),
            Err(e) => {
                self.notify(e.to_string());
                self.render();
                Err(e)
            }
        }
    }

    /// Switches to the tab named by a `data-tab` value. Bad targets are logged and ignored.
    pub fn select_tab(&self, target: &str) -> Result<Tab, TabError> {
        let result = target
            .parse::<Tab>()
            .and_then(|tab| self.surface.switch_tab(tab).map(|()| tab));
        if let Err(e) = &result {
            warn!("{e}");
        }
        result
    }

    /// Re-renders the note list from the session.
    pub fn render(&self) {
        let view = render_notes(&self.store.session().borrow().notes);
        self.surface.render_notes(&view);
    }

    fn notify(&self, message: String) {
        self.surface.notify(Notification {
            message,
            visible_for: self.options.notification_visible(),
            fade_for: self.options.notification_fade(),
        });
    }
}

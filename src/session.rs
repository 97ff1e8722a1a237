use crate::note::Note;
use std::{cell::RefCell, rc::Rc};

/// The popup's writable state: the note list, most recent first, and the unsaved draft.
///
/// Filled once by [`NoteStore::load`](crate::store::NoteStore::load). Storage mirrors it but is
/// only read back at load time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub notes: Vec<Note>,
    pub draft: String,
}

/// Session shared by the note store, the draft manager and the popup.
///
/// Borrows must never be held across an `.await`.
pub type SharedSession = Rc<RefCell<Session>>;

impl Session {
    pub fn shared() -> SharedSession {
        Rc::new(RefCell::new(Session::default()))
    }
}

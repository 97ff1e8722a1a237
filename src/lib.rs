//! A quick-notes browser extension popup.
//!
//! The user types into a single input whose text is kept as a draft and written to storage after a
//! short pause. Saving turns the input into a [`Note`] at the head of the list, and notes can be
//! deleted from the saved-notes view. Saves and deletes are applied to the in-memory list at once
//! and rolled back if storage reports a failure.
//!
//! The logic is independent of the browser: [`Popup`] drives any [`Surface`] over any
//! [`NotesStorage`]. In WebAssembly builds, `dom::run_popup` wires it to the popup document and
//! `chrome.storage.local`.
//!
//! # Usage
//! ```no_run
//! use popup_notes::{
//!     MemoryStorage, Note, NoteListView, Notification, Popup, PopupOptions, Surface, Tab,
//!     TabError,
//! };
//!
//! struct Headless;
//!
//! impl Surface for Headless {
//!     fn input_text(&self) -> String {
//!         "Buy milk".to_string()
//!     }
//!     fn set_input_text(&self, _text: &str) {}
//!     fn set_char_count(&self, _count: usize) {}
//!     fn render_notes(&self, _view: &NoteListView) {}
//!     fn notify(&self, notification: Notification) {
//!         eprintln!("{}", notification.message);
//!     }
//!     fn switch_tab(&self, _tab: Tab) -> Result<(), TabError> {
//!         Ok(())
//!     }
//! }
//!
//! # async fn run() {
//! let popup = Popup::new(MemoryStorage::new(), Headless, PopupOptions::default());
//! popup.start().await;
//! let note: Note = popup.save().await.unwrap();
//! assert_eq!(note.content, "Buy milk");
//! # }
//! ```

#[cfg(target_family = "wasm")]
pub mod dom;
pub mod draft;
pub mod note;
pub mod option;
pub mod popup;
pub mod session;
pub mod storage;
pub mod store;
pub mod util;
pub mod view;

pub use draft::{DraftManager, DraftUpdate};
pub use note::{Note, is_valid_note};
pub use option::{Limits, PopupOptions};
pub use popup::{Popup, Surface};
pub use session::{Session, SharedSession};
pub use storage::{MemoryStorage, NotesStorage, StorageError, StorageRecord};
pub use store::{DeleteError, Deletion, LoadSummary, NoteStore, SaveError};
pub use view::{Notification, NoteListView, Tab, TabError, render_notes};

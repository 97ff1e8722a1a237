//! Debounced persistence of the unsaved draft.

use crate::{
    note::{text_len, truncate_text},
    option::Limits,
    session::SharedSession,
    storage::{NotesStorage, StorageRecord},
    util::{
        sleep::sleep,
        task::{TaskHandle, spawn_cancellable, spawn_local},
    },
};
use std::{cell::RefCell, rc::Rc, time::Duration};
use tracing::{debug, error};

/// Result of feeding one input event to the [`DraftManager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftUpdate {
    /// The draft text after truncation.
    pub text: String,
    /// Length of [`text`](Self::text) in UTF-16 code units, for the visible counter.
    pub length: usize,
    /// Whether the input was cut down and the visible input should be replaced by `text`.
    pub truncated: bool,
}

/// Keeps the session draft in step with the input box and writes it to storage after a quiet
/// period.
///
/// Every call to [`on_input`](Self::on_input) replaces the pending write, so only the last value
/// typed before a pause is stored. Dropping the manager discards a pending write.
pub struct DraftManager<S> {
    session: SharedSession,
    storage: Rc<S>,
    limits: Limits,
    debounce: Duration,
    pending: RefCell<Option<TaskHandle>>,
}

impl<S> std::fmt::Debug for DraftManager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftManager")
            .field("debounce", &self.debounce)
            .field("pending", &self.pending.borrow().is_some())
            .finish()
    }
}

impl<S: NotesStorage + 'static> DraftManager<S> {
    pub fn new(session: SharedSession, storage: Rc<S>, limits: Limits, debounce: Duration) -> Self {
        Self {
            session,
            storage,
            limits,
            debounce,
            pending: RefCell::new(None),
        }
    }

    /// Records `input` as the current draft and (re)schedules its write.
    pub fn on_input(&self, input: &str) -> DraftUpdate {
        let text = truncate_text(input, self.limits.max_draft_length);
        let truncated = text.len() < input.len();
        let update = DraftUpdate {
            text: text.to_owned(),
            length: text_len(text),
            truncated,
        };

        self.session.borrow_mut().draft = update.text.clone();
        self.schedule_write();
        update
    }

    /// Drops the pending write, if any.
    pub fn cancel(&self) {
        if let Some(handle) = self.pending.borrow_mut().take() {
            handle.cancel();
        }
    }

    fn schedule_write(&self) {
        let session = self.session.clone();
        let storage = self.storage.clone();
        let debounce = self.debounce;

        let handle = spawn_cancellable(async move {
            sleep(debounce).await;
            // Read at fire time: a save in the meantime has already cleared the draft.
            let draft = session.borrow().draft.clone();
            // Detached so the write is not cut short by the next keystroke.
            spawn_local(async move {
                let record = StorageRecord::draft(draft);
                match storage.set(&record).await {
                    Ok(()) => debug!("Draft saved"),
                    Err(e) => error!("Failed to save draft: {e}"),
                }
            });
        });

        // Replacing the handle drops, and so aborts, the previous write.
        *self.pending.borrow_mut() = Some(handle);
    }
}

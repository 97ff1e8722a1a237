//! Popup configuration and size limits.

use std::time::Duration;

/// Maximum length of a saved note's content, in UTF-16 code units.
pub const MAX_NOTE_LENGTH: usize = 100_000;
/// Maximum length of the unsaved draft, in UTF-16 code units.
pub const MAX_DRAFT_LENGTH: usize = 100_000;
/// Maximum number of notes kept in the list.
pub const MAX_TOTAL_NOTES: usize = 1000;
/// Maximum length of a note's display date.
pub const MAX_DATE_LENGTH: usize = 200;
/// Maximum length of a note identifier.
pub const MAX_ID_LENGTH: usize = 100;

/// Size bounds applied to notes, drafts and the note list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, bon::Builder)]
pub struct Limits {
    #[builder(default = MAX_NOTE_LENGTH)]
    pub max_note_length: usize,
    #[builder(default = MAX_DRAFT_LENGTH)]
    pub max_draft_length: usize,
    #[builder(default = MAX_TOTAL_NOTES)]
    pub max_total_notes: usize,
    #[builder(default = MAX_DATE_LENGTH)]
    pub max_date_length: usize,
    #[builder(default = MAX_ID_LENGTH)]
    pub max_id_length: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Options for [`Popup`](crate::popup::Popup) and its components.
#[derive(Clone, Debug, Default, bon::Builder)]
pub struct PopupOptions {
    /// Size limits. If not provided, the `MAX_*` constants of this module are used.
    pub limits: Option<Limits>,
    /// Quiet period after the last keystroke before the draft is written. Defaults to 300 ms.
    pub draft_debounce: Option<Duration>,
    /// How long an error notification stays fully visible. Defaults to 4 seconds.
    pub notification_visible: Option<Duration>,
    /// Length of the fade-out before a notification is removed. Defaults to 300 ms.
    pub notification_fade: Option<Duration>,
}

impl PopupOptions {
    pub(crate) const DEFAULT_DRAFT_DEBOUNCE: Duration = Duration::from_millis(300);
    pub(crate) const DEFAULT_NOTIFICATION_VISIBLE: Duration = Duration::from_secs(4);
    pub(crate) const DEFAULT_NOTIFICATION_FADE: Duration = Duration::from_millis(300);

    pub fn limits(&self) -> Limits {
        self.limits.unwrap_or_default()
    }

    pub fn draft_debounce(&self) -> Duration {
        self.draft_debounce.unwrap_or(Self::DEFAULT_DRAFT_DEBOUNCE)
    }

    pub fn notification_visible(&self) -> Duration {
        self.notification_visible.unwrap_or(Self::DEFAULT_NOTIFICATION_VISIBLE)
    }

    pub fn notification_fade(&self) -> Duration {
        self.notification_fade.unwrap_or(Self::DEFAULT_NOTIFICATION_FADE)
    }
}

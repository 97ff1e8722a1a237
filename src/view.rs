//! Declarative description of what the popup shows, derived from the session on every change.

use crate::note::Note;
use std::{fmt, str::FromStr, time::Duration};

/// Path data of the document icon shown when there are no notes.
pub const EMPTY_STATE_ICON: &str = "M4 4a2 2 0 012-2h4.586A2 2 0 0112 2.586L15.414 6A2 2 0 0116 7.414V16a2 2 0 01-2 2H6a2 2 0 01-2-2V4zm2 6a1 1 0 011-1h6a1 1 0 110 2H7a1 1 0 01-1-1zm1 3a1 1 0 100 2h6a1 1 0 100-2H7z";

/// The saved-notes list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteListView {
    Empty(EmptyState),
    Cards(Vec<NoteCard>),
}

/// Placeholder shown instead of the list when there are no notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyState {
    pub icon_path: &'static str,
    /// Hint text, one entry per line.
    pub hint: [&'static str; 2],
}

impl Default for EmptyState {
    fn default() -> Self {
        Self {
            icon_path: EMPTY_STATE_ICON,
            hint: ["No saved notes yet.", "Create one in the New Note tab!"],
        }
    }
}

/// One saved note. Its delete control refers back to the note by [`id`](Self::id).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteCard {
    pub id: String,
    pub date: String,
    pub content: String,
}

impl From<&Note> for NoteCard {
    fn from(note: &Note) -> Self {
        Self {
            id: note.id.clone(),
            date: note.date.clone(),
            content: note.content.clone(),
        }
    }
}

/// Maps the note list to its view, keeping list order.
pub fn render_notes(notes: &[Note]) -> NoteListView {
    if notes.is_empty() {
        NoteListView::Empty(EmptyState::default())
    } else {
        NoteListView::Cards(notes.iter().map(NoteCard::from).collect())
    }
}

/// A transient error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    /// How long the message is fully visible.
    pub visible_for: Duration,
    /// How long it fades before being removed.
    pub fade_for: Duration,
}

/// The popup's two views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    NewNote,
    SavedNotes,
}

impl Tab {
    pub const ALL: [Tab; 2] = [Tab::NewNote, Tab::SavedNotes];

    /// The tab's `data-tab` value, which is also the id of its panel.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::NewNote => "new-note",
            Tab::SavedNotes => "saved-notes",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tab {
    type Err = TabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tab::ALL
            .into_iter()
            .find(|tab| tab.as_str() == s)
            .ok_or_else(|| TabError::Unknown(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TabError {
    #[error("Invalid tab target: {0:?}")]
    Unknown(String),
    #[error("Target element not found: {0}")]
    MissingPanel(Tab),
}

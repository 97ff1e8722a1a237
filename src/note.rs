//! The note record and its validation rules.

use crate::option::Limits;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A saved note.
///
/// Notes are created by [`NoteStore::begin_save`](crate::store::NoteStore::begin_save) and never
/// edited afterwards.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Note {
    /// Globally unique identifier.
    pub id: String,
    /// The note text, trimmed at save time.
    pub content: String,
    /// Locale-formatted creation timestamp, for display only.
    pub date: String,
}

impl Note {
    /// Returns `true` if every field is non-empty and within `limits`.
    pub fn is_valid(&self, limits: &Limits) -> bool {
        within(&self.id, limits.max_id_length)
            && within(&self.content, limits.max_note_length)
            && within(&self.date, limits.max_date_length)
    }

    /// Builds a note from an untrusted record, returning `None` if it fails [`is_valid_note`].
    pub fn from_candidate(candidate: &Value, limits: &Limits) -> Option<Self> {
        let record = candidate.as_object()?;
        let note = Note {
            id: record.get("id")?.as_str()?.to_owned(),
            content: record.get("content")?.as_str()?.to_owned(),
            date: record.get("date")?.as_str()?.to_owned(),
        };
        note.is_valid(limits).then_some(note)
    }
}

/// Returns `true` iff `candidate` is an object with string `id`, `content` and `date` fields,
/// each non-empty and within its bound. Other fields are ignored.
pub fn is_valid_note(candidate: &Value, limits: &Limits) -> bool {
    Note::from_candidate(candidate, limits).is_some()
}

/// Length of user text in UTF-16 code units, the unit a page's `value.length` reports.
///
/// Every limit in this crate is measured this way, so a character outside the Basic
/// Multilingual Plane (most emoji) counts as 2.
pub fn text_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Cuts `text` down to at most `max` UTF-16 code units.
///
/// The cut always falls on a character boundary: a surrogate pair that would straddle the limit
/// is dropped whole.
pub fn truncate_text(text: &str, max: usize) -> &str {
    let mut units = 0;
    for (index, c) in text.char_indices() {
        units += c.len_utf16();
        if units > max {
            return &text[..index];
        }
    }
    text
}

fn within(field: &str, max: usize) -> bool {
    // UTF-8 length is an upper bound on UTF-16 length; skip the scan for short fields.
    !field.is_empty() && (field.len() <= max || text_len(field) <= max)
}

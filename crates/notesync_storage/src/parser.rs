//! Note serialization.

use crate::error::StorageResult;
use crate::note::Note;

/// Converts notes to and from their stored text form.
pub trait NoteParser: Send + Sync {
    /// Serializes a note.
    ///
    /// # Errors
    ///
    /// Returns an error if the note cannot be serialized.
    fn to_text(&self, note: &Note) -> StorageResult<String>;

    /// Parses a stored note.
    ///
    /// # Errors
    ///
    /// Returns an error if `text` is not a valid note document.
    fn from_text(&self, text: &str) -> StorageResult<Note>;
}

/// JSON note parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonNoteParser {
    pretty: bool,
}

impl JsonNoteParser {
    /// Creates a compact JSON parser.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser that writes indented JSON.
    #[must_use]
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl NoteParser for JsonNoteParser {
    fn to_text(&self, note: &Note) -> StorageResult<String> {
        let text = if self.pretty {
            serde_json::to_string_pretty(note)?
        } else {
            serde_json::to_string(note)?
        };
        Ok(text)
    }

    fn from_text(&self, text: &str) -> StorageResult<Note> {
        Ok(serde_json::from_str(text)?)
    }
}

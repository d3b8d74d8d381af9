//! Notes, paragraphs, and listing summaries.

use crate::path;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque identifier for a note.
///
/// Note IDs are:
/// - Unique within a backend's namespace
/// - Immutable once assigned (moves change the path, never the id)
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Wraps an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string().to_uppercase())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NoteId({})", self.0)
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NoteId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for NoteId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One executable or content unit within a note.
///
/// Timestamps are optional and are not required to be ordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Paragraph identifier, unique within the note.
    pub id: String,
    /// Optional title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Paragraph source text.
    #[serde(default)]
    pub text: String,
    /// When the paragraph was created.
    #[serde(default)]
    pub date_created: Option<DateTime<Utc>>,
    /// When the paragraph last started running.
    #[serde(default)]
    pub date_started: Option<DateTime<Utc>>,
    /// When the paragraph last finished running.
    #[serde(default)]
    pub date_finished: Option<DateTime<Utc>>,
}

impl Paragraph {
    /// Creates a paragraph with the given text, created now.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: format!("paragraph_{}", Uuid::new_v4().simple()),
            title: None,
            text: text.into(),
            date_created: Some(Utc::now()),
            date_started: None,
            date_finished: None,
        }
    }

    /// Sets the creation time.
    pub fn with_created(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.date_created = at;
        self
    }

    /// Sets the start time.
    pub fn with_started(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.date_started = at;
        self
    }

    /// Sets the finish time.
    pub fn with_finished(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.date_finished = at;
        self
    }

    /// Returns every timestamp present on the paragraph.
    pub fn timestamps(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        [self.date_created, self.date_started, self.date_finished]
            .into_iter()
            .flatten()
    }
}

/// Full note content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Immutable note id.
    pub id: NoteId,
    /// Hierarchical path such as `/project/note`.
    pub path: String,
    /// Ordered paragraphs.
    #[serde(default)]
    pub paragraphs: Vec<Paragraph>,
}

impl Note {
    /// Creates an empty note with a generated id.
    pub fn new(path: impl Into<String>) -> Self {
        Self::with_id(NoteId::generate(), path)
    }

    /// Creates an empty note with an explicit id.
    pub fn with_id(id: impl Into<NoteId>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            paragraphs: Vec::new(),
        }
    }

    /// Appends a paragraph.
    pub fn with_paragraph(mut self, paragraph: Paragraph) -> Self {
        self.paragraphs.push(paragraph);
        self
    }

    /// Returns the display name (last path segment).
    #[must_use]
    pub fn name(&self) -> &str {
        path::note_name(&self.path)
    }

    /// Returns the listing summary for this note.
    #[must_use]
    pub fn summary(&self) -> NoteSummary {
        NoteSummary::from(self)
    }
}

/// Lightweight listing record for one note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSummary {
    /// Note id.
    pub id: NoteId,
    /// Note path at listing time.
    pub path: String,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl NoteSummary {
    /// Creates a summary from an id and path.
    pub fn new(id: impl Into<NoteId>, path: impl Into<String>) -> Self {
        let path = path.into();
        let name = Some(path::note_name(&path).to_string()).filter(|n| !n.is_empty());
        Self {
            id: id.into(),
            path,
            name,
        }
    }
}

impl From<&Note> for NoteSummary {
    fn from(note: &Note) -> Self {
        Self::new(note.id.clone(), note.path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(NoteId::generate(), NoteId::generate());
    }

    #[test]
    fn generated_ids_have_no_separators() {
        let id = NoteId::generate();
        assert!(!id.as_str().contains('_'));
        assert!(!id.as_str().contains('/'));
    }

    #[test]
    fn name_is_last_path_segment() {
        let note = Note::new("/my_project/my_note1");
        assert_eq!(note.name(), "my_note1");
        assert_eq!(note.summary().name.as_deref(), Some("my_note1"));
    }

    #[test]
    fn paragraph_timestamps_skip_missing() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let paragraph = Paragraph::new("%md hi")
            .with_created(None)
            .with_finished(Some(at));
        assert_eq!(paragraph.timestamps().collect::<Vec<_>>(), vec![at]);
    }


    #[test]
    fn note_json_shape() {
        let note = Note::with_id("ABC", "/p1/n1").with_paragraph(
            Paragraph::new("text").with_created(None),
        );
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["id"], "ABC");
        assert_eq!(json["path"], "/p1/n1");
        assert_eq!(json["paragraphs"][0]["text"], "text");
    }
}

//! Revision snapshots shared by the versioned backends.

use crate::note::Note;
use crate::types::Revision;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A note captured at one revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Snapshot {
    pub revision: Revision,
    pub note: Note,
}

/// Computes a content-addressed revision id.
///
/// The id chains in the parent revision so identical content checkpointed
/// twice in different histories still gets distinct ids.
pub(crate) fn revision_id(
    note: &Note,
    message: &str,
    time: DateTime<Utc>,
    parent: Option<&str>,
) -> String {
    let mut hasher = Sha256::new();
    if let Some(parent) = parent {
        hasher.update(parent.as_bytes());
    }
    hasher.update(note.id.as_str().as_bytes());
    hasher.update(note.path.as_bytes());
    for paragraph in &note.paragraphs {
        hasher.update(paragraph.id.as_bytes());
        hasher.update(paragraph.text.as_bytes());
    }
    hasher.update(message.as_bytes());
    hasher.update(time.to_rfc3339().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Appends a snapshot of `note` unless it equals the latest one.
pub(crate) fn record(snapshots: &mut Vec<Snapshot>, note: &Note, message: &str) -> Option<Revision> {
    let parent = snapshots.last();
    if parent.is_some_and(|s| s.note == *note) {
        return None;
    }
    let time = Utc::now();
    let revision = Revision {
        id: revision_id(note, message, time, parent.map(|s| s.revision.id.as_str())),
        message: message.to_string(),
        time,
    };
    snapshots.push(Snapshot {
        revision: revision.clone(),
        note: note.clone(),
    });
    Some(revision)
}

/// Finds the snapshot for `revision_id`.
pub(crate) fn find<'a>(snapshots: &'a [Snapshot], revision_id: &str) -> Option<&'a Snapshot> {
    snapshots.iter().find(|s| s.revision.id == revision_id)
}

/// Returns revisions newest first.
pub(crate) fn revisions(snapshots: &[Snapshot]) -> Vec<Revision> {
    snapshots.iter().rev().map(|s| s.revision.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::Paragraph;

    #[test]
    fn unchanged_note_records_nothing() {
        let note = Note::with_id("N", "/n").with_paragraph(Paragraph::new("a"));
        let mut snapshots = Vec::new();
        assert!(record(&mut snapshots, &note, "first").is_some());
        assert!(record(&mut snapshots, &note, "again").is_none());
        assert_eq!(snapshots.len(), 1);
    }

    #[test]
    fn revisions_are_newest_first() {
        let mut note = Note::with_id("N", "/n");
        let mut snapshots = Vec::new();
        let first = record(&mut snapshots, &note, "one").unwrap();
        note.paragraphs.push(Paragraph::new("b"));
        let second = record(&mut snapshots, &note, "two").unwrap();

        let listed = revisions(&snapshots);
        assert_eq!(listed, vec![second.clone(), first.clone()]);
        assert_ne!(first.id, second.id);
        assert_eq!(find(&snapshots, &first.id).unwrap().note.paragraphs.len(), 0);
    }

    #[test]
    fn revision_id_is_hex_sha256() {
        let note = Note::with_id("N", "/n");
        let id = revision_id(&note, "m", Utc::now(), None);
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}

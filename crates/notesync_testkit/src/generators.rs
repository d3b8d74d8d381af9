//! Property-based test generators using proptest.

use crate::fixtures::minutes;
use chrono::{DateTime, Utc};
use notesync_storage::{Note, NoteId, Paragraph};
use proptest::prelude::*;

/// Strategy for generating note ids the file backend accepts.
pub fn note_id_strategy() -> impl Strategy<Value = NoteId> {
    prop::string::string_regex("[A-Z0-9]{8}")
        .expect("Invalid regex")
        .prop_map(NoteId::new)
}

/// Strategy for generating normalized note paths one to three levels deep.
pub fn path_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("(/[a-z]{1,6}){1,3}").expect("Invalid regex")
}

/// Strategy for an optional timestamp within ten hours of the fixture base.
pub fn timestamp_strategy() -> impl Strategy<Value = Option<DateTime<Utc>>> {
    prop::option::of(0i64..600).prop_map(|m| m.map(minutes))
}

/// Strategy for paragraphs with arbitrary, possibly missing, timestamps.
pub fn paragraph_strategy() -> impl Strategy<Value = Paragraph> {
    (
        timestamp_strategy(),
        timestamp_strategy(),
        timestamp_strategy(),
        "[a-z ]{0,16}",
    )
        .prop_map(|(created, started, finished, text)| {
            Paragraph::new(text)
                .with_created(created)
                .with_started(started)
                .with_finished(finished)
        })
}

/// Strategy for a single note.
pub fn note_strategy() -> impl Strategy<Value = Note> {
    (
        note_id_strategy(),
        path_strategy(),
        prop::collection::vec(paragraph_strategy(), 0..4),
    )
        .prop_map(|(id, path, paragraphs)| Note {
            id,
            path,
            paragraphs,
        })
}

/// Where a generated note lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Only in the source backend.
    SourceOnly,
    /// Only in the destination backend.
    DestOnly,
    /// In both, with independently generated content.
    Both,
}

/// Contents for a source and a destination backend.
///
/// Ids and paths are unique within each side, and a note present on both
/// sides has the same id and path on each.
#[derive(Debug, Clone, Default)]
pub struct NotebookPair {
    /// Notes for the source backend.
    pub source: Vec<Note>,
    /// Notes for the destination backend.
    pub dest: Vec<Note>,
}

/// Strategy for a pair of overlapping notebooks with up to `max_notes`
/// distinct notes.
pub fn notebook_pair_strategy(max_notes: usize) -> impl Strategy<Value = NotebookPair> {
    let side = prop_oneof![Just(Side::SourceOnly), Just(Side::DestOnly), Just(Side::Both)];
    let paragraphs = || prop::collection::vec(paragraph_strategy(), 0..3);
    prop::collection::vec((side, paragraphs(), paragraphs()), 0..max_notes).prop_map(|entries| {
        let mut pair = NotebookPair::default();
        for (i, (side, source_paragraphs, dest_paragraphs)) in entries.into_iter().enumerate() {
            let note = |paragraphs: Vec<Paragraph>| Note {
                id: NoteId::new(format!("N{i:04}")),
                path: format!("/folder{}/note{i}", i % 3),
                paragraphs,
            };
            match side {
                Side::SourceOnly => pair.source.push(note(source_paragraphs)),
                Side::DestOnly => pair.dest.push(note(dest_paragraphs)),
                Side::Both => {
                    pair.source.push(note(source_paragraphs));
                    pair.dest.push(note(dest_paragraphs));
                }
            }
        }
        pair
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::strategy::ValueTree;
    use proptest::test_runner::TestRunner;
    use std::collections::BTreeSet;

    #[test]
    fn pair_ids_are_unique_per_side() {
        let mut runner = TestRunner::default();
        let strategy = notebook_pair_strategy(12);
        for _ in 0..32 {
            let pair = strategy.new_tree(&mut runner).unwrap().current();
            let ids: BTreeSet<_> = pair.source.iter().map(|n| n.id.clone()).collect();
            assert_eq!(ids.len(), pair.source.len());
            let paths: BTreeSet<_> = pair.dest.iter().map(|n| n.path.clone()).collect();
            assert_eq!(paths.len(), pair.dest.len());
        }
    }

    proptest! {
        #[test]
        fn generated_paths_are_normalized(path in path_strategy()) {
            prop_assert_eq!(notesync_storage::path::normalize(&path).unwrap(), path);
        }

        #[test]
        fn generated_ids_have_no_separators(id in note_id_strategy()) {
            prop_assert!(!id.as_str().contains('_'));
            prop_assert!(!id.as_str().contains('/'));
        }
    }
}

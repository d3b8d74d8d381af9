//! Benchmark utilities.

use chrono::{DateTime, Duration, TimeZone, Utc};
use notesync_storage::{Identity, Note, NotebookBackend, Paragraph, StorageResult};

/// Fixed origin for generated timestamps.
pub fn epoch() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Generates `count` notes, each with `paragraphs` paragraphs.
///
/// Paragraph `j` of note `i` was created `i + j` seconds after [`epoch`].
pub fn generate_notes(count: usize, paragraphs: usize) -> Vec<Note> {
    (0..count)
        .map(|i| {
            let mut note = Note::with_id(format!("BENCH{i:06}"), format!("/bench/f{}/n{i}", i % 16));
            for j in 0..paragraphs {
                note = note.with_paragraph(
                    Paragraph::new(format!("%md paragraph {j} of note {i}"))
                        .with_created(Some(epoch() + Duration::seconds((i + j) as i64))),
                );
            }
            note
        })
        .collect()
}

/// Saves `notes` into `backend` as the anonymous identity.
pub fn populate(backend: &dyn NotebookBackend, notes: &[Note]) -> StorageResult<()> {
    let anon = Identity::anonymous();
    notes.iter().try_for_each(|note| backend.save(note, &anon))
}

/// Returns copies of `notes` with every paragraph `seconds` newer.
pub fn touched(notes: &[Note], seconds: i64) -> Vec<Note> {
    notes
        .iter()
        .cloned()
        .map(|mut note| {
            for paragraph in &mut note.paragraphs {
                paragraph.date_created = paragraph
                    .date_created
                    .map(|t| t + Duration::seconds(seconds));
            }
            note
        })
        .collect()
}

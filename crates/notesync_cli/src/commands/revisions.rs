//! Checkpoint, history and restore commands.

use notesync_engine::{CheckpointResult, NotebookSync};
use notesync_storage::{Identity, NoteId};

/// Runs the checkpoint command.
pub fn checkpoint(
    engine: &NotebookSync,
    identity: &Identity,
    id: &str,
    path: &str,
    message: &str,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = engine.checkpoint_all(&NoteId::new(id), path, message, identity)?;
    match format {
        "json" => super::print_json(&result)?,
        _ => print_checkpoint(&result),
    }
    Ok(())
}

fn print_checkpoint(result: &CheckpointResult) {
    if result.outcomes.is_empty() {
        println!("No backend keeps revisions");
        return;
    }
    for outcome in &result.outcomes {
        let status = match &outcome.result {
            Ok(Some(revision)) => format!("revision {}", revision.id),
            Ok(None) => "unchanged".to_string(),
            Err(e) => format!("failed: {e}"),
        };
        println!("  [{}] {}: {}", outcome.ordinal, outcome.kind, status);
    }
    match &result.revision {
        Some(revision) => println!("Checkpoint: {}", revision.id),
        None => println!("Checkpoint: none recorded"),
    }
}

/// Runs the history command.
pub fn history(
    engine: &NotebookSync,
    identity: &Identity,
    id: &str,
    path: &str,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let revisions = engine.revision_history(&NoteId::new(id), path, identity);
    match format {
        "json" => super::print_json(&revisions)?,
        _ => {
            println!("{} revisions of {id}", revisions.len());
            for revision in &revisions {
                println!(
                    "  {}  {}  {}",
                    revision.time.to_rfc3339(),
                    revision.id,
                    revision.message
                );
            }
        }
    }
    Ok(())
}

/// Runs the restore command.
pub fn restore(
    engine: &NotebookSync,
    identity: &Identity,
    id: &str,
    path: &str,
    revision: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    match engine.set_note_revision(&NoteId::new(id), path, revision, identity) {
        Some(note) => {
            println!("Restored {} at {} to revision {revision}", note.id, note.path);
            Ok(())
        }
        None => Err(format!("revision {revision} of note {id} could not be restored").into()),
    }
}

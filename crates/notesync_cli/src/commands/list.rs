//! List command implementation.

use notesync_engine::NotebookSync;
use notesync_storage::{Identity, NoteSummary};

/// Lists the notes of backend `repo`, ordered by path.
pub fn collect(
    engine: &NotebookSync,
    identity: &Identity,
    repo: usize,
) -> Result<Vec<NoteSummary>, Box<dyn std::error::Error>> {
    let mut notes: Vec<NoteSummary> = engine.list_at(repo, identity)?.into_values().collect();
    notes.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.id.cmp(&b.id)));
    Ok(notes)
}

/// Runs the list command.
pub fn run(
    engine: &NotebookSync,
    identity: &Identity,
    repo: usize,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let notes = collect(engine, identity, repo)?;
    match format {
        "json" => super::print_json(&notes)?,
        _ => {
            let kind = engine.repo_at(repo)?.kind().to_string();
            println!("{} notes in [{}] {}", notes.len(), repo, kind);
            for note in &notes {
                println!("  {:<12} {}", note.id.as_str(), note.path);
            }
        }
    }
    Ok(())
}

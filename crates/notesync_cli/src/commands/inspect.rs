//! Inspect command implementation.

use notesync_engine::{NotebookSync, SyncPlan};
use notesync_storage::Identity;
use serde::Serialize;

/// Engine inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Configured backend identifiers.
    pub storage: String,
    /// Whether destination-only notes are deleted.
    pub one_way_sync: bool,
    /// Initialized backends in ordinal order.
    pub backends: Vec<BackendInfo>,
    /// Work a primary-to-secondary sync would do.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending: Option<PendingWork>,
}

/// One initialized backend.
#[derive(Debug, Serialize)]
pub struct BackendInfo {
    /// Ordinal, 0 is the primary.
    pub ordinal: usize,
    /// Catalog identifier.
    pub kind: String,
    /// Backend display name.
    pub name: String,
    /// Whether the backend keeps revisions.
    pub version_control: bool,
    /// Number of notes, if listing succeeded.
    pub notes: Option<usize>,
    /// Listing error, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Counts from a sync plan.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct PendingWork {
    /// Notes to push.
    pub push: usize,
    /// Notes to pull.
    pub pull: usize,
    /// Notes to delete.
    pub delete: usize,
}

impl From<&SyncPlan> for PendingWork {
    fn from(plan: &SyncPlan) -> Self {
        Self {
            push: plan.push.len(),
            pull: plan.pull.len(),
            delete: plan.delete.len(),
        }
    }
}

/// Collects the inspection result.
pub fn collect(engine: &NotebookSync, identity: &Identity) -> InspectResult {
    let backends = engine
        .backends()
        .iter()
        .map(|handle| {
            let listing = handle.backend().list(identity);
            BackendInfo {
                ordinal: handle.ordinal(),
                kind: handle.kind().to_string(),
                name: handle.backend().name().to_string(),
                version_control: handle.supports_version_control(),
                notes: listing.as_ref().ok().map(|l| l.len()),
                error: listing.err().map(|e| e.to_string()),
            }
        })
        .collect();

    let pending = if engine.repo_count() > 1 {
        engine
            .plan(0, 1, identity)
            .ok()
            .map(|plan| PendingWork::from(&plan))
    } else {
        None
    };

    InspectResult {
        storage: engine.config().storage.clone(),
        one_way_sync: engine.config().one_way_sync,
        backends,
        pending,
    }
}

/// Runs the inspect command.
pub fn run(
    engine: &NotebookSync,
    identity: &Identity,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = collect(engine, identity);
    match format {
        "json" => super::print_json(&result)?,
        _ => print_text_output(&result),
    }
    Ok(())
}

fn print_text_output(result: &InspectResult) {
    println!("notesync Inspection");
    println!("===================");
    println!();
    println!("Storage:  {}", result.storage);
    println!(
        "Sync:     {}",
        if result.one_way_sync { "one-way" } else { "two-way" }
    );
    println!();
    println!("Backends:");
    for backend in &result.backends {
        let notes = match (&backend.notes, &backend.error) {
            (Some(n), _) => format!("{n} notes"),
            (None, Some(e)) => format!("unavailable: {e}"),
            (None, None) => "unavailable".to_string(),
        };
        println!(
            "  [{}] {} ({}){} - {}",
            backend.ordinal,
            backend.kind,
            backend.name,
            if backend.version_control {
                ", versioned"
            } else {
                ""
            },
            notes
        );
    }

    if let Some(pending) = &result.pending {
        println!();
        println!("Pending sync:");
        println!("  Push:   {}", pending.push);
        println!("  Pull:   {}", pending.pull);
        println!("  Delete: {}", pending.delete);
    }
}

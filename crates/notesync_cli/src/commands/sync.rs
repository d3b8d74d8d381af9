//! Sync command implementation.

use notesync_engine::{NotebookSync, SyncPlan, SyncReport};
use notesync_storage::{Identity, NoteSummary};
use serde::Serialize;
use tracing::warn;

/// A plan as shown by `--dry-run`.
#[derive(Debug, Serialize)]
pub struct PlanOutput {
    /// Notes to copy from source to destination.
    pub push: Vec<NoteSummary>,
    /// Notes to copy from destination to source.
    pub pull: Vec<NoteSummary>,
    /// Notes to remove from the destination.
    pub delete: Vec<NoteSummary>,
}

impl From<SyncPlan> for PlanOutput {
    fn from(plan: SyncPlan) -> Self {
        Self {
            push: plan.push,
            pull: plan.pull,
            delete: plan.delete,
        }
    }
}

/// Runs the sync command.
///
/// Notes skipped because of a per-note failure are reported but do not
/// fail the command.
pub fn run(
    engine: &NotebookSync,
    identity: &Identity,
    source: usize,
    dest: usize,
    dry_run: bool,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if dry_run {
        let plan = PlanOutput::from(engine.plan(source, dest, identity)?);
        match format {
            "json" => super::print_json(&plan)?,
            _ => print_plan(&plan),
        }
        return Ok(());
    }

    let report = engine.sync_between(source, dest, identity)?;
    match format {
        "json" => super::print_json(&report)?,
        _ => print_report(&report),
    }
    if !report.is_clean() {
        warn!(failed = report.failures.len(), "some notes were skipped");
    }
    Ok(())
}

fn print_plan(plan: &PlanOutput) {
    println!("Sync Plan (dry run)");
    println!("===================");
    for (label, notes) in [
        ("Push", &plan.push),
        ("Pull", &plan.pull),
        ("Delete", &plan.delete),
    ] {
        println!("{label}: {}", notes.len());
        for note in notes {
            println!("  {:<12} {}", note.id.as_str(), note.path);
        }
    }
}

fn print_report(report: &SyncReport) {
    println!("Sync Complete");
    println!("=============");
    println!("Pushed:  {}", report.pushed.len());
    println!("Pulled:  {}", report.pulled.len());
    println!("Deleted: {}", report.deleted.len());
    if !report.failures.is_empty() {
        println!();
        println!("Failures:");
        for failure in &report.failures {
            println!(
                "  {:?} {}: {}",
                failure.direction, failure.id, failure.error
            );
        }
    }
}

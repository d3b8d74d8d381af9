//! Settings command implementation.

use notesync_engine::{BackendSettings, NotebookSync};
use notesync_storage::Identity;
use std::collections::BTreeMap;

/// Parses `name=value` pairs.
pub fn parse_assignments(pairs: &[String]) -> Result<BTreeMap<String, String>, String> {
    pairs
        .iter()
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => {
                Ok((name.trim().to_string(), value.to_string()))
            }
            _ => Err(format!("expected NAME=VALUE, got '{pair}'")),
        })
        .collect()
}

/// Runs the settings command.
///
/// Without assignments, prints every backend's settings. With assignments
/// and a `kind`, updates the first backend of that kind; without a `kind`,
/// updates the primary.
pub fn run(
    engine: &NotebookSync,
    identity: &Identity,
    kind: Option<&str>,
    assignments: &[String],
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if !assignments.is_empty() {
        let updates = parse_assignments(assignments)?;
        match kind {
            Some(kind) => {
                if engine
                    .update_backend_settings(kind, &updates, identity)?
                    .is_none()
                {
                    return Err(format!("no backend of kind '{kind}'").into());
                }
            }
            None => engine.update_settings(&updates, identity),
        }
    }

    let all = engine.backend_settings(identity);
    match format {
        "json" => super::print_json(&all)?,
        _ => print_text_output(&all),
    }
    Ok(())
}

fn print_text_output(all: &[BackendSettings]) {
    for (ordinal, backend) in all.iter().enumerate() {
        println!("[{ordinal}] {} ({})", backend.kind, backend.name);
        if backend.settings.is_empty() {
            println!("  (no settings)");
        }
        for setting in &backend.settings {
            println!("  {} = {}", setting.name, setting.selected);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_assignments() {
        let parsed =
            parse_assignments(&["a=1".to_string(), " b =x=y".to_string()]).unwrap();
        assert_eq!(parsed["a"], "1");
        assert_eq!(parsed["b"], "x=y");
        assert!(parse_assignments(&["novalue".to_string()]).is_err());
        assert!(parse_assignments(&["=v".to_string()]).is_err());
    }

    #[test]
    fn unknown_kind_is_an_error() {
        let engine = super::super::memory_engine();
        let result = run(
            &engine,
            &Identity::anonymous(),
            Some("file"),
            &["notebook_dir=/tmp".to_string()],
            "text",
        );
        assert!(result.is_err());
    }

    #[test]
    fn updates_named_backend() {
        let engine = super::super::memory_engine();
        let anon = Identity::anonymous();
        run(&engine, &anon, Some("memory"), &["color=blue".to_string()], "json").unwrap();

        let all = engine.backend_settings(&anon);
        assert!(all[1]
            .settings
            .iter()
            .any(|s| s.name == "color" && s.selected == "blue"));
        assert!(all[0].settings.iter().all(|s| s.name != "color"));
    }
}

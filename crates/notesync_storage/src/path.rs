//! Note and folder path helpers.
//!
//! Paths are `/`-separated, absolute, and carry no trailing separator:
//! `/project/sub/note`. The root folder is `/`.

use crate::error::{StorageError, StorageResult};

/// Normalizes a note or folder path.
///
/// Adds a leading `/`, strips trailing separators and collapses repeated
/// separators.
///
/// # Errors
///
/// Returns [`StorageError::InvalidPath`] for `.` or `..` segments.
pub fn normalize(path: &str) -> StorageResult<String> {
    let mut out = String::with_capacity(path.len() + 1);
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if segment == "." || segment == ".." {
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        out.push('/');
        out.push_str(segment);
    }
    if out.is_empty() {
        out.push('/');
    }
    Ok(out)
}

/// Returns the last segment of a path.
#[must_use]
pub fn note_name(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
}

/// Returns true if `path` lies strictly inside `folder`.
///
/// Both arguments must already be normalized.
#[must_use]
pub fn is_within(path: &str, folder: &str) -> bool {
    if folder == "/" {
        return path != "/";
    }
    path.len() > folder.len() && path.starts_with(folder) && path[folder.len()..].starts_with('/')
}

/// Moves `path` from under `folder` to under `new_folder`.
///
/// Returns `None` if `path` is not inside `folder`.
#[must_use]
pub fn rebase(path: &str, folder: &str, new_folder: &str) -> Option<String> {
    if !is_within(path, folder) {
        return None;
    }
    let rest = if folder == "/" {
        path
    } else {
        &path[folder.len()..]
    };
    if new_folder == "/" {
        Some(rest.to_string())
    } else {
        Some(format!("{new_folder}{rest}"))
    }
}

//! Discover catalog entries laid out as a directory tree.
//!
//! Layout: `<root>/<category>/.../<name>/index.json`. A directory holding an
//! `index.json` is an entry directory and is not descended into; any other
//! directory is a category and is walked recursively. Hidden entries are
//! skipped, the walk is bounded by a maximum depth, and traversal is sorted
//! so results come back in a stable order.

use crate::catalog::{CatalogEntry, EntryName, validate};
use crate::error::{RecordError, RecordErrors};
use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const ENTRY_FILE: &str = "index.json";
pub const DEFAULT_MAX_SCAN_DEPTH: usize = 5;

/// Returns true when `path` is a directory containing an entry file.
pub fn is_entry_directory(path: &Path) -> bool {
    path.join(ENTRY_FILE).is_file()
}

#[derive(Default)]
struct ScanState {
    entries: Vec<CatalogEntry>,
    seen: HashMap<EntryName, PathBuf>,
    invalid: Vec<RecordError>,
}

/// Load every entry under `root`.
///
/// Fails when the walk goes deeper than `max_depth` directories below `root`,
/// when an entry's name differs from its directory name, or when two entry
/// directories declare the same name. Records that fail validation are
/// collected and reported together as [`RecordErrors`].
pub fn load_entries_from_dir(root: &Path, max_depth: usize) -> Result<Vec<CatalogEntry>> {
    if !root.is_dir() {
        bail!("catalog directory {} does not exist", root.display());
    }

    let mut state = ScanState::default();
    scan_dir(root, 0, max_depth, &mut state)?;

    if !state.invalid.is_empty() {
        return Err(anyhow::Error::new(RecordErrors(state.invalid)))
            .with_context(|| format!("validating entries under {}", root.display()));
    }

    info!(root = %root.display(), entries = state.entries.len(), "loaded entry directory");
    Ok(state.entries)
}

fn scan_dir(dir: &Path, depth: usize, max_depth: usize, state: &mut ScanState) -> Result<()> {
    for child in sorted_subdirectories(dir)? {
        let child_depth = depth + 1;
        if child_depth > max_depth {
            bail!(
                "maximum directory depth {max_depth} exceeded at {}",
                child.display()
            );
        }
        if is_entry_directory(&child) {
            load_entry_dir(&child, state)?;
        } else {
            scan_dir(&child, child_depth, max_depth, state)?;
        }
    }
    Ok(())
}

fn sorted_subdirectories(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if hidden {
            debug!(path = %path.display(), "skipping hidden path");
            continue;
        }
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn load_entry_dir(dir: &Path, state: &mut ScanState) -> Result<()> {
    let file = dir.join(ENTRY_FILE);
    let data = fs::read_to_string(&file).with_context(|| format!("reading {}", file.display()))?;
    let value: Value =
        serde_json::from_str(&data).with_context(|| format!("parsing {}", file.display()))?;

    let entry = match validate(&value) {
        Ok(entry) => entry,
        Err(errors) => {
            state.invalid.push(RecordError {
                location: dir.display().to_string(),
                errors,
            });
            return Ok(());
        }
    };

    let dir_name = dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    if entry.name().as_str() != dir_name {
        bail!(
            "entry name '{}' and directory name '{}' should match",
            entry.name(),
            dir_name
        );
    }

    if let Some(previous) = state.seen.get(entry.name()) {
        bail!(
            "duplicate entry name '{}' in {} and {}",
            entry.name(),
            previous.display(),
            dir.display()
        );
    }

    debug!(name = %entry.name(), dir = %dir.display(), "loaded entry directory");
    state.seen.insert(entry.name().clone(), dir.to_path_buf());
    state.entries.push(entry);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_entry(root: &Path, rel: &str, name: &str) {
        let dir = root.join(rel);
        fs::create_dir_all(&dir).unwrap();
        let body = json!({
            "name": name,
            "description": format!("{name} lab"),
            "url": format!("https://labs.example.com/{name}/"),
            "technologies": ["php"],
            "tags": ["web"],
        });
        fs::write(dir.join(ENTRY_FILE), body.to_string()).unwrap();
    }

    fn names(entries: &[CatalogEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name().as_str()).collect()
    }

    #[test]
    fn walks_categories_in_sorted_order() {
        let root = TempDir::new().unwrap();
        write_entry(root.path(), "web/zeta", "zeta");
        write_entry(root.path(), "web/alpha", "alpha");
        write_entry(root.path(), "api/graphql/gql-lab", "gql-lab");
        fs::write(root.path().join("README.md"), "notes").unwrap();

        let entries = load_entries_from_dir(root.path(), DEFAULT_MAX_SCAN_DEPTH).unwrap();
        assert_eq!(names(&entries), vec!["gql-lab", "alpha", "zeta"]);
    }

    #[test]
    fn hidden_directories_are_skipped() {
        let root = TempDir::new().unwrap();
        write_entry(root.path(), "web/visible", "visible");
        write_entry(root.path(), ".drafts/hidden", "hidden");
        write_entry(root.path(), "web/.wip", ".wip");

        let entries = load_entries_from_dir(root.path(), DEFAULT_MAX_SCAN_DEPTH).unwrap();
        assert_eq!(names(&entries), vec!["visible"]);
    }

    #[test]
    fn depth_limit_is_enforced() {
        let root = TempDir::new().unwrap();
        write_entry(root.path(), "a/b/c/lab", "lab");

        assert_eq!(load_entries_from_dir(root.path(), 4).unwrap().len(), 1);
        let err = load_entries_from_dir(root.path(), 3).unwrap_err();
        assert!(err.to_string().contains("maximum directory depth 3"));
    }

    #[test]
    fn name_must_match_directory() {
        let root = TempDir::new().unwrap();
        write_entry(root.path(), "web/lab-one", "lab-two");
        let err = load_entries_from_dir(root.path(), DEFAULT_MAX_SCAN_DEPTH).unwrap_err();
        assert!(err.to_string().contains("should match"));
    }

    #[test]
    fn duplicate_names_across_categories_fail() {
        let root = TempDir::new().unwrap();
        write_entry(root.path(), "api/lab", "lab");
        write_entry(root.path(), "web/lab", "lab");
        let err = load_entries_from_dir(root.path(), DEFAULT_MAX_SCAN_DEPTH).unwrap_err();
        assert!(err.to_string().contains("duplicate entry name 'lab'"));
    }

    #[test]
    fn invalid_entries_are_collected() {
        let root = TempDir::new().unwrap();
        write_entry(root.path(), "web/good", "good");
        for bad in ["web/bad-one", "web/bad-two"] {
            let dir = root.path().join(bad);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join(ENTRY_FILE), r#"{"description": "no name"}"#).unwrap();
        }

        let err = load_entries_from_dir(root.path(), DEFAULT_MAX_SCAN_DEPTH).unwrap_err();
        let records = err.downcast_ref::<RecordErrors>().expect("typed record errors");
        assert_eq!(records.0.len(), 2);
        assert!(records.0[0].location.ends_with("bad-one"));
    }

    #[test]
    fn missing_root_is_an_error() {
        let root = TempDir::new().unwrap();
        let err = load_entries_from_dir(&root.path().join("absent"), 5).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}

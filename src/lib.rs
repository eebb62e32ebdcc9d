//! Validated catalog of vulnerable-application training targets.
//!
//! The crate turns loose JSON records (name, description, URL, technology,
//! tag and vulnerability sets) into immutable `CatalogEntry` values and keeps
//! them in a `Registry` that answers lookups by name and by set-field value.
//! Public functions here are the load/save contract hosts build on: stream
//! parsing, configured loading from a catalog file plus an entry directory
//! tree, and persisting back to the catalog file.

use anyhow::{Context, Result, bail};
use serde_json::Value;
use tracing::info;

pub mod catalog;
pub mod config;
pub mod error;
pub mod loader;
pub mod schema_loader;
pub mod store;

pub use catalog::{
    CatalogEntry, ENTRY_FIELDS, Entries, EntryName, Facet, FacetIndex, Field, FieldKind,
    FieldSpec, Registry, SharedRegistry, validate,
};
pub use config::CatalogConfig;
pub use error::{RecordError, RecordErrors, RegistryError, ValidationError, ValidationErrors};
pub use loader::{ENTRY_FILE, is_entry_directory, load_entries_from_dir};
pub use schema_loader::{CANONICAL_ENTRY_SCHEMA, ENTRY_SCHEMA_VERSION, PersistedSchema};
pub use store::{CatalogStore, save_registry};

/// One undecoded record plus where it came from in the input.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub location: String,
    pub value: Value,
}

/// Split comma- or whitespace-delimited lists into tokens.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .replace(',', " ")
        .split_whitespace()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse a catalog stream, accepting a JSON array, a single object, or NDJSON.
///
/// Empty input is an error. Records are returned undecoded; validation is the
/// caller's job. NDJSON is parsed line by line and blank lines are skipped.
pub fn parse_record_stream(input: &str) -> Result<Vec<RawRecord>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        bail!("No catalog records provided");
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return match value {
            Value::Array(items) => Ok(items
                .into_iter()
                .enumerate()
                .map(|(idx, value)| RawRecord {
                    location: format!("record {idx}"),
                    value,
                })
                .collect()),
            Value::Object(_) => Ok(vec![RawRecord {
                location: "record 0".to_string(),
                value,
            }]),
            _ => bail!("Unsupported JSON input; expected object or array"),
        };
    }

    let mut records = Vec::new();
    for (idx, line) in trimmed.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(line)
            .with_context(|| format!("Unable to parse catalog record from line {}", idx + 1))?;
        records.push(RawRecord {
            location: format!("line {}", idx + 1),
            value,
        });
    }

    if records.is_empty() {
        bail!("No catalog records found in input stream");
    }

    Ok(records)
}

/// Build the registry described by `config`.
///
/// The catalog file is loaded when it exists (a missing file means an empty
/// catalog), then entries under `templates_dir` are merged in. A name present
/// in both places is a duplicate and fails the load.
pub fn load_configured_registry(config: &CatalogConfig) -> Result<Registry> {
    let store = CatalogStore::from_config(config)?;
    let mut registry = if config.catalog_path.is_file() {
        store.load(&config.catalog_path)?
    } else {
        info!(
            path = %config.catalog_path.display(),
            "no catalog file yet; starting with an empty registry"
        );
        Registry::new()
    };

    if let Some(dir) = &config.templates_dir {
        let entries = load_entries_from_dir(dir, config.max_scan_depth)?;
        let count = entries.len();
        for entry in entries {
            registry
                .insert(entry)
                .with_context(|| format!("merging entries from {}", dir.display()))?;
        }
        info!(dir = %dir.display(), count, "merged directory entries");
    }

    Ok(registry)
}

/// Persist `registry` to the configured catalog file.
pub fn save_configured_registry(config: &CatalogConfig, registry: &Registry) -> Result<()> {
    save_registry(&config.catalog_path, registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn split_list_accepts_commas_and_spaces() {
        assert_eq!(split_list("xss, sqli  ssrf,,"), vec!["xss", "sqli", "ssrf"]);
        assert!(split_list(" , ").is_empty());
    }

    #[test]
    fn stream_accepts_array_object_and_ndjson() {
        let array = parse_record_stream(r#"[{"name":"a"},{"name":"b"}]"#).unwrap();
        assert_eq!(array.len(), 2);
        assert_eq!(array[1].location, "record 1");

        let object = parse_record_stream(r#"{"name":"a"}"#).unwrap();
        assert_eq!(object[0].value, json!({"name": "a"}));

        let ndjson = parse_record_stream("{\"name\":\"a\"}\n\n{\"name\":\"b\"}\n").unwrap();
        let locations: Vec<&str> = ndjson.iter().map(|r| r.location.as_str()).collect();
        assert_eq!(locations, vec!["line 1", "line 3"]);
    }

    #[test]
    fn stream_rejects_empty_and_scalar_input() {
        assert!(parse_record_stream("   ").is_err());
        let err = parse_record_stream("42").unwrap_err();
        assert!(err.to_string().contains("expected object or array"));
        let err = parse_record_stream("{\"name\":\"a\"}\nnot json").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}

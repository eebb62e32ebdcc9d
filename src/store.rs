//! Load and save registries in the persisted JSON form.
//!
//! A saved catalog is a pretty-printed array of entry objects in insertion
//! order. Writes go to a temp file beside the target and are renamed into
//! place, so a reader never observes a half-written catalog. Loads are
//! all-or-nothing: every invalid record is reported together and no registry
//! is returned unless all of them validate. When a schema is attached it is
//! checked against the normalized document of the validated entries.

use crate::catalog::{CatalogEntry, Registry, validate};
use crate::config::CatalogConfig;
use crate::error::{RecordError, RecordErrors};
use crate::parse_record_stream;
use crate::schema_loader::PersistedSchema;
use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

#[derive(Debug, Default)]
/// Reads catalogs, optionally checking the result against the persisted schema.
pub struct CatalogStore {
    schema: Option<PersistedSchema>,
}

impl CatalogStore {
    /// Store without a schema; records are only checked by the validator.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(schema: PersistedSchema) -> Self {
        Self {
            schema: Some(schema),
        }
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        if !config.check_schema {
            return Ok(Self::new());
        }
        let schema = PersistedSchema::load(config.schema_path.as_deref())?;
        Ok(Self::with_schema(schema))
    }

    pub fn schema(&self) -> Option<&PersistedSchema> {
        self.schema.as_ref()
    }

    /// Parse catalog text into a registry.
    pub fn parse(&self, input: &str, origin: &str) -> Result<Registry> {
        let records = parse_record_stream(input).with_context(|| format!("reading {origin}"))?;

        let mut entries = Vec::with_capacity(records.len());
        let mut invalid = Vec::new();
        for record in records {
            match validate(&record.value) {
                Ok(entry) => {
                    debug!(origin, location = %record.location, name = %entry.name(), "validated record");
                    entries.push(entry);
                }
                Err(errors) => invalid.push(RecordError {
                    location: record.location,
                    errors,
                }),
            }
        }
        if !invalid.is_empty() {
            return Err(anyhow::Error::new(RecordErrors(invalid)))
                .with_context(|| format!("validating {origin}"));
        }

        let registry =
            Registry::from_entries(entries).with_context(|| format!("registering {origin}"))?;
        if let Some(schema) = &self.schema {
            schema.check(&to_document(&registry)?, origin)?;
        }
        info!(origin, entries = registry.len(), "loaded catalog");
        Ok(registry)
    }

    /// Read and parse a catalog file.
    pub fn load(&self, path: &Path) -> Result<Registry> {
        let data =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        self.parse(&data, &path.display().to_string())
    }
}

/// Render `registry` as the persisted JSON array.
pub fn to_document(registry: &Registry) -> Result<Value> {
    let entries = registry
        .all()
        .map(CatalogEntry::to_value)
        .collect::<Result<Vec<_>, _>>()
        .context("serializing catalog entries")?;
    Ok(Value::Array(entries))
}

/// Atomically write `registry` to `path`.
pub fn save_registry(path: &Path, registry: &Registry) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let document = to_document(registry)?;
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temp file in {}", dir.display()))?;
    serde_json::to_writer_pretty(&mut tmp, &document)
        .with_context(|| format!("writing {}", path.display()))?;
    tmp.write_all(b"\n")?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("syncing {}", path.display()))?;
    tmp.persist(path)
        .with_context(|| format!("replacing {}", path.display()))?;

    info!(path = %path.display(), entries = registry.len(), "saved catalog");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(name: &str) -> Value {
        json!({
            "name": name,
            "description": "lab",
            "url": format!("https://labs.example.com/{name}/"),
            "technologies": ["php"],
        })
    }

    #[test]
    fn invalid_records_are_reported_together() {
        let input = json!([
            record("ok"),
            { "name": "no-url", "description": "x", "technologies": ["php"] },
            { "description": "x", "url": "https://a.example/", "technologies": [""] },
        ])
        .to_string();
        let err = CatalogStore::new().parse(&input, "inline").unwrap_err();
        let records = err.downcast_ref::<RecordErrors>().expect("typed record errors");
        let locations: Vec<&str> = records.0.iter().map(|r| r.location.as_str()).collect();
        assert_eq!(locations, vec!["record 1", "record 2"]);
        assert_eq!(records.0[1].errors.len(), 2);
    }

    #[test]
    fn duplicate_names_fail_the_load() {
        let input = json!([record("lab"), record("lab")]).to_string();
        let err = CatalogStore::new().parse(&input, "inline").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<crate::error::RegistryError>(),
            Some(crate::error::RegistryError::DuplicateName(_))
        ));
    }

    #[test]
    fn validation_errors_win_over_schema_errors() {
        let mut extra = record("lab");
        extra["author"] = json!("someone");
        let store = CatalogStore::with_schema(PersistedSchema::canonical().unwrap());
        let err = store
            .parse(&Value::Array(vec![extra]).to_string(), "inline")
            .unwrap_err();
        let records = err.downcast_ref::<RecordErrors>().expect("typed record errors");
        assert_eq!(records.0[0].location, "record 0");
    }

    #[test]
    fn schema_checks_the_normalized_entries() {
        let mut padded = record("lab");
        padded["url"] = json!("  HTTPS://Labs.Example.com/lab/");
        padded["tags"] = Value::Null;
        let store = CatalogStore::with_schema(PersistedSchema::canonical().unwrap());
        let registry = store
            .parse(&Value::Array(vec![padded]).to_string(), "inline")
            .unwrap();
        assert_eq!(
            registry.get("lab").unwrap().url().as_str(),
            "https://labs.example.com/lab/"
        );
    }

    #[test]
    fn override_schema_can_tighten_the_persisted_form() -> Result<()> {
        let mut schema: Value = serde_json::from_str(crate::CANONICAL_ENTRY_SCHEMA)?;
        schema["definitions"]["entry"]["required"] = json!(["name", "description", "url", "tags"]);
        schema["definitions"]["entry"]["properties"]["tags"] =
            json!({ "type": "array", "minItems": 1 });
        let file = tempfile::NamedTempFile::new()?;
        serde_json::to_writer(file.as_file(), &schema)?;

        let store = CatalogStore::with_schema(PersistedSchema::load(Some(file.path()))?);
        let err = store
            .parse(&json!([record("lab")]).to_string(), "inline")
            .unwrap_err();
        assert!(err.to_string().contains("failed schema validation"), "{err:#}");
        Ok(())
    }

    #[test]
    fn document_preserves_insertion_order() {
        let store = CatalogStore::new();
        let registry = store
            .parse(&json!([record("b"), record("a")]).to_string(), "inline")
            .unwrap();
        let document = to_document(&registry).unwrap();
        let names: Vec<&str> = document
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v["name"].as_str())
            .collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
